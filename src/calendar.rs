//! wall clock time since boot, advanced by the dispatcher from drained
//! timer overflows

use crate::error::ConfigError;
use crate::flags::{DispatchFlags, Flag};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Calendar {
    overflows_per_decisecond: u16,
    // overflows not yet worth a whole decisecond
    residue: u16,
    decisecond: u8,
    sec: u8,
    min: u8,
    hour: u8,
    day: u16,
}

impl Calendar {
    pub fn new(overflows_per_decisecond: u16) -> Result<Calendar, ConfigError> {
        if overflows_per_decisecond == 0 {
            return Err(ConfigError::ZeroOverflowsPerDecisecond);
        }
        Ok(Calendar {
            overflows_per_decisecond,
            residue: 0,
            decisecond: 0,
            sec: 0,
            min: 0,
            hour: 0,
            day: 0,
        })
    }

    /// account for `overflows` timer overflows, returns the whole
    /// deciseconds that were applied
    pub fn advance_overflows(&mut self, overflows: u16, flags: &mut DispatchFlags) -> u16 {
        let total = self.residue as u32 + overflows as u32;
        let per = self.overflows_per_decisecond as u32;
        self.residue = (total % per) as u16;
        let deciseconds = (total / per) as u16;
        for _ in 0..deciseconds {
            self.tick(flags);
        }
        deciseconds
    }

    // one decisecond with the carry chain
    fn tick(&mut self, flags: &mut DispatchFlags) {
        self.decisecond += 1;
        if self.decisecond < 10 {
            return;
        }
        self.decisecond = 0;
        self.sec += 1;
        flags.raise(Flag::Second);
        if self.sec < 60 {
            return;
        }
        self.sec = 0;
        self.min += 1;
        flags.raise(Flag::Minute);
        if self.min < 60 {
            return;
        }
        self.min = 0;
        self.hour += 1;
        flags.raise(Flag::Hour);
        if self.hour < 24 {
            return;
        }
        self.hour = 0;
        self.day = self.day.wrapping_add(1);
        flags.raise(Flag::Day);
    }

    pub fn decisecond(&self) -> u8 {
        self.decisecond
    }

    pub fn sec(&self) -> u8 {
        self.sec
    }

    pub fn min(&self) -> u8 {
        self.min
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn day(&self) -> u16 {
        self.day
    }
}

/// `hh:mm:ss` text, each field rewritten only when its unit rolls over
pub struct ClockFace {
    text: [u8; 8],
    day: u16,
}

impl ClockFace {
    pub const fn new() -> ClockFace {
        ClockFace {
            text: *b"00:00:00",
            day: 0,
        }
    }

    pub fn set_hours(&mut self, hour: u8) {
        self.write_field(0, hour);
    }

    pub fn set_minutes(&mut self, min: u8) {
        self.write_field(3, min);
    }

    pub fn set_seconds(&mut self, sec: u8) {
        self.write_field(6, sec);
    }

    pub fn set_day(&mut self, day: u16) {
        self.day = day;
    }

    pub fn day(&self) -> u16 {
        self.day
    }

    pub fn as_str(&self) -> &str {
        // only ever holds ascii digits and colons
        core::str::from_utf8(&self.text).unwrap_or("")
    }

    fn write_field(&mut self, at: usize, value: u8) {
        self.text[at] = b'0' + (value / 10) % 10;
        self.text[at + 1] = b'0' + value % 10;
    }
}

impl Default for ClockFace {
    fn default() -> ClockFace {
        ClockFace::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_seconds(cal: &mut Calendar, flags: &mut DispatchFlags, deciseconds: u32) -> u32 {
        let mut seconds = 0;
        for _ in 0..deciseconds {
            cal.advance_overflows(1, flags);
            if flags.take(Flag::Second) {
                seconds += 1;
            }
        }
        seconds
    }

    #[test]
    fn six_hundred_overflows_make_one_minute() {
        let mut cal = Calendar::new(1).unwrap();
        let mut flags = DispatchFlags::new();
        assert_eq!(cal.advance_overflows(600, &mut flags), 600);
        assert_eq!((cal.hour(), cal.min(), cal.sec(), cal.decisecond()), (0, 1, 0, 0));
        assert!(flags.take(Flag::Minute));
        assert!(!flags.take(Flag::Minute));
        assert!(flags.take(Flag::Second));
        assert!(!flags.is_raised(Flag::Hour));
    }

    #[test]
    fn drained_batches_match_single_steps() {
        let mut batched = Calendar::new(1).unwrap();
        let mut stepped = Calendar::new(1).unwrap();
        let mut flags = DispatchFlags::new();
        for n in [0u16, 1, 7, 13, 599, 1234, 36000].iter() {
            batched.advance_overflows(*n, &mut flags);
            for _ in 0..*n {
                stepped.advance_overflows(1, &mut flags);
            }
            assert_eq!(batched, stepped);
        }
    }

    #[test]
    fn second_flag_raised_every_ten_deciseconds() {
        let mut cal = Calendar::new(1).unwrap();
        let mut flags = DispatchFlags::new();
        assert_eq!(count_seconds(&mut cal, &mut flags, 95), 9);
        assert_eq!(cal.decisecond(), 5);
    }

    #[test]
    fn carry_reaches_days() {
        let mut cal = Calendar::new(1).unwrap();
        let mut flags = DispatchFlags::new();
        // 23:59:59.9
        let mut left: u32 = 10 * 86_399 + 9;
        while left > 0 {
            let step = left.min(60_000);
            cal.advance_overflows(step as u16, &mut flags);
            left -= step;
        }
        assert_eq!((cal.hour(), cal.min(), cal.sec(), cal.decisecond()), (23, 59, 59, 9));
        flags = DispatchFlags::new();
        cal.advance_overflows(1, &mut flags);
        assert_eq!((cal.day(), cal.hour(), cal.min(), cal.sec()), (1, 0, 0, 0));
        for flag in [Flag::Second, Flag::Minute, Flag::Hour, Flag::Day].iter() {
            assert!(flags.take(*flag));
        }
    }

    #[test]
    fn residue_carries_between_drains() {
        let mut cal = Calendar::new(4).unwrap();
        let mut flags = DispatchFlags::new();
        assert_eq!(cal.advance_overflows(3, &mut flags), 0);
        assert_eq!(cal.advance_overflows(3, &mut flags), 1);
        assert_eq!(cal.advance_overflows(2, &mut flags), 1);
        assert_eq!(cal.decisecond(), 2);
    }

    #[test]
    fn zero_overflows_change_nothing() {
        let mut cal = Calendar::new(1).unwrap();
        let mut flags = DispatchFlags::new();
        let before = cal;
        assert_eq!(cal.advance_overflows(0, &mut flags), 0);
        assert_eq!(cal, before);
        assert!(flags.is_empty());
    }

    #[test]
    fn zero_overflows_per_decisecond_rejected() {
        assert_eq!(Calendar::new(0), Err(ConfigError::ZeroOverflowsPerDecisecond));
    }

    #[test]
    fn clock_face_fields() {
        let mut face = ClockFace::new();
        face.set_seconds(7);
        face.set_minutes(42);
        face.set_hours(23);
        assert_eq!(face.as_str(), "23:42:07");
        face.set_day(3);
        assert_eq!(face.day(), 3);
    }
}
