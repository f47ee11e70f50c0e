//! hardware timer overflow counting
//!
//! The overflow handler is the only producer, the dispatcher the only
//! consumer. Both run with the timer interrupt masked, so `drain` is an
//! exchange with respect to the handler and no overflow is lost.

use crate::hw::TimerHw;

pub struct TickCounter {
    reload: u16,
    ticks: u16,
}

impl TickCounter {
    pub const fn new(reload: u16) -> TickCounter {
        TickCounter { reload, ticks: 0 }
    }

    // called from the timer overflow interrupt
    pub fn on_overflow<T: TimerHw>(&mut self, timer: &mut T) {
        timer.reload(self.reload);
        self.ticks = self.ticks.wrapping_add(1);
    }

    /// overflows since the last drain, the count restarts at zero
    pub fn drain(&mut self) -> u16 {
        core::mem::replace(&mut self.ticks, 0)
    }

    #[cfg(test)]
    fn pending(&self) -> u16 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeTimer {
        reloads: Vec<u16>,
    }

    impl TimerHw for FakeTimer {
        fn reload(&mut self, count: u16) {
            self.reloads.push(count);
        }
    }

    #[test]
    fn every_overflow_reloads_and_counts() {
        let mut timer = FakeTimer::default();
        let mut ticks = TickCounter::new(59286);
        for _ in 0..3 {
            ticks.on_overflow(&mut timer);
        }
        assert_eq!(timer.reloads, vec![59286, 59286, 59286]);
        assert_eq!(ticks.pending(), 3);
    }

    #[test]
    fn drain_clears_and_later_overflows_land_in_next_drain() {
        let mut timer = FakeTimer::default();
        let mut ticks = TickCounter::new(0);
        ticks.on_overflow(&mut timer);
        ticks.on_overflow(&mut timer);
        assert_eq!(ticks.drain(), 2);
        assert_eq!(ticks.drain(), 0);
        ticks.on_overflow(&mut timer);
        assert_eq!(ticks.drain(), 1);
    }
}
