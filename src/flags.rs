//! edge triggered dispatch flags
//!
//! Raising an already raised flag is a no-op and taking a flag clears it,
//! so each assertion is observed at most once.

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Flag {
    Second,
    Minute,
    Hour,
    Day,
    DisplayDirty,
    SerialDirty,
}

impl Flag {
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct DispatchFlags(u8);

impl DispatchFlags {
    pub const fn new() -> DispatchFlags {
        DispatchFlags(0)
    }

    pub fn raise(&mut self, flag: Flag) {
        self.0 |= flag.bit();
    }

    /// observe and clear
    pub fn take(&mut self, flag: Flag) -> bool {
        let raised = self.is_raised(flag);
        self.0 &= !flag.bit();
        raised
    }

    pub fn is_raised(&self, flag: Flag) -> bool {
        self.0 & flag.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_delivers_once() {
        let mut flags = DispatchFlags::new();
        flags.raise(Flag::Minute);
        flags.raise(Flag::Minute);
        assert!(flags.take(Flag::Minute));
        assert!(!flags.take(Flag::Minute));
        assert!(flags.is_empty());
    }

    #[test]
    fn flags_are_independent() {
        let mut flags = DispatchFlags::new();
        flags.raise(Flag::DisplayDirty);
        flags.raise(Flag::SerialDirty);
        assert!(flags.take(Flag::SerialDirty));
        assert!(flags.is_raised(Flag::DisplayDirty));
        assert!(!flags.is_raised(Flag::Second));
    }
}
