//! flow meter pulses counted by the external interrupt

pub struct PulseCounter {
    pending: u16,
}

impl PulseCounter {
    pub const fn new() -> PulseCounter {
        PulseCounter { pending: 0 }
    }

    // called from the INT0 interrupt
    pub fn on_pulse(&mut self) {
        self.pending = self.pending.wrapping_add(1);
    }

    /// pulses since the last drain, cleared on return
    pub fn drain(&mut self) -> u16 {
        core::mem::replace(&mut self.pending, 0)
    }
}

impl Default for PulseCounter {
    fn default() -> PulseCounter {
        PulseCounter::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_is_read_and_clear() {
        let mut pulses = PulseCounter::new();
        for _ in 0..5 {
            pulses.on_pulse();
        }
        assert_eq!(pulses.drain(), 5);
        assert_eq!(pulses.drain(), 0);
    }
}
