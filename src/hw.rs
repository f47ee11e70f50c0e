//! interfaces of the hardware and output collaborators the scheduler drives
//!
//! The firmware implements these over the ATmega328P registers; the tests
//! implement them with recording fakes.

/// Analog-to-digital converter with a conversion-complete interrupt.
pub trait ConversionHw {
    /// select `channel` and start a single conversion, returns immediately
    fn start_conversion(&mut self, channel: u8);
    /// latched result of the last finished conversion
    fn read_sample(&mut self) -> u16;
}

/// Timer whose overflow paces the time base.
pub trait TimerHw {
    /// preload the counter so the next overflow comes one period later
    fn reload(&mut self, count: u16);
}

/// Character display addressed by row and column.
pub trait TextDisplay {
    type Error: core::fmt::Debug;

    fn write_text(&mut self, text: &str, row: u8, col: u8) -> Result<(), Self::Error>;
}

/// Line oriented serial link.
pub trait SerialLine {
    type Error: core::fmt::Debug;

    fn write_line(&mut self, text: &str) -> Result<(), Self::Error>;
}

/// Raw, undebounced input port. Inputs are active low, one bit per pin.
pub trait RawInputs {
    fn read_raw_levels(&mut self) -> u8;
}
