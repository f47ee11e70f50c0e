//! compile time configuration of the monitor
//!
//! Timer values assume a 16 MHz system clock.

//==========================================================
// Time base

/// TIMER1 preload, prescaler 256: 65536 - 6250 counts = 100 ms
pub const TIMER1_RELOAD: u16 = 59286;

/// TIMER1 overflows that make up one decisecond
pub const OVERFLOWS_PER_DECISECOND: u16 = 1;

//==========================================================
// Debounce

/// TIMER0 preload, prescaler 1024: 256 - 156 counts ~ 10 ms
pub const DEBOUNCE_TIMER0_RELOAD: u8 = 100;

/// consecutive 10 ms samples before a level change is accepted
pub const DEBOUNCE_SAMPLES: u8 = 4;

/// 10 ms ticks a key must be held before the first repeat
pub const REPEAT_START: u8 = 50;

/// 10 ms ticks between following repeats
pub const REPEAT_NEXT: u8 = 20;

/// switch SW1 on PD2
pub const KEY_SW1: u8 = 1 << 2;
/// switch SW2 on PD3
pub const KEY_SW2: u8 = 1 << 3;

/// keys that auto repeat while held
pub const REPEAT_MASK: u8 = KEY_SW1 | KEY_SW2;

//==========================================================
// Acquisition

/// multiplexer inputs ADC0..ADC7
pub const MAX_CHANNELS: usize = 8;

/// first channel sampled in a cycle, ADC1 carries the pressure sensor
pub const ADC_CHANNEL_START: u8 = 1;

pub const ADC_CHANNEL_COUNT: u8 = 1;

/// conversions averaged per channel
pub const ADC_AVERAGE: u8 = 4;

/// raw ADC counts to 1e-7 bar
pub const PRESSURE_SCALE: u32 = 48876;

//==========================================================
// Presentation

/// digit index rounded away before the pressure is shown
pub const PRESSURE_ROUND_DIGIT: u8 = 7;

/// shown while a channel has not completed its first average
pub const NO_READING: &str = "---";
