//! errors reported while building the scheduler configuration and while
//! pushing output

use thiserror_no_std::Error;
use ufmt::derive::uDebug;

#[derive(uDebug, Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// at least one channel must be sampled
    #[error("no acquisition channels configured")]
    NoChannels,
    /// channel range runs past the last multiplexer input
    #[error("{count} channels from {start} exceed the multiplexer")]
    ChannelOutOfRange { start: u8, count: u8 },
    /// at least one sample must contribute to an average
    #[error("sample average count is zero")]
    ZeroAverage,
    /// decimal layout indexes outside the rendered digits
    #[error("decimal layout start={start} comma={comma} frac={frac} is out of range")]
    BadLayout { start: u8, comma: u8, frac: u8 },
    /// debounce window must fit the persistence counter
    #[error("debounce window of {0} samples is unsupported")]
    BadDebounceWindow(u8),
    /// repeat delays must be non-zero
    #[error("key repeat delay is zero")]
    ZeroRepeatDelay,
    /// the calendar needs at least one timer overflow per decisecond
    #[error("zero timer overflows per decisecond")]
    ZeroOverflowsPerDecisecond,
}

/// Failure while pushing text to one of the output collaborators.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OutputError<D: core::fmt::Debug, S: core::fmt::Debug> {
    #[error("display write failed: {0:?}")]
    Display(D),
    #[error("serial write failed: {0:?}")]
    Serial(S),
}
