//! sampling and dispatch core of the SmartFarm mini monitor
//!
//! Interrupt handlers feed the timer tick counter, the key debouncer, the
//! ADC acquisition machine and the flow pulse counter. A single control
//! loop drains them through the [`dispatch::Dispatcher`], advances the
//! clock, paces acquisition to once per second and pushes fresh values to
//! the display and the serial link.
//!
//! Everything the handlers touch lives in one [`SchedulerState`]. The
//! firmware keeps it behind an interrupt mutex, so each handler body and
//! each dispatcher drain runs to completion without the other side.

#![cfg_attr(not(test), no_std)]

pub mod acquisition;
pub mod calendar;
pub mod config;
pub mod debounce;
pub mod dispatch;
pub mod error;
pub mod fixed_point;
pub mod flags;
pub mod hw;
pub mod pulse;
pub mod time_base;

use crate::acquisition::{Acquisition, AcquisitionConfig};
use crate::debounce::{DebounceConfig, Debouncer};
use crate::pulse::PulseCounter;
use crate::time_base::TickCounter;

pub use crate::error::{ConfigError, OutputError};

/// State shared between the interrupt handlers and the control loop.
pub struct SchedulerState {
    pub ticks: TickCounter,
    pub keys: Debouncer,
    pub acquisition: Acquisition,
    pub pulses: PulseCounter,
}

impl SchedulerState {
    pub fn new(timer_reload: u16, keys: DebounceConfig, acquisition: AcquisitionConfig) -> SchedulerState {
        SchedulerState {
            ticks: TickCounter::new(timer_reload),
            keys: Debouncer::new(keys),
            acquisition: Acquisition::new(acquisition),
            pulses: PulseCounter::new(),
        }
    }
}

impl Default for SchedulerState {
    fn default() -> SchedulerState {
        SchedulerState::new(
            config::TIMER1_RELOAD,
            DebounceConfig::default(),
            AcquisitionConfig::default(),
        )
    }
}
