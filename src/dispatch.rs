//! the cooperative control loop step
//!
//! One iteration drains the shared state exactly once and then publishes:
//!
//! 1. drain the timer overflows and advance the calendar
//! 2. on a new second: rewrite the seconds field, mark display and serial
//!    output dirty, trigger the next acquisition cycle
//! 3. on minute, hour and day roll over: rewrite that field only
//! 4. start acquisition right away if it has never run
//! 5. apply key events and flow pulses to the counters
//! 6. write dirty outputs from the last completed averages
//!
//! Steps 1 to 5 touch handler state and are grouped in [`Dispatcher::collect`]
//! so the firmware can run them inside one short critical section. Step 6
//! is [`Dispatcher::publish`] and runs with interrupts enabled.

use core::convert::TryFrom;

use heapless::{String, Vec};
use log::warn;
use ufmt::uwrite;

use crate::calendar::{Calendar, ClockFace};
use crate::config::{
    ADC_CHANNEL_START, KEY_SW1, KEY_SW2, MAX_CHANNELS, NO_READING, OVERFLOWS_PER_DECISECOND,
    PRESSURE_ROUND_DIGIT, PRESSURE_SCALE,
};
use crate::debounce::Debouncer;
use crate::error::{ConfigError, OutputError};
use crate::fixed_point::{DecimalLayout, FixedPointFormat, Text, TEXT_CAPACITY};
use crate::flags::{DispatchFlags, Flag};
use crate::hw::{ConversionHw, SerialLine, TextDisplay};
use crate::SchedulerState;

// every readout plus flow and count, each followed by a separator
const LINE_CAPACITY: usize = (MAX_CHANNELS + 2) * (TEXT_CAPACITY + 1);

/// Display cell, rows count from 1.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Position {
        Position { row, col }
    }
}

/// An averaged channel converted to engineering units.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Readout {
    pub channel: u8,
    /// multiplier from raw counts to the fixed point value
    pub scale: u32,
    pub layout: DecimalLayout,
    pub at: Position,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Label {
    pub text: &'static str,
    pub at: Position,
}

/// Key masks acting on the counters. The two masks must not overlap.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct KeyBindings {
    /// +1 per press and per auto repeat
    pub count: u8,
    /// short press clears the manual count, long press also the flow total
    pub clear: u8,
}

#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    pub overflows_per_decisecond: u16,
    pub readouts: Vec<Readout, MAX_CHANNELS>,
    pub labels: Vec<Label, 4>,
    pub clock_at: Option<Position>,
    pub counter_layout: DecimalLayout,
    pub flow_at: Position,
    pub count_at: Position,
    pub keys: KeyBindings,
}

impl DispatcherConfig {
    /// pressure on ADC1 in bar on row 1, counters on row 2, clock on serial only
    pub fn standard() -> Result<DispatcherConfig, ConfigError> {
        let mut readouts = Vec::new();
        readouts
            .push(Readout {
                channel: ADC_CHANNEL_START,
                scale: PRESSURE_SCALE,
                layout: DecimalLayout::new(3, 4, 1)?.rounded_at(PRESSURE_ROUND_DIGIT),
                at: Position::new(1, 8),
            })
            .ok();
        let mut labels = Vec::new();
        for label in [
            Label {
                text: "Time:",
                at: Position::new(1, 0),
            },
            Label {
                text: "bar",
                at: Position::new(1, 13),
            },
        ]
        .iter()
        {
            labels.push(*label).ok();
        }
        Ok(DispatcherConfig {
            overflows_per_decisecond: OVERFLOWS_PER_DECISECOND,
            readouts,
            labels,
            clock_at: None,
            counter_layout: DecimalLayout::integer(5)?,
            flow_at: Position::new(2, 0),
            count_at: Position::new(2, 9),
            keys: KeyBindings {
                count: KEY_SW2,
                clear: KEY_SW1,
            },
        })
    }
}

/// What one `collect` pass did.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct Progress {
    pub deciseconds: u16,
    pub triggered: bool,
}

pub struct Dispatcher<F> {
    config: DispatcherConfig,
    formatter: F,
    calendar: Calendar,
    flags: DispatchFlags,
    clock: ClockFace,
    latest: [Option<u16>; MAX_CHANNELS],
    // acquisition cycle the snapshot in `latest` was taken from
    latest_cycle: u16,
    total_flow: i32,
    manual_count: i32,
}

impl<F: FixedPointFormat> Dispatcher<F> {
    pub fn new(config: DispatcherConfig, formatter: F) -> Result<Dispatcher<F>, ConfigError> {
        Ok(Dispatcher {
            calendar: Calendar::new(config.overflows_per_decisecond)?,
            config,
            formatter,
            flags: DispatchFlags::new(),
            clock: ClockFace::new(),
            latest: [None; MAX_CHANNELS],
            latest_cycle: 0,
            total_flow: 0,
            manual_count: 0,
        })
    }

    /// write the static labels, once after the display is up
    pub fn start<D: TextDisplay>(&mut self, display: &mut D) -> Result<(), D::Error> {
        for label in self.config.labels.iter() {
            display.write_text(label.text, label.at.row, label.at.col)?;
        }
        Ok(())
    }

    /// Steps 1 to 5, everything that reads or clears handler state.
    pub fn collect<H: ConversionHw>(&mut self, state: &mut SchedulerState, adc: &mut H) -> Progress {
        let mut progress = Progress::default();

        let overflows = state.ticks.drain();
        progress.deciseconds = self.calendar.advance_overflows(overflows, &mut self.flags);

        if self.flags.take(Flag::Second) {
            self.clock.set_seconds(self.calendar.sec());
            self.flags.raise(Flag::DisplayDirty);
            self.flags.raise(Flag::SerialDirty);
            progress.triggered |= state.acquisition.trigger(adc);
        }
        if self.flags.take(Flag::Minute) {
            self.clock.set_minutes(self.calendar.min());
        }
        if self.flags.take(Flag::Hour) {
            self.clock.set_hours(self.calendar.hour());
        }
        if self.flags.take(Flag::Day) {
            self.clock.set_day(self.calendar.day());
        }

        if state.acquisition.needs_cold_start() {
            progress.triggered |= state.acquisition.trigger(adc);
        }

        self.apply_keys(&mut state.keys);
        let pulses = state.pulses.drain();
        self.total_flow = self.total_flow.wrapping_add(pulses as i32);

        // only whole cycles are shown, never a mix of two
        let cycles = state.acquisition.cycles();
        if cycles != self.latest_cycle {
            self.latest_cycle = cycles;
            for (channel, latest) in self.latest.iter_mut().enumerate() {
                *latest = state.acquisition.published(channel as u8);
            }
        }
        progress
    }

    /// Step 6, push dirty outputs. Dirty flags are cleared before writing.
    /// Both outputs are attempted, the display error wins if both fail.
    pub fn publish<D, S>(&mut self, display: &mut D, serial: &mut S) -> Result<(), OutputError<D::Error, S::Error>>
    where
        D: TextDisplay,
        S: SerialLine,
    {
        let show = self.flags.take(Flag::DisplayDirty);
        let send = self.flags.take(Flag::SerialDirty);
        let shown = if show { self.write_display(display) } else { Ok(()) };
        let sent = if send { self.write_serial(serial) } else { Ok(()) };
        shown.map_err(OutputError::Display)?;
        sent.map_err(OutputError::Serial)
    }

    /// one full loop iteration
    pub fn run_once<H, D, S>(
        &mut self,
        state: &mut SchedulerState,
        adc: &mut H,
        display: &mut D,
        serial: &mut S,
    ) -> Result<Progress, OutputError<D::Error, S::Error>>
    where
        H: ConversionHw,
        D: TextDisplay,
        S: SerialLine,
    {
        let progress = self.collect(state, adc);
        self.publish(display, serial)?;
        Ok(progress)
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn clock(&self) -> &ClockFace {
        &self.clock
    }

    pub fn total_flow(&self) -> i32 {
        self.total_flow
    }

    pub fn manual_count(&self) -> i32 {
        self.manual_count
    }

    pub fn is_dirty(&self) -> bool {
        self.flags.is_raised(Flag::DisplayDirty) || self.flags.is_raised(Flag::SerialDirty)
    }

    fn apply_keys(&mut self, keys: &mut Debouncer) {
        let bind = self.config.keys;
        let counted = keys.consume_press(bind.count).count_ones() + keys.consume_repeat(bind.count).count_ones();
        self.manual_count = self.manual_count.wrapping_add(counted as i32);

        if keys.long_press(bind.clear) != 0 {
            self.manual_count = 0;
            self.total_flow = 0;
        } else if keys.short_press(bind.clear) != 0 {
            self.manual_count = 0;
        }
    }

    fn readout_text(&self, readout: &Readout) -> Text {
        match self.latest.get(readout.channel as usize).copied().flatten() {
            Some(average) => {
                let raw = scaled(average, readout.scale);
                self.formatter.format_fixed_point(raw, readout.layout)
            }
            None => {
                let mut text = Text::new();
                text.push_str(NO_READING).ok();
                text
            }
        }
    }

    fn counter_text(&self, value: i32) -> Text {
        self.formatter.format_fixed_point(value, self.config.counter_layout)
    }

    fn write_display<D: TextDisplay>(&self, display: &mut D) -> Result<(), D::Error> {
        if let Some(at) = self.config.clock_at {
            display.write_text(self.clock.as_str(), at.row, at.col)?;
        }
        for readout in self.config.readouts.iter() {
            let text = self.readout_text(readout);
            display.write_text(&text, readout.at.row, readout.at.col)?;
        }
        let flow = self.counter_text(self.total_flow);
        display.write_text(&flow, self.config.flow_at.row, self.config.flow_at.col)?;
        let count = self.counter_text(self.manual_count);
        display.write_text(&count, self.config.count_at.row, self.config.count_at.col)
    }

    fn write_serial<S: SerialLine>(&self, serial: &mut S) -> Result<(), S::Error> {
        // readouts are capped at MAX_CHANNELS, so the line never fills up
        let mut line: String<LINE_CAPACITY> = String::new();
        for readout in self.config.readouts.iter() {
            let text = self.readout_text(readout);
            uwrite!(line, "{} ", text.as_str()).ok();
        }
        let flow = self.counter_text(self.total_flow);
        let count = self.counter_text(self.manual_count);
        uwrite!(line, "{} {}", flow.as_str(), count.as_str()).ok();
        serial.write_line(&line)?;
        serial.write_line(self.clock.as_str())
    }
}

// product of the widest average and scale exceeds i32, clamp to the formatter range
fn scaled(average: u16, scale: u32) -> i32 {
    let wide = average as u64 * scale as u64;
    i32::try_from(wide).unwrap_or_else(|_| {
        warn!("scaled reading {} saturated", wide);
        i32::MAX
    })
}
