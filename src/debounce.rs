//! key debounce with auto repeat, sampled every 10 ms
//!
//! Each input keeps its filtered level and a count of consecutive samples
//! that disagreed with it. The level flips once the disagreement has lasted
//! the whole window, any agreeing sample restarts the count. A released to
//! pressed flip queues a press event. While any repeat enabled key is held
//! a shared countdown runs and queues repeat events for the held keys.
//!
//! `sample` runs in the timer interrupt, the accessors run in the control
//! loop with that interrupt masked, so each read-and-clear is atomic with
//! respect to the sampler.

use crate::config::{DEBOUNCE_SAMPLES, REPEAT_MASK, REPEAT_NEXT, REPEAT_START};
use crate::error::ConfigError;
use crate::hw::RawInputs;

const INPUTS: usize = 8;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum KeyLevel {
    Released,
    Pressed,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct DebounceConfig {
    window: u8,
    repeat_mask: u8,
    repeat_start: u8,
    repeat_next: u8,
}

impl DebounceConfig {
    pub fn new(window: u8, repeat_mask: u8, repeat_start: u8, repeat_next: u8) -> Result<DebounceConfig, ConfigError> {
        if window == 0 {
            return Err(ConfigError::BadDebounceWindow(window));
        }
        if repeat_start == 0 || repeat_next == 0 {
            return Err(ConfigError::ZeroRepeatDelay);
        }
        Ok(DebounceConfig {
            window,
            repeat_mask,
            repeat_start,
            repeat_next,
        })
    }
}

impl Default for DebounceConfig {
    fn default() -> DebounceConfig {
        DebounceConfig {
            window: DEBOUNCE_SAMPLES,
            repeat_mask: REPEAT_MASK,
            repeat_start: REPEAT_START,
            repeat_next: REPEAT_NEXT,
        }
    }
}

#[derive(Copy, Clone)]
struct KeyFilter {
    level: KeyLevel,
    disagree: u8,
}

impl KeyFilter {
    const IDLE: KeyFilter = KeyFilter {
        level: KeyLevel::Released,
        disagree: 0,
    };

    // feed one raw sample, true when the filtered level flipped
    fn sample(&mut self, raw: KeyLevel, window: u8) -> bool {
        if raw == self.level {
            self.disagree = 0;
            return false;
        }
        self.disagree += 1;
        if self.disagree < window {
            return false;
        }
        self.disagree = 0;
        self.level = raw;
        true
    }
}

pub struct Debouncer {
    config: DebounceConfig,
    keys: [KeyFilter; INPUTS],
    press: u8,
    repeat: u8,
    repeat_countdown: u8,
}

impl Debouncer {
    pub fn new(config: DebounceConfig) -> Debouncer {
        Debouncer {
            config,
            keys: [KeyFilter::IDLE; INPUTS],
            press: 0,
            repeat: 0,
            repeat_countdown: config.repeat_start,
        }
    }

    /// one 10 ms sampling step over the raw, active low port levels
    pub fn sample(&mut self, raw_levels: u8) {
        let mut flipped = 0u8;
        for (bit, key) in self.keys.iter_mut().enumerate() {
            let mask = 1u8 << bit;
            let raw = if raw_levels & mask == 0 {
                KeyLevel::Pressed
            } else {
                KeyLevel::Released
            };
            if key.sample(raw, self.config.window) {
                flipped |= mask;
            }
        }
        let held = self.held_bits();
        self.press |= flipped & held;

        let held_repeating = held & self.config.repeat_mask;
        if held_repeating == 0 {
            self.repeat_countdown = self.config.repeat_start;
        } else {
            // not rearmed when a second key joins a held one
            self.repeat_countdown -= 1;
            if self.repeat_countdown == 0 {
                self.repeat_countdown = self.config.repeat_next;
                self.repeat |= held_repeating;
            }
        }
    }

    pub fn sample_inputs<P: RawInputs>(&mut self, pins: &mut P) {
        let raw = pins.read_raw_levels();
        self.sample(raw);
    }

    /// pending presses within `mask`, cleared on return
    pub fn consume_press(&mut self, mask: u8) -> u8 {
        let hit = self.press & mask;
        self.press ^= hit;
        hit
    }

    /// pending repeats within `mask`, cleared on return
    pub fn consume_repeat(&mut self, mask: u8) -> u8 {
        let hit = self.repeat & mask;
        self.repeat ^= hit;
        hit
    }

    /// keys within `mask` currently held down
    pub fn is_held(&self, mask: u8) -> u8 {
        self.held_bits() & mask
    }

    /// presses of keys that were released again before any repeat
    pub fn short_press(&mut self, mask: u8) -> u8 {
        let released = !self.held_bits();
        self.consume_press(released & mask)
    }

    /// keys held long enough to repeat, reported once per press
    pub fn long_press(&mut self, mask: u8) -> u8 {
        let repeated = self.consume_repeat(mask);
        self.consume_press(repeated)
    }

    #[cfg(test)]
    fn level(&self, input: u8) -> KeyLevel {
        self.keys[(input as usize) % INPUTS].level
    }

    fn held_bits(&self) -> u8 {
        self.keys
            .iter()
            .enumerate()
            .filter(|(_, key)| key.level == KeyLevel::Pressed)
            .fold(0, |bits, (bit, _)| bits | 1u8 << bit)
    }
}
