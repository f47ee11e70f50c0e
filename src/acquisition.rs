//! multi channel ADC acquisition with running averages
//!
//! A trigger from the dispatcher starts a cycle at the first configured
//! channel. Every conversion-complete interrupt adds one sample to the
//! current channel; once the channel holds `average` samples its truncated
//! mean is published and the next channel is started. After the last
//! channel the machine rests in `CycleDone` until the next trigger.
//!
//! A conversion that never completes leaves the machine in `Running` for
//! good.

use log::{debug, trace};

use crate::config::{ADC_AVERAGE, ADC_CHANNEL_COUNT, ADC_CHANNEL_START, MAX_CHANNELS};
use crate::error::ConfigError;
use crate::hw::ConversionHw;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Phase {
    Idle,
    Running,
    CycleDone,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct AcquisitionConfig {
    start: u8,
    count: u8,
    average: u8,
}

impl AcquisitionConfig {
    pub fn new(start: u8, count: u8, average: u8) -> Result<AcquisitionConfig, ConfigError> {
        if count == 0 {
            return Err(ConfigError::NoChannels);
        }
        if start as usize + count as usize > MAX_CHANNELS {
            return Err(ConfigError::ChannelOutOfRange { start, count });
        }
        if average == 0 {
            return Err(ConfigError::ZeroAverage);
        }
        Ok(AcquisitionConfig { start, count, average })
    }

    // one past the last sampled channel
    fn end(&self) -> u8 {
        self.start + self.count
    }
}

impl Default for AcquisitionConfig {
    fn default() -> AcquisitionConfig {
        AcquisitionConfig {
            start: ADC_CHANNEL_START,
            count: ADC_CHANNEL_COUNT,
            average: ADC_AVERAGE,
        }
    }
}

/// Accumulator of a single channel.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct ChannelSampleSet {
    sum: u32,
    count: u8,
    published: Option<u16>,
}

impl ChannelSampleSet {
    fn restart(&mut self) {
        self.sum = 0;
        self.count = 0;
    }

    fn accumulate(&mut self, sample: u16) {
        if self.count == 0 {
            self.sum = sample as u32;
        } else {
            self.sum += sample as u32;
        }
        self.count += 1;
    }

    fn publish(&mut self) -> u16 {
        let mean = (self.sum / self.count as u32) as u16;
        self.published = Some(mean);
        self.restart();
        mean
    }

    pub fn published(&self) -> Option<u16> {
        self.published
    }
}

/// Averaged value of one channel, returned when the channel finishes.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Reading {
    pub channel: u8,
    pub average: u16,
}

pub struct Acquisition {
    config: AcquisitionConfig,
    phase: Phase,
    channel: u8,
    sets: [ChannelSampleSet; MAX_CHANNELS],
    triggered: bool,
    cycles: u16,
}

impl Acquisition {
    pub fn new(config: AcquisitionConfig) -> Acquisition {
        Acquisition {
            config,
            phase: Phase::Idle,
            channel: config.start,
            sets: [ChannelSampleSet::default(); MAX_CHANNELS],
            triggered: false,
            cycles: 0,
        }
    }

    /// Start a fresh cycle. Ignored while a cycle is still converting.
    pub fn trigger<H: ConversionHw>(&mut self, hw: &mut H) -> bool {
        if self.phase == Phase::Running {
            debug!("acquisition trigger ignored, channel {} busy", self.channel);
            return false;
        }
        self.triggered = true;
        self.channel = self.config.start;
        self.sets[self.channel as usize].restart();
        hw.start_conversion(self.channel);
        self.phase = Phase::Running;
        true
    }

    // called from the conversion-complete interrupt
    pub fn on_conversion_complete<H: ConversionHw>(&mut self, hw: &mut H) -> Option<Reading> {
        if self.phase != Phase::Running {
            return None;
        }
        let sample = hw.read_sample();
        let channel = self.channel;
        let set = &mut self.sets[channel as usize];
        set.accumulate(sample);
        if set.count < self.config.average {
            hw.start_conversion(channel);
            return None;
        }

        let average = set.publish();
        trace!("adc{} average {}", channel, average);
        let next = channel + 1;
        if next < self.config.end() {
            self.channel = next;
            self.sets[next as usize].restart();
            hw.start_conversion(next);
        } else {
            self.channel = self.config.start;
            self.phase = Phase::CycleDone;
            self.cycles = self.cycles.wrapping_add(1);
            debug!("acquisition cycle {} done", self.cycles);
        }
        Some(Reading { channel, average })
    }

    /// true until the first trigger of the machine's life
    pub fn needs_cold_start(&self) -> bool {
        self.phase == Phase::Idle && !self.triggered
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// completed cycles, wrapping
    pub fn cycles(&self) -> u16 {
        self.cycles
    }

    /// latest published average of `channel`
    pub fn published(&self, channel: u8) -> Option<u16> {
        self.sets.get(channel as usize).and_then(|set| set.published())
    }

    #[cfg(test)]
    fn sample_set(&self, channel: u8) -> Option<&ChannelSampleSet> {
        self.sets.get(channel as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct FakeAdc {
        started: Vec<u8>,
        samples: VecDeque<u16>,
        reads: usize,
    }

    impl FakeAdc {
        fn with_samples(samples: &[u16]) -> FakeAdc {
            FakeAdc {
                samples: samples.iter().copied().collect(),
                ..FakeAdc::default()
            }
        }
    }

    impl ConversionHw for FakeAdc {
        fn start_conversion(&mut self, channel: u8) {
            self.started.push(channel);
        }

        fn read_sample(&mut self) -> u16 {
            self.reads += 1;
            self.samples.pop_front().unwrap_or(0)
        }
    }

    // deliver conversion-complete signals until the cycle finishes
    fn run_cycle(acq: &mut Acquisition, adc: &mut FakeAdc) -> Vec<Reading> {
        let mut readings = Vec::new();
        while acq.phase() == Phase::Running {
            if let Some(reading) = acq.on_conversion_complete(adc) {
                readings.push(reading);
            }
        }
        readings
    }

    #[test]
    fn config_validation() {
        assert_eq!(AcquisitionConfig::new(0, 0, 4), Err(ConfigError::NoChannels));
        assert_eq!(AcquisitionConfig::new(1, 1, 0), Err(ConfigError::ZeroAverage));
        assert_eq!(
            AcquisitionConfig::new(6, 3, 1),
            Err(ConfigError::ChannelOutOfRange { start: 6, count: 3 })
        );
        assert!(AcquisitionConfig::new(0, 8, 1).is_ok());
    }

    #[test]
    fn single_channel_average_of_four() {
        let mut acq = Acquisition::new(AcquisitionConfig::new(0, 1, 4).unwrap());
        let mut adc = FakeAdc::with_samples(&[100, 100, 100, 100]);
        assert!(acq.trigger(&mut adc));
        let readings = run_cycle(&mut acq, &mut adc);
        assert_eq!(readings, vec![Reading { channel: 0, average: 100 }]);
        assert_eq!(acq.published(0), Some(100));
        assert_eq!(acq.phase(), Phase::CycleDone);
    }

    #[test]
    fn cycle_consumes_count_times_average_conversions() {
        let samples: Vec<u16> = (1..=12).collect();
        let mut acq = Acquisition::new(AcquisitionConfig::new(2, 3, 4).unwrap());
        let mut adc = FakeAdc::with_samples(&samples);
        acq.trigger(&mut adc);
        let readings = run_cycle(&mut acq, &mut adc);
        assert_eq!(adc.reads, 12);
        assert_eq!(adc.started, vec![2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4]);
        // truncated means of 1..4, 5..8, 9..12
        assert_eq!(
            readings,
            vec![
                Reading { channel: 2, average: 2 },
                Reading { channel: 3, average: 6 },
                Reading { channel: 4, average: 10 },
            ]
        );
        assert_eq!(acq.channel(), 2);
        assert_eq!(acq.cycles(), 1);
    }

    #[test]
    fn mean_truncates() {
        let mut acq = Acquisition::new(AcquisitionConfig::new(0, 1, 4).unwrap());
        let mut adc = FakeAdc::with_samples(&[1, 2, 2, 2]);
        acq.trigger(&mut adc);
        run_cycle(&mut acq, &mut adc);
        assert_eq!(acq.published(0), Some(1));
    }

    #[test]
    fn full_scale_samples_do_not_overflow() {
        let mut acq = Acquisition::new(AcquisitionConfig::new(0, 1, 255).unwrap());
        let mut adc = FakeAdc::with_samples(&[1023; 255]);
        acq.trigger(&mut adc);
        run_cycle(&mut acq, &mut adc);
        assert_eq!(acq.published(0), Some(1023));
    }

    #[test]
    fn polling_finished_cycle_is_idempotent() {
        let mut acq = Acquisition::new(AcquisitionConfig::new(1, 2, 2).unwrap());
        let mut adc = FakeAdc::with_samples(&[10, 20, 30, 40]);
        acq.trigger(&mut adc);
        run_cycle(&mut acq, &mut adc);
        let sets: Vec<ChannelSampleSet> = (0..8).map(|c| *acq.sample_set(c).unwrap()).collect();
        let starts = adc.started.len();
        for _ in 0..10 {
            assert_eq!(acq.phase(), Phase::CycleDone);
            assert!(!acq.needs_cold_start());
            assert_eq!(acq.on_conversion_complete(&mut adc), None);
        }
        let after: Vec<ChannelSampleSet> = (0..8).map(|c| *acq.sample_set(c).unwrap()).collect();
        assert_eq!(sets, after);
        assert_eq!(adc.started.len(), starts);
        assert_eq!(acq.published(1), Some(15));
        assert_eq!(acq.published(2), Some(35));
    }

    #[test]
    fn trigger_while_running_is_ignored() {
        let mut acq = Acquisition::new(AcquisitionConfig::new(0, 1, 4).unwrap());
        let mut adc = FakeAdc::with_samples(&[8, 8, 8, 8]);
        acq.trigger(&mut adc);
        acq.on_conversion_complete(&mut adc);
        assert!(!acq.trigger(&mut adc));
        assert_eq!(adc.started, vec![0, 0]);
        run_cycle(&mut acq, &mut adc);
        assert_eq!(acq.published(0), Some(8));
    }

    #[test]
    fn new_cycle_starts_from_fresh_sums() {
        let mut acq = Acquisition::new(AcquisitionConfig::new(0, 1, 2).unwrap());
        let mut adc = FakeAdc::with_samples(&[100, 200, 7, 9]);
        acq.trigger(&mut adc);
        run_cycle(&mut acq, &mut adc);
        assert_eq!(acq.published(0), Some(150));
        assert!(acq.trigger(&mut adc));
        // previous cycle's value stays visible until the new one is ready
        acq.on_conversion_complete(&mut adc);
        assert_eq!(acq.published(0), Some(150));
        run_cycle(&mut acq, &mut adc);
        assert_eq!(acq.published(0), Some(8));
        assert_eq!(acq.cycles(), 2);
    }

    #[test]
    fn cold_start_only_before_first_trigger() {
        let mut acq = Acquisition::new(AcquisitionConfig::default());
        let mut adc = FakeAdc::default();
        assert!(acq.needs_cold_start());
        acq.trigger(&mut adc);
        assert!(!acq.needs_cold_start());
        assert_eq!(adc.started, vec![ADC_CHANNEL_START]);
    }

    #[test]
    fn stray_completion_while_idle_is_dropped() {
        let mut acq = Acquisition::new(AcquisitionConfig::default());
        let mut adc = FakeAdc::with_samples(&[5]);
        assert_eq!(acq.on_conversion_complete(&mut adc), None);
        assert_eq!(adc.reads, 0);
        assert_eq!(acq.phase(), Phase::Idle);
    }
}
