//! register level adapters behind the scheduler's hardware traits
//!
//! Each adapter owns its peripheral and lives in an interrupt mutex next to
//! the scheduler state, so handler and control loop reach it the same way.

use avr_device::interrupt;
use multi_shield::prelude::*;
use multi_shield::{hal, pac};
use hal::port::mode::Floating;

use smartfarm_core::config::DEBOUNCE_TIMER0_RELOAD;
use smartfarm_core::hw::{ConversionHw, RawInputs, SerialLine, TimerHw};

// ADMUX: AVcc reference
const REFS_AVCC: u8 = 0x40;
const MUX_MASK: u8 = 0x0F;

// ADCSRA
const ADEN: u8 = 0x80;
const ADSC: u8 = 0x40;
const ADIF: u8 = 0x10;
const ADIE: u8 = 0x08;
const ADPS_128: u8 = 0x07;

// EICRA: falling edge on INT0
const ISC01: u8 = 0x02;

//==========================================================

/// ADC with the conversion-complete interrupt
pub struct AdcUnit {
    adc: pac::ADC,
}

impl AdcUnit {
    /// enable at clk/128 and run the first, discarded, conversion
    pub fn new(adc: pac::ADC) -> AdcUnit {
        adc.admux.write(|w| unsafe { w.bits(REFS_AVCC) });
        adc.adcsra.write(|w| unsafe { w.bits(ADEN | ADPS_128 | ADSC) });
        while adc.adcsra.read().bits() & ADSC != 0 {}
        let _ = adc.adc.read().bits();
        // clear the completion flag before the interrupt is armed
        adc.adcsra.write(|w| unsafe { w.bits(ADEN | ADPS_128 | ADIF | ADIE) });
        AdcUnit { adc }
    }
}

impl ConversionHw for AdcUnit {
    fn start_conversion(&mut self, channel: u8) {
        self.adc
            .admux
            .write(|w| unsafe { w.bits(REFS_AVCC | (channel & MUX_MASK)) });
        self.adc
            .adcsra
            .modify(|r, w| unsafe { w.bits((r.bits() & !ADIF) | ADSC) });
    }

    fn read_sample(&mut self) -> u16 {
        self.adc.adc.read().bits()
    }
}

//==========================================================

/// TIMER1, prescaler 256, overflow every 100 ms once reloaded
pub struct TimeBaseTimer {
    tc1: pac::TC1,
}

impl TimeBaseTimer {
    pub fn new(tc1: pac::TC1) -> TimeBaseTimer {
        tc1.tccr1b.write(|w| w.cs1().prescale_256());
        // first overflow right away
        tc1.tcnt1.write(|w| unsafe { w.bits(0xFFFF) });
        tc1.timsk1.write(|w| w.toie1().set_bit());
        TimeBaseTimer { tc1 }
    }
}

impl TimerHw for TimeBaseTimer {
    fn reload(&mut self, count: u16) {
        self.tc1.tcnt1.write(|w| unsafe { w.bits(count) });
    }
}

//==========================================================

/// TIMER0 at clk/1024 sampling the switches on PORTD about every 10 ms
pub struct KeySampler {
    tc0: pac::TC0,
}

impl KeySampler {
    pub fn new(tc0: pac::TC0) -> KeySampler {
        tc0.tccr0b.write(|w| w.cs0().prescale_1024());
        tc0.tcnt0.write(|w| unsafe { w.bits(DEBOUNCE_TIMER0_RELOAD) });
        tc0.timsk0.write(|w| w.toie0().set_bit());
        KeySampler { tc0 }
    }

    pub fn rearm(&mut self, _cs: &interrupt::CriticalSection) {
        self.tc0.tcnt0.write(|w| unsafe { w.bits(DEBOUNCE_TIMER0_RELOAD) });
    }
}

impl RawInputs for KeySampler {
    fn read_raw_levels(&mut self) -> u8 {
        // PORTD is owned by the pin wrappers, PIND is only read
        unsafe { (*pac::PORTD::ptr()).pind.read().bits() }
    }
}

//==========================================================

/// flow meter pulses on INT0, falling edge
pub fn enable_flow_pulses(exint: &pac::EXINT) {
    exint.eicra.write(|w| unsafe { w.bits(ISC01) });
    exint.eimsk.modify(|_, w| w.int0().set_bit());
}

//==========================================================

/// USART carrying the readout lines
pub struct SerialLink {
    serial: multi_shield::Serial<Floating>,
}

impl SerialLink {
    pub fn new(serial: multi_shield::Serial<Floating>) -> SerialLink {
        SerialLink { serial }
    }

    pub fn port(&mut self) -> &mut multi_shield::Serial<Floating> {
        &mut self.serial
    }
}

impl SerialLine for SerialLink {
    type Error = core::convert::Infallible;

    fn write_line(&mut self, text: &str) -> Result<(), Self::Error> {
        ufmt::uwrite!(&mut self.serial, "{}\n", text).void_unwrap();
        Ok(())
    }
}
