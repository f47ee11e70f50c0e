//! firmware for the SmartFarm mini monitor on the Multi-purpose Shield
//! keeps time from TIMER1, debounces SW1/SW2 from TIMER0, samples the
//! pressure sensor with the ADC interrupt and counts flow pulses on INT0.
//! Values go to the LCD and the serial port once per second.

#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]

extern crate panic_halt;

use avr_device::interrupt;
use core::cell::RefCell;
use core::ops::DerefMut;

use multi_shield::prelude::*;
use multi_shield::hal;
use hal::port::mode::Floating;

use smartfarm_core::acquisition::AcquisitionConfig;
use smartfarm_core::debounce::DebounceConfig;
use smartfarm_core::dispatch::{Dispatcher, DispatcherConfig, Progress};
use smartfarm_core::fixed_point::SignedDecimal;
use smartfarm_core::hw::TextDisplay;
use smartfarm_core::SchedulerState;
use smartfarm_core::config::{ADC_AVERAGE, ADC_CHANNEL_COUNT, ADC_CHANNEL_START, TIMER1_RELOAD};

//==========================================================

mod lcd;
use crate::lcd::Lcd;

mod peripherals;
use crate::peripherals::{AdcUnit, KeySampler, SerialLink, TimeBaseTimer};

#[cfg(debug_assertions)]
mod utility;
#[cfg(debug_assertions)]
use utility::*;

//==========================================================
// state shared with the interrupt handlers

static SCHEDULERHANDLE: interrupt::Mutex<RefCell<Option<SchedulerState>>> =
    interrupt::Mutex::new(RefCell::new(None));

static ADCHANDLE: interrupt::Mutex<RefCell<Option<AdcUnit>>> =
    interrupt::Mutex::new(RefCell::new(None));

static TIMEBASEHANDLE: interrupt::Mutex<RefCell<Option<TimeBaseTimer>>> =
    interrupt::Mutex::new(RefCell::new(None));

static KEYSHANDLE: interrupt::Mutex<RefCell<Option<KeySampler>>> =
    interrupt::Mutex::new(RefCell::new(None));

const SPLASH_MS: u16 = 500;

//==========================================================

#[hal::entry]
fn main() -> ! {
    let dp = multi_shield::Peripherals::take().unwrap();

    // turn off unused modules
    let cpu = dp.CPU;
    cpu.prr.write(|w| {
        w.prtim2().set_bit();
        w.prtwi().set_bit();
        w.prspi().set_bit()
    });
    // turn off analog comparator
    dp.AC.acsr.write(|w| w.acd().set_bit());

    let mut pins = multi_shield::Pins::new(dp.PORTB, dp.PORTC, dp.PORTD);

    // switches, inputs with pullup
    let _sw1 = pins.sw1.into_pull_up_input(&mut pins.ddr);
    let _sw2 = pins.sw2.into_pull_up_input(&mut pins.ddr);

    let mut serial = multi_shield::Serial::<Floating>::new(
        dp.USART0,
        pins.rx,
        pins.tx.into_output(&mut pins.ddr),
        19200.into_baudrate(),
    );
    ufmt::uwriteln!(&mut serial, "\r\nUART ready\r").void_unwrap();
    let mut link = SerialLink::new(serial);

    // LCD, backlight on before the controller is reset
    let mut backlight = pins.backlight.into_output(&mut pins.ddr);
    backlight.set_high().void_unwrap();
    multi_shield::delay_ms(SPLASH_MS);
    let mut lcd = Lcd::new(
        pins.lcd_rs.into_output(&mut pins.ddr),
        pins.lcd_en.into_output(&mut pins.ddr),
        pins.lcd_d4.into_output(&mut pins.ddr),
        pins.lcd_d5.into_output(&mut pins.ddr),
        pins.lcd_d6.into_output(&mut pins.ddr),
        pins.lcd_d7.into_output(&mut pins.ddr),
    );
    if let Err(_e) = lcd.write_text("LCD-ready", 1, 0) {
        #[cfg(debug_assertions)]
        ufmt::uwriteln!(link.port(), "lcd splash failed\r").void_unwrap();
    }
    multi_shield::delay_ms(SPLASH_MS);
    lcd.clear();

    let acquisition = AcquisitionConfig::new(ADC_CHANNEL_START, ADC_CHANNEL_COUNT, ADC_AVERAGE).unwrap();
    let state = SchedulerState::new(TIMER1_RELOAD, DebounceConfig::default(), acquisition);
    let mut dispatcher =
        Dispatcher::new(DispatcherConfig::standard().unwrap(), SignedDecimal::new()).unwrap();
    if let Err(_e) = dispatcher.start(&mut lcd) {
        #[cfg(debug_assertions)]
        ufmt::uwriteln!(link.port(), "lcd labels failed\r").void_unwrap();
    }

    let adc = AdcUnit::new(dp.ADC);
    let time_base = TimeBaseTimer::new(dp.TC1);
    let keys = KeySampler::new(dp.TC0);
    peripherals::enable_flow_pulses(&dp.EXINT);

    interrupt::free(|cs| {
        // transfer to static variables
        SCHEDULERHANDLE.borrow(cs).replace(Some(state));
        ADCHANDLE.borrow(cs).replace(Some(adc));
        TIMEBASEHANDLE.borrow(cs).replace(Some(time_base));
        KEYSHANDLE.borrow(cs).replace(Some(keys));
    });

    // enable interrupts
    unsafe {
        interrupt::enable();
    }

    #[cfg(debug_assertions)]
    {
        ufmt::uwriteln!(link.port(), "SmartFarm Start\r").void_unwrap();
        ufmt::uwrite!(link.port(), "prr:").void_unwrap();
        send_reg(link.port(), 0x64);
    }

    loop {
        // drain everything the handlers produced in one critical section
        #[cfg_attr(not(debug_assertions), allow(unused_variables))]
        let (progress, average) = interrupt::free(|cs| {
            let mut state = SCHEDULERHANDLE.borrow(cs).borrow_mut();
            let mut adc = ADCHANDLE.borrow(cs).borrow_mut();
            match (state.deref_mut(), adc.deref_mut()) {
                (Some(state), Some(adc)) => {
                    let progress = dispatcher.collect(state, adc);
                    (progress, state.acquisition.published(ADC_CHANNEL_START))
                }
                _ => (Progress::default(), None),
            }
        });

        #[cfg(debug_assertions)]
        trace_progress(link.port(), progress, average);

        if let Err(_e) = dispatcher.publish(&mut lcd, &mut link) {
            #[cfg(debug_assertions)]
            ufmt::uwriteln!(link.port(), "publish failed\r").void_unwrap();
        }
    }
}

// published average each time a new cycle starts
#[cfg(debug_assertions)]
fn trace_progress(serial: &mut multi_shield::Serial<Floating>, progress: Progress, average: Option<u16>) {
    if !progress.triggered {
        return;
    }
    if let Some(average) = average {
        ufmt::uwrite!(serial, "adc_val:").void_unwrap();
        send_u16(serial, average);
    }
}

//==========================================================

// interrupt handler for Timer1 overflow, 100 ms time base
#[interrupt(atmega328p)]
fn TIMER1_OVF() {
    // create unneeded interrupt context for static functions
    // unneeded because we are in interrupt and can't be interrupted
    // again in avr
    interrupt::free(move |cs| {
        let mut state = SCHEDULERHANDLE.borrow(cs).borrow_mut();
        let mut timer = TIMEBASEHANDLE.borrow(cs).borrow_mut();
        if let (Some(state), Some(timer)) = (state.deref_mut(), timer.deref_mut()) {
            state.ticks.on_overflow(timer);
        }
    });
}

//==========================================================

// interrupt handler for Timer0 overflow, key sampling
#[interrupt(atmega328p)]
fn TIMER0_OVF() {
    interrupt::free(move |cs| {
        let mut state = SCHEDULERHANDLE.borrow(cs).borrow_mut();
        let mut keys = KEYSHANDLE.borrow(cs).borrow_mut();
        if let (Some(state), Some(keys)) = (state.deref_mut(), keys.deref_mut()) {
            keys.rearm(cs);
            state.keys.sample_inputs(keys);
        }
    });
}

//==========================================================

// interrupt handler for ADC conversion complete
#[interrupt(atmega328p)]
fn ADC() {
    interrupt::free(move |cs| {
        let mut state = SCHEDULERHANDLE.borrow(cs).borrow_mut();
        let mut adc = ADCHANDLE.borrow(cs).borrow_mut();
        if let (Some(state), Some(adc)) = (state.deref_mut(), adc.deref_mut()) {
            state.acquisition.on_conversion_complete(adc);
        }
    });
}

//==========================================================

// interrupt handler for INT0, one flow meter pulse
#[interrupt(atmega328p)]
fn INT0() {
    interrupt::free(move |cs| {
        if let Some(ref mut state) = SCHEDULERHANDLE.borrow(cs).borrow_mut().deref_mut() {
            state.pulses.on_pulse();
        }
    });
}
