//! HD44780 character LCD in 4-bit mode
//!
//! RS, EN and DB4-DB7 sit on PORTB (PB0, PB1, PB2-PB5). The display is
//! written only, the busy flag is never read, so every transfer waits the
//! worst case execution time instead.

use multi_shield::hal;
use multi_shield::prelude::*;
use hal::port::mode::Output;
use hal::port::portb::{PB0, PB1, PB2, PB3, PB4, PB5};

use smartfarm_core::hw::TextDisplay;

const BOOTUP_MS: u16 = 15;
const ENABLE_US: u16 = 20;
const WRITEDATA_US: u16 = 46;
const COMMAND_US: u16 = 42;
const SOFT_RESET_MS1: u16 = 5;
const SOFT_RESET_MS2: u16 = 1;
const SET_4BITMODE_MS: u16 = 5;
const CLEAR_DISPLAY_MS: u16 = 2;

const CLEAR_DISPLAY: u8 = 0x01;
const SET_ENTRY: u8 = 0x04;
const ENTRY_INCREASE: u8 = 0x02;
const SET_DISPLAY: u8 = 0x08;
const DISPLAY_ON: u8 = 0x04;
const SET_FUNCTION: u8 = 0x20;
const FUNCTION_2LINE: u8 = 0x08;
const SET_DDADR: u8 = 0x80;

// DDRAM start of rows 1 to 4
const ROW_ADDRESS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LcdError {
    /// rows count from 1 to 4
    NoSuchRow(u8),
}

pub struct Lcd {
    rs: PB0<Output>,
    en: PB1<Output>,
    d4: PB2<Output>,
    d5: PB3<Output>,
    d6: PB4<Output>,
    d7: PB5<Output>,
}

impl Lcd {
    pub fn new(
        rs: PB0<Output>,
        en: PB1<Output>,
        d4: PB2<Output>,
        d5: PB3<Output>,
        d6: PB4<Output>,
        d7: PB5<Output>,
    ) -> Lcd {
        let mut lcd = Lcd { rs, en, d4, d5, d6, d7 };
        lcd.init();
        lcd
    }

    // soft reset into 8-bit mode three times, then switch to 4-bit
    fn init(&mut self) {
        self.rs.set_low().void_unwrap();
        self.en.set_low().void_unwrap();
        multi_shield::delay_ms(BOOTUP_MS);

        self.out_nibble(0x03);
        multi_shield::delay_ms(SOFT_RESET_MS1);
        self.enable();
        multi_shield::delay_ms(SOFT_RESET_MS2);
        self.enable();
        multi_shield::delay_ms(SOFT_RESET_MS2);

        self.out_nibble(0x02);
        multi_shield::delay_ms(SET_4BITMODE_MS);

        self.command(SET_FUNCTION | FUNCTION_2LINE);
        self.command(SET_DISPLAY | DISPLAY_ON);
        self.command(SET_ENTRY | ENTRY_INCREASE);
        self.clear();
    }

    pub fn clear(&mut self) {
        self.command(CLEAR_DISPLAY);
        multi_shield::delay_ms(CLEAR_DISPLAY_MS);
    }

    pub fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), LcdError> {
        let base = row
            .checked_sub(1)
            .and_then(|r| ROW_ADDRESS.get(r as usize))
            .ok_or(LcdError::NoSuchRow(row))?;
        self.command(SET_DDADR | base.wrapping_add(col));
        Ok(())
    }

    pub fn data(&mut self, b: u8) {
        self.rs.set_high().void_unwrap();
        self.out_byte(b);
        multi_shield::delay_us(WRITEDATA_US);
    }

    fn command(&mut self, b: u8) {
        self.rs.set_low().void_unwrap();
        self.out_byte(b);
        multi_shield::delay_us(COMMAND_US);
    }

    fn out_byte(&mut self, b: u8) {
        self.out_nibble(b >> 4);
        self.out_nibble(b & 0x0F);
    }

    fn out_nibble(&mut self, nibble: u8) {
        if nibble & 0x01 != 0 {
            self.d4.set_high().void_unwrap();
        } else {
            self.d4.set_low().void_unwrap();
        }
        if nibble & 0x02 != 0 {
            self.d5.set_high().void_unwrap();
        } else {
            self.d5.set_low().void_unwrap();
        }
        if nibble & 0x04 != 0 {
            self.d6.set_high().void_unwrap();
        } else {
            self.d6.set_low().void_unwrap();
        }
        if nibble & 0x08 != 0 {
            self.d7.set_high().void_unwrap();
        } else {
            self.d7.set_low().void_unwrap();
        }
        self.enable();
    }

    fn enable(&mut self) {
        self.en.set_high().void_unwrap();
        multi_shield::delay_us(ENABLE_US);
        self.en.set_low().void_unwrap();
    }
}

impl TextDisplay for Lcd {
    type Error = LcdError;

    fn write_text(&mut self, text: &str, row: u8, col: u8) -> Result<(), LcdError> {
        self.set_cursor(row, col)?;
        for b in text.bytes() {
            self.data(b);
        }
        Ok(())
    }
}
