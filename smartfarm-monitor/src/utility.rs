//! hex trace over the serial port
//! These functions are only used in debug builds

use multi_shield::hal;
use multi_shield::prelude::*;
use hal::port::mode::Floating;

const HEX: &[u8; 16] = b"0123456789ABCDEF";

pub fn send_hex_byte(serial: &mut multi_shield::Serial<Floating>, b: u8) {
    let hi = HEX[(b >> 4) as usize] as char;
    let lo = HEX[(b & 0xF) as usize] as char;
    ufmt::uwrite!(serial, "{}{}", hi, lo).void_unwrap();
}

pub fn send_u16(serial: &mut multi_shield::Serial<Floating>, n: u16) {
    send_hex_byte(serial, (n >> 8) as u8);
    send_hex_byte(serial, (n & 0xFF) as u8);
    ufmt::uwriteln!(serial, "\r").void_unwrap();
}

pub fn send_reg(serial: &mut multi_shield::Serial<Floating>, addr: u8) {
    let ptr = addr as *const u8;
    let b = unsafe { core::ptr::read_volatile(ptr) };
    send_hex_byte(serial, b);
    ufmt::uwriteln!(serial, "\r").void_unwrap();
}
