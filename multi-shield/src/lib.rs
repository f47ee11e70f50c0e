//! Board Support Crate for the Multi-purpose Shield v1 on an ATmega328P at 16 MHz.
//!
//! Re-exports the HAL with pins named by their function on the shield
//! instead of the MCU names, plus the clocked types the firmware needs.
//!
//! ```no_run
//! #![no_std]
//! #![no_main]
//!
//! extern crate panic_halt;
//!
//! use multi_shield::prelude::*;
//!
//! #[multi_shield::entry]
//! fn main() -> ! {
//!     let dp = multi_shield::Peripherals::take().unwrap();
//!     let mut pins = multi_shield::Pins::new(dp.PORTB, dp.PORTC, dp.PORTD);
//!     let mut backlight = pins.backlight.into_output(&mut pins.ddr);
//!     backlight.set_high().void_unwrap();
//!
//!     loop {}
//! }
//! ```

#![no_std]

// Expose hal & pac crates
pub use atmega328p_hal as hal;
pub use crate::hal::pac;

/// See [`avr_device::entry`](https://docs.rs/avr-device/latest/avr_device/attr.entry.html).
#[cfg(feature = "rt")]
pub use crate::hal::entry;

pub use crate::pac::Peripherals;

mod pins;
pub use crate::pins::*;

pub mod prelude {
    pub use crate::hal::prelude::*;
    pub use crate::hal::usart::BaudrateArduinoExt as _;
}

#[cfg(debug_assertions)]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    use prelude::*;

    let mut serial: Serial<hal::port::mode::Floating> =
        unsafe { core::mem::MaybeUninit::uninit().assume_init() };

    ufmt::uwriteln!(&mut serial, "Firmware panic!\r").void_unwrap();

    if let Some(loc) = info.location() {
        ufmt::uwriteln!(
            &mut serial,
            "  At {}:{}:{}\r",
            loc.file(),
            loc.line(),
            loc.column(),
        )
        .void_unwrap();
    }

    loop {}
}

/// Busy-Delay, for drivers that want an `embedded-hal` delay
pub type Delay = hal::delay::Delay<hal::clock::MHz16>;

/// Wait (busy spin) for `ms` milliseconds
pub fn delay_ms(ms: u16) {
    use prelude::*;

    Delay::new().delay_ms(ms)
}

/// Wait (busy spin) for `us` microseconds
pub fn delay_us(us: u16) {
    use prelude::*;

    Delay::new().delay_us(us)
}

/// Serial (UART) interface on pins `RX` and `TX`
///
/// ```no_run
/// let mut serial = multi_shield::Serial::new(
///     dp.USART0,
///     pins.rx,
///     pins.tx.into_output(&mut pins.ddr),
///     19200.into_baudrate(),
/// );
/// ```
pub type Serial<IMODE> = hal::usart::Usart0<hal::clock::MHz16, IMODE>;
