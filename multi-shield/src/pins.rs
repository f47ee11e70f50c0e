use crate::hal::port::PortExt;

avr_hal_generic::impl_board_pins! {
    #[port_defs]
    use crate::hal::port;

    /// Generic DDR that works for all ports
    pub struct DDR {
        portb: crate::pac::PORTB,
        portc: crate::pac::PORTC,
        portd: crate::pac::PORTD,
    }

    /// Pins of the Multi-purpose Shield, named by what is wired to them
    pub struct Pins {
        /// `A0`, potentiometer
        ///
        /// * ADC0 (ADC input channel 0)
        pub poti: portc::pc0::PC0,
        /// `A1`, light dependent resistor
        ///
        /// * ADC1 (ADC input channel 1)
        pub ldr: portc::pc1::PC1,
        /// `A2`, LM35D temperature sensor
        ///
        /// * ADC2 (ADC input channel 2)
        pub lm35: portc::pc2::PC2,
        /// `A3`, extension header
        ///
        /// * ADC3 (ADC input channel 3)
        pub a3: portc::pc3::PC3,
        /// `A4`
        ///
        /// * SDA (2-wire serial bus data input/output line)
        pub sda: portc::pc4::PC4,
        /// `A5`
        ///
        /// * SCL (2-wire serial bus clock line)
        pub scl: portc::pc5::PC5,

        /// `RX`
        pub rx: portd::pd0::PD0,
        /// `TX`
        pub tx: portd::pd1::PD1,
        /// `SW1`
        ///
        /// * INT0 (external interrupt 0), shared with the flow meter input
        pub sw1: portd::pd2::PD2,
        /// `SW2`
        ///
        /// * INT1 (external interrupt 1)
        pub sw2: portd::pd3::PD3,
        /// `DHT11`
        pub dht: portd::pd4::PD4,
        /// `BUZZER`
        pub buzzer: portd::pd5::PD5,
        /// `IR`
        pub ir: portd::pd6::PD6,
        /// `D7`, LCD backlight
        pub backlight: portd::pd7::PD7,

        /// `D8`, LCD register select
        pub lcd_rs: portb::pb0::PB0,
        /// `D9`, LCD enable
        pub lcd_en: portb::pb1::PB1,
        /// `D10`, LCD DB4
        pub lcd_d4: portb::pb2::PB2,
        /// `D11`, LCD DB5
        pub lcd_d5: portb::pb3::PB3,
        /// `D12`, LCD DB6
        pub lcd_d6: portb::pb4::PB4,
        /// `D13`, LCD DB7
        pub lcd_d7: portb::pb5::PB5,
    }
}
