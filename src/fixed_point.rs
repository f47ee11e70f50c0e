//! fixed point values rendered as decimal text
//!
//! A value is first written as a sign character and ten zero padded
//! digits, index 0 holding the sign:
//!
//! ```text
//!  index  0 1 2 3 4 5 6 7 8 9 10
//!         _ 0 0 0 4 8 8 7 6 0 0     4887600
//! ```
//!
//! A `DecimalLayout` then picks the digits to show: `start` is the first
//! digit printed, the decimal point sits between `comma - 1` and `comma`,
//! and `frac` digits follow it. `comma == 0` prints an integer. A layout
//! may also round half up at one digit, clearing the digits after it.

use heapless::String;

use crate::error::ConfigError;

/// widest rendering: sign, ten digits, point and a leading zero
pub const TEXT_CAPACITY: usize = 16;

pub type Text = String<TEXT_CAPACITY>;

const SIGN: usize = 0;
const LAST_DIGIT: usize = 10;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct DecimalLayout {
    start: u8,
    comma: u8,
    frac: u8,
    round_digit: Option<u8>,
}

impl DecimalLayout {
    pub fn new(start: u8, comma: u8, frac: u8) -> Result<DecimalLayout, ConfigError> {
        let bad = ConfigError::BadLayout { start, comma, frac };
        if start == 0 || start as usize > LAST_DIGIT {
            return Err(bad);
        }
        if comma == 0 {
            if frac != 0 {
                return Err(bad);
            }
        } else if start > comma || comma as usize + frac as usize > LAST_DIGIT + 1 {
            return Err(bad);
        }
        Ok(DecimalLayout {
            start,
            comma,
            frac,
            round_digit: None,
        })
    }

    pub fn rounded_at(mut self, digit: u8) -> DecimalLayout {
        self.round_digit = Some(digit);
        self
    }

    /// whole number showing the digits from `start` on
    pub fn integer(start: u8) -> Result<DecimalLayout, ConfigError> {
        DecimalLayout::new(start, 0, 0)
    }
}

/// Formatting collaborator used by the dispatcher.
pub trait FixedPointFormat {
    fn format_fixed_point(&self, raw: i32, layout: DecimalLayout) -> Text;
}

/// Default formatter, blanks leading zeros unless told otherwise.
#[derive(Copy, Clone, Debug)]
pub struct SignedDecimal {
    keep_leading_zeros: bool,
}

impl SignedDecimal {
    pub const fn new() -> SignedDecimal {
        SignedDecimal {
            keep_leading_zeros: false,
        }
    }

    pub fn keep_leading_zeros(mut self) -> SignedDecimal {
        self.keep_leading_zeros = true;
        self
    }
}

impl Default for SignedDecimal {
    fn default() -> SignedDecimal {
        SignedDecimal::new()
    }
}

impl FixedPointFormat for SignedDecimal {
    fn format_fixed_point(&self, raw: i32, layout: DecimalLayout) -> Text {
        let mut digits = render(raw);
        if let Some(digit) = layout.round_digit {
            round(&mut digits, digit as usize);
        }
        place(&digits, layout, self.keep_leading_zeros)
    }
}

fn render(raw: i32) -> [u8; 11] {
    let mut digits = [b'0'; 11];
    digits[SIGN] = if raw < 0 { b'-' } else { b' ' };
    let mut n = raw.unsigned_abs();
    for slot in digits[1..].iter_mut().rev() {
        *slot = b'0' + (n % 10) as u8;
        n /= 10;
    }
    digits
}

fn round(digits: &mut [u8; 11], digit: usize) {
    if digit == SIGN || digit > LAST_DIGIT {
        return;
    }
    if digits[digit] >= b'5' {
        for d in digits[1..digit].iter_mut().rev() {
            *d += 1;
            if *d <= b'9' {
                break;
            }
            *d = b'0';
        }
    }
    for d in digits[digit..].iter_mut() {
        *d = b'0';
    }
}

fn place(digits: &[u8; 11], layout: DecimalLayout, keep_leading_zeros: bool) -> Text {
    let start = layout.start as usize;
    let comma = layout.comma as usize;
    let frac = layout.frac as usize;

    let mut out = Text::new();
    // capacity covers the widest layout, pushes cannot fail
    let mut push = |c: u8| {
        out.push(c as char).ok();
    };
    push(digits[SIGN]);

    let mut shown = keep_leading_zeros;
    if comma == 0 {
        for &d in &digits[start..=LAST_DIGIT] {
            if d == b'0' && !shown {
                push(b' ');
            } else {
                push(d);
                shown = true;
            }
        }
        // a zero value still shows its last digit
        if !shown {
            out.pop();
            out.push('0').ok();
        }
        return out;
    }

    for (i, &d) in digits.iter().enumerate().take(comma).skip(start) {
        if d == b'0' && !shown {
            push(if i + 1 == comma { b'0' } else { b' ' });
        } else {
            push(d);
            shown = true;
        }
    }
    if comma == 1 {
        push(b'0');
    }
    if frac != 0 {
        push(b'.');
        for &d in &digits[comma..comma + frac] {
            push(d);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pressure() -> SignedDecimal {
        SignedDecimal::new().keep_leading_zeros()
    }

    fn bar() -> DecimalLayout {
        DecimalLayout::new(3, 4, 1).unwrap().rounded_at(7)
    }

    #[test]
    fn layout_bounds() {
        assert!(DecimalLayout::new(3, 4, 1).is_ok());
        assert!(DecimalLayout::new(1, 1, 10).is_ok());
        assert!(DecimalLayout::new(0, 4, 1).is_err());
        assert!(DecimalLayout::new(5, 4, 1).is_err());
        assert!(DecimalLayout::new(3, 9, 3).is_err());
        assert!(DecimalLayout::new(3, 0, 2).is_err());
        assert_eq!(
            DecimalLayout::integer(11),
            Err(ConfigError::BadLayout { start: 11, comma: 0, frac: 0 })
        );
    }

    #[test]
    fn renders_sign_and_ten_digits() {
        assert_eq!(&render(4_887_600), b" 0004887600");
        assert_eq!(&render(-12), b"-0000000012");
        assert_eq!(&render(i32::MIN), b"-2147483648");
    }

    #[test]
    fn rounding_carries_and_clears() {
        let mut digits = render(4_887_600);
        round(&mut digits, 7);
        assert_eq!(&digits, b" 0004890000");
        let mut digits = render(999_500);
        round(&mut digits, 7);
        assert_eq!(&digits, b" 0001000000");
        let mut digits = render(4_887_400);
        round(&mut digits, 8);
        assert_eq!(&digits, b" 0004887000");
    }

    #[test]
    fn hundred_counts_of_pressure() {
        let scaled = 100 * 48876;
        assert_eq!(pressure().format_fixed_point(scaled, bar()).as_str(), " 0.4");
        // blanking never touches the digit in front of the point
        assert_eq!(SignedDecimal::new().format_fixed_point(scaled, bar()).as_str(), " 0.4");
    }

    #[test]
    fn pressure_above_one_bar() {
        assert_eq!(pressure().format_fixed_point(528 * 48876, bar()).as_str(), " 2.5");
        assert_eq!(pressure().format_fixed_point(-528 * 48876, bar()).as_str(), "-2.5");
        // carry ripples into the units digit
        assert_eq!(pressure().format_fixed_point(19_996_000, bar()).as_str(), " 2.0");
    }

    #[test]
    fn leading_zeros_blank_except_before_comma() {
        let layout = DecimalLayout::new(2, 6, 2).unwrap();
        let plain = SignedDecimal::new();
        assert_eq!(plain.format_fixed_point(500_040, layout).as_str(), "    5.00");
        assert_eq!(plain.format_fixed_point(40, layout).as_str(), "    0.00");
        assert_eq!(plain.format_fixed_point(12_345_678, layout).as_str(), "  123.45");
    }

    #[test]
    fn comma_at_first_digit() {
        let layout = DecimalLayout::new(1, 1, 3).unwrap();
        assert_eq!(SignedDecimal::new().format_fixed_point(1_234_567_890, layout).as_str(), " 0.123");
    }

    #[test]
    fn integers() {
        let layout = DecimalLayout::integer(5).unwrap();
        let plain = SignedDecimal::new();
        assert_eq!(plain.format_fixed_point(12, layout).as_str(), "     12");
        assert_eq!(plain.format_fixed_point(0, layout).as_str(), "      0");
        assert_eq!(plain.format_fixed_point(-305, layout).as_str(), "-   305");
        assert_eq!(
            plain.keep_leading_zeros().format_fixed_point(7, layout).as_str(),
            " 000007"
        );
    }
}
