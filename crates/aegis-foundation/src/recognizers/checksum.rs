//! Checksum and structural validation for numeric identifiers

/// Luhn check over the ASCII digits of `number`; separators are ignored.
///
/// Only 13 to 19 digit numbers are considered payment cards.
#[inline]
pub fn luhn_valid(number: &str) -> bool {
    let digits: Vec<u32> = number.chars().filter_map(|c| c.to_digit(10)).collect();

    if !(13..=19).contains(&digits.len()) {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

/// US SSN structure: nine digits, area not 000, 666 or 9xx, group not 00,
/// serial not 0000.
#[inline]
pub fn ssn_valid(ssn: &str) -> bool {
    let digits: String = ssn.chars().filter(char::is_ascii_digit).collect();

    if digits.len() != 9 {
        return false;
    }

    let area = &digits[0..3];
    let group = &digits[3..5];
    let serial = &digits[5..9];

    if area == "000" || area == "666" || area.starts_with('9') {
        return false;
    }

    group != "00" && serial != "0000"
}

/// E.164 length: a `+`-prefixed number carries 8 to 15 digits.
#[inline]
pub fn e164_valid(number: &str) -> bool {
    let digits = number.chars().filter(char::is_ascii_digit).count();
    (8..=15).contains(&digits)
}
