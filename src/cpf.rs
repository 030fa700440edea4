//! CPF (Cadastro de Pessoas Físicas) validation.
//!
//! A CPF is an 11 digit identifier whose last two digits are checksums over the
//! preceding ones.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Length of a CPF without punctuation.
pub const CPF_LENGTH: usize = 11;

/// Well-formed strings that pass the checksum but are never issued.
const BLACKLIST: [&str; 11] = [
    "00000000000",
    "11111111111",
    "22222222222",
    "33333333333",
    "44444444444",
    "55555555555",
    "66666666666",
    "77777777777",
    "88888888888",
    "99999999999",
    "12345678909",
];

lazy_static! {
    static ref DIGITS_REGEX: Regex = Regex::new(r"^[0-9]{11}$").unwrap();
}

/// Returns `true` when `cpf` is 11 digits, not blacklisted, and both check digits match.
pub fn is_valid_cpf(cpf: &str) -> bool {
    if cpf.is_empty() || cpf.len() != CPF_LENGTH || !DIGITS_REGEX.is_match(cpf) {
        return false;
    }
    if BLACKLIST.contains(&cpf) {
        return false;
    }

    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// Weighted sum over `digits` with weights counting down to 2, folded mod 11.
fn check_digit(digits: &[u32]) -> u32 {
    let top_weight = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top_weight - i as u32))
        .sum();

    let rest = (sum * 10) % 11;
    if rest > 9 {
        0
    } else {
        rest
    }
}

/// Field validator for `validator` derives.
///
/// Distinguishes an empty value (`required`), a wrong length (`length`) and a
/// checksum failure (`cpf`) so the boundary can pick the matching message.
pub fn validate_cpf(cpf: &str) -> Result<(), ValidationError> {
    if cpf.is_empty() {
        return Err(ValidationError::new("required"));
    }
    if cpf.chars().count() != CPF_LENGTH {
        return Err(ValidationError::new("length"));
    }
    if !is_valid_cpf(cpf) {
        let mut error = ValidationError::new("cpf");
        error.add_param("value".into(), &cpf);
        return Err(error);
    }
    Ok(())
}
