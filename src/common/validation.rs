// src/common/validation.rs

use rust_decimal::Decimal;
use validator::ValidationError;

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Só os dígitos, descartando a máscara ("529.982.247-25" -> "52998224725").
pub fn only_digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// CPF com máscara ou sem, conferindo os dois dígitos verificadores.
pub fn validate_cpf(value: &str) -> Result<(), ValidationError> {
    let digits: Vec<u32> = only_digits(value)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();

    if digits.len() != 11 {
        return Err(error("invalid_cpf", "O CPF deve ter 11 dígitos."));
    }
    // 000.000.000-00, 111.111.111-11... passam na conta mas não são válidos
    if digits.iter().all(|d| *d == digits[0]) {
        return Err(error("invalid_cpf", "CPF inválido."));
    }

    let check_digit = |len: usize| -> u32 {
        let sum: u32 = digits[..len]
            .iter()
            .zip((2..=(len as u32 + 1)).rev())
            .map(|(d, w)| d * w)
            .sum();
        match (sum * 10) % 11 {
            10 => 0,
            r => r,
        }
    };

    if check_digit(9) != digits[9] || check_digit(10) != digits[10] {
        return Err(error("invalid_cpf", "CPF inválido."));
    }
    Ok(())
}

pub fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(error("must_be_positive", "O valor deve ser maior que zero."));
    }
    Ok(())
}
