//! Parsing and printing whole-yen amounts.

use anyhow::{Context, Result, bail};
use kakei_core::{YearMonth, Yen, parse_year_month};

const MAN: Yen = 10_000;

/// Largest magnitude accepted from input. Keeps a 72-month running sum far
/// away from `i64` overflow.
pub const MAX_YEN: Yen = 1_000_000_000_000_000;

/// Accepts `300000`, `300,000`, `¥300,000`, `30万` and `-50000`.
pub fn parse_yen(input: &str) -> Result<Yen> {
    let trimmed = input.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let rest = rest.trim_start_matches(['¥', '￥']).trim();
    let (digits, scale) = match rest.strip_suffix('万') {
        Some(d) => (d.trim(), MAN),
        None => (rest.strip_suffix('円').unwrap_or(rest).trim(), 1),
    };
    let cleaned: String = digits.chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        bail!("empty amount: {input:?}");
    }
    let value: Yen = cleaned
        .parse()
        .with_context(|| format!("invalid amount: {input:?}"))?;
    let value = value
        .checked_mul(scale)
        .with_context(|| format!("amount out of range: {input:?}"))?;
    if value > MAX_YEN {
        bail!("amount too large: {input:?} (max {})", format_yen(MAX_YEN));
    }
    Ok(if negative { -value } else { value })
}

/// `parse_yen` that also rejects negative values.
pub fn parse_non_negative_yen(input: &str) -> Result<Yen> {
    let value = parse_yen(input)?;
    if value < 0 {
        bail!("amount must not be negative: {input:?}");
    }
    Ok(value)
}

/// `parse_yen` that also rejects zero and negative values.
pub fn parse_positive_yen(input: &str) -> Result<Yen> {
    let value = parse_yen(input)?;
    if value <= 0 {
        bail!("amount must be greater than zero: {input:?}");
    }
    Ok(value)
}

pub fn format_yen(value: Yen) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-¥{grouped}")
    } else {
        format!("¥{grouped}")
    }
}

// clap value parsers

pub fn yen_arg(s: &str) -> std::result::Result<Yen, String> {
    parse_yen(s).map_err(|e| e.to_string())
}

pub fn non_negative_yen_arg(s: &str) -> std::result::Result<Yen, String> {
    parse_non_negative_yen(s).map_err(|e| e.to_string())
}

pub fn positive_yen_arg(s: &str) -> std::result::Result<Yen, String> {
    parse_positive_yen(s).map_err(|e| e.to_string())
}

/// Trimmed, non-blank label.
pub fn label_arg(s: &str) -> std::result::Result<String, String> {
    let label = s.trim();
    if label.is_empty() {
        return Err("label must not be empty".to_string());
    }
    Ok(label.to_string())
}

pub fn month_arg(s: &str) -> std::result::Result<YearMonth, String> {
    parse_year_month(s).map_err(|e| e.to_string())
}
