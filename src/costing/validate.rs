// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{CostingError, InputRejection};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

static DECIMAL_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(\d+\.?\d*|\.\d+)$").expect("decimal literal pattern"));

const MAX_MARGIN_PERCENTAGE: u32 = 100;
const MAX_DECIMAL_PLACES: u32 = 2;

/// Outcome of an accepted percentage edit. An empty field is a valid
/// in-between state that counts as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentInput {
    Pending,
    Value(Decimal),
}

impl PercentInput {
    pub fn value(&self) -> Decimal {
        match self {
            PercentInput::Pending => Decimal::ZERO,
            PercentInput::Value(v) => *v,
        }
    }
}

fn check_percentage(raw: &str, max: Option<u32>) -> Result<PercentInput, InputRejection> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(PercentInput::Pending);
    }
    if !DECIMAL_LITERAL.is_match(s) {
        return Err(InputRejection::NotANumber);
    }
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s),
    };
    let digits = digits.strip_suffix('.').unwrap_or(digits);
    let normalized = if digits.starts_with('.') {
        format!("{sign}0{digits}")
    } else {
        format!("{sign}{digits}")
    };
    let value = normalized
        .parse::<Decimal>()
        .map_err(|_| InputRejection::NotANumber)?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(InputRejection::Negative);
    }
    if let Some(frac) = s.split_once('.').map(|(_, f)| f) {
        if frac.len() as u32 > MAX_DECIMAL_PLACES {
            return Err(InputRejection::TooManyDecimals);
        }
    }
    if let Some(max) = max {
        if value > Decimal::from(max) {
            return Err(InputRejection::AboveMaximum(max));
        }
    }
    Ok(PercentInput::Value(value.abs()))
}

/// Margin: 0 to 100 inclusive, at most two decimal places.
pub fn parse_margin_percentage(raw: &str) -> Result<PercentInput, CostingError> {
    check_percentage(raw, Some(MAX_MARGIN_PERCENTAGE)).map_err(|reason| {
        CostingError::InvalidMarginValue {
            input: raw.to_string(),
            reason,
        }
    })
}

/// GST: non-negative with at most two decimal places, no upper bound.
pub fn parse_gst_percentage(raw: &str) -> Result<PercentInput, CostingError> {
    check_percentage(raw, None).map_err(|reason| CostingError::InvalidGstValue {
        input: raw.to_string(),
        reason,
    })
}
