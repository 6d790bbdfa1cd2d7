// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

/// Why a raw percentage string was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputRejection {
    #[error("not a number")]
    NotANumber,

    #[error("must not be negative")]
    Negative,

    #[error("must not exceed {0}")]
    AboveMaximum(u32),

    #[error("at most 2 decimal places are allowed")]
    TooManyDecimals,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CostingError {
    #[error("Invalid margin value '{input}': {reason}")]
    InvalidMarginValue {
        input: String,
        reason: InputRejection,
    },

    #[error("Invalid GST value '{input}': {reason}")]
    InvalidGstValue {
        input: String,
        reason: InputRejection,
    },

    #[error("SITC margin is derived from supply and labour margins and cannot be edited")]
    SitcMarginReadOnly,

    #[error(
        "Unknown material type '{0}' (use HIGH SIDE SUPPLY, LOW SIDE SUPPLY or INSTALLATION)"
    )]
    UnknownMaterialType(String),

    #[error("Unknown cost category '{0}' (use supply, labour or sitc)")]
    UnknownCategory(String),

    #[error("Quantity {0} is negative")]
    NegativeQuantity(Decimal),

    #[error("Amounts are too large to cost (decimal overflow)")]
    AmountOverflow,
}
