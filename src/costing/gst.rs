// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::grouping::GroupedItems;
use super::{plus, times};
use crate::error::CostingError;
use crate::models::MaterialType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GST_PERCENTAGE: Decimal = Decimal::from_parts(18, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GstRates {
    pub high_side_supply: Decimal,
    pub low_side_supply: Decimal,
    pub installation: Decimal,
}

impl Default for GstRates {
    fn default() -> Self {
        Self::uniform(DEFAULT_GST_PERCENTAGE)
    }
}

impl GstRates {
    pub fn uniform(rate: Decimal) -> Self {
        Self {
            high_side_supply: rate,
            low_side_supply: rate,
            installation: rate,
        }
    }

    pub fn rate_for(&self, material: MaterialType) -> Decimal {
        match material {
            MaterialType::HighSideSupply => self.high_side_supply,
            MaterialType::LowSideSupply => self.low_side_supply,
            MaterialType::Installation => self.installation,
        }
    }

    pub fn with_rate(mut self, material: MaterialType, rate: Decimal) -> Self {
        match material {
            MaterialType::HighSideSupply => self.high_side_supply = rate,
            MaterialType::LowSideSupply => self.low_side_supply = rate,
            MaterialType::Installation => self.installation = rate,
        }
        self
    }
}

/// Final cost breakdown handed to whatever saves or prints the quotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalCosting {
    pub grouped_items: GroupedItems,
    pub high_side_amount: Decimal,
    pub low_side_amount: Decimal,
    pub installation_amount: Decimal,
    #[serde(rename = "highSideWithGST")]
    pub high_side_with_gst: Decimal,
    #[serde(rename = "lowSideWithGST")]
    pub low_side_with_gst: Decimal,
    #[serde(rename = "installationWithGST")]
    pub installation_with_gst: Decimal,
    #[serde(rename = "totalWithoutGST")]
    pub total_without_gst: Decimal,
    #[serde(rename = "totalWithGST")]
    pub total_with_gst: Decimal,
    #[serde(rename = "totalGSTAmount")]
    pub total_gst_amount: Decimal,
}

impl FinalCosting {
    pub fn amount_for(&self, material: MaterialType) -> Decimal {
        match material {
            MaterialType::HighSideSupply => self.high_side_amount,
            MaterialType::LowSideSupply => self.low_side_amount,
            MaterialType::Installation => self.installation_amount,
        }
    }

    pub fn with_gst_for(&self, material: MaterialType) -> Decimal {
        match material {
            MaterialType::HighSideSupply => self.high_side_with_gst,
            MaterialType::LowSideSupply => self.low_side_with_gst,
            MaterialType::Installation => self.installation_with_gst,
        }
    }
}

pub fn with_gst(amount: Decimal, gst_percentage: Decimal) -> Result<Decimal, CostingError> {
    let factor = plus(Decimal::ONE, gst_percentage / Decimal::ONE_HUNDRED)?;
    times(amount, factor)
}

pub fn apply_gst(grouped: GroupedItems, rates: &GstRates) -> Result<FinalCosting, CostingError> {
    let high_side_amount = grouped.high_side_supply.total_amount;
    let low_side_amount = grouped.low_side_supply.total_amount;
    let installation_amount = grouped.installation.total_amount;

    let high_side_with_gst = with_gst(high_side_amount, rates.high_side_supply)?;
    let low_side_with_gst = with_gst(low_side_amount, rates.low_side_supply)?;
    let installation_with_gst = with_gst(installation_amount, rates.installation)?;

    let total_without_gst = plus(plus(high_side_amount, low_side_amount)?, installation_amount)?;
    let total_with_gst = plus(plus(high_side_with_gst, low_side_with_gst)?, installation_with_gst)?;

    Ok(FinalCosting {
        grouped_items: grouped,
        high_side_amount,
        low_side_amount,
        installation_amount,
        high_side_with_gst,
        low_side_with_gst,
        installation_with_gst,
        total_without_gst,
        total_with_gst,
        total_gst_amount: total_with_gst - total_without_gst,
    })
}
