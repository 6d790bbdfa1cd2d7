// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::aggregate::OwnCostTotals;
use super::overheads::{OverheadAllocation, OverheadShare};
use super::{percent_of, plus, ratio, times};
use crate::error::CostingError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostCategory {
    Supply,
    Labour,
    Sitc,
}

impl CostCategory {
    pub fn label(&self) -> &'static str {
        match self {
            CostCategory::Supply => "Supply",
            CostCategory::Labour => "Labour",
            CostCategory::Sitc => "SITC",
        }
    }
}

impl std::str::FromStr for CostCategory {
    type Err = CostingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "supply" => Ok(CostCategory::Supply),
            "labour" | "labor" => Ok(CostCategory::Labour),
            "sitc" | "overall" => Ok(CostCategory::Sitc),
            other => Err(CostingError::UnknownCategory(other.to_string())),
        }
    }
}

/// User-entered margin percentages. SITC has none of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginRates {
    pub supply: Decimal,
    pub labour: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub own_amount: Decimal,
    pub overheads_percentage: Decimal,
    pub overheads_amount: Decimal,
    pub margin_percentage: Decimal,
    pub sub_total: Decimal,
    pub margin_amount: Decimal,
    pub selling_amount: Decimal,
    pub mf: Decimal,
}

impl CategorySummary {
    pub fn compute(
        own_amount: Decimal,
        overheads: OverheadShare,
        margin_percentage: Decimal,
    ) -> Result<Self, CostingError> {
        let sub_total = plus(own_amount, overheads.amount)?;
        let margin_amount = times(sub_total, margin_percentage)? / Decimal::ONE_HUNDRED;
        let selling_amount = plus(sub_total, margin_amount)?;
        Ok(Self {
            own_amount,
            overheads_percentage: overheads.percentage,
            overheads_amount: overheads.amount,
            margin_percentage,
            sub_total,
            margin_amount,
            selling_amount,
            mf: ratio(selling_amount, own_amount),
        })
    }

    /// Overall summary. The margin is the sum of the supply and labour
    /// margins, never the overall subtotal times a percentage.
    pub fn overall(
        totals: &OwnCostTotals,
        overheads: OverheadShare,
        supply: &CategorySummary,
        labour: &CategorySummary,
    ) -> Result<Self, CostingError> {
        let sub_total = plus(totals.total_own, overheads.amount)?;
        let margin_amount = plus(supply.margin_amount, labour.margin_amount)?;
        let selling_amount = plus(sub_total, margin_amount)?;
        Ok(Self {
            own_amount: totals.total_own,
            overheads_percentage: overheads.percentage,
            overheads_amount: overheads.amount,
            margin_percentage: percent_of(margin_amount, sub_total),
            sub_total,
            margin_amount,
            selling_amount,
            mf: ratio(selling_amount, totals.total_own),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarginSummaries {
    pub supply: CategorySummary,
    pub labour: CategorySummary,
    pub sitc: CategorySummary,
}

pub fn summarize(
    totals: &OwnCostTotals,
    overheads: &OverheadAllocation,
    margins: &MarginRates,
) -> Result<MarginSummaries, CostingError> {
    let supply = CategorySummary::compute(totals.own_supply, overheads.supply, margins.supply)?;
    let labour = CategorySummary::compute(totals.own_labour, overheads.labour, margins.labour)?;
    let sitc = CategorySummary::overall(totals, overheads.sitc, &supply, &labour)?;
    Ok(MarginSummaries {
        supply,
        labour,
        sitc,
    })
}
