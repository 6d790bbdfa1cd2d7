// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::aggregate::OwnCostTotals;
use super::{percent_of, ratio, times};
use crate::error::CostingError;
use rust_decimal::Decimal;

/// Overhead amount assigned to one category and what it is as a % of own cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverheadShare {
    pub amount: Decimal,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverheadAllocation {
    pub supply: OverheadShare,
    pub labour: OverheadShare,
    /// The whole pool, measured against combined own cost.
    pub sitc: OverheadShare,
}

/// Split the overhead pool between supply and labour by their share of
/// combined own cost. With no own cost at all nothing is allocated.
pub fn allocate(
    totals: &OwnCostTotals,
    total_overheads_cost: Decimal,
) -> Result<OverheadAllocation, CostingError> {
    if totals.total_own.is_zero() {
        return Ok(OverheadAllocation::default());
    }
    let share = |own: Decimal| -> Result<OverheadShare, CostingError> {
        let amount = times(ratio(own, totals.total_own), total_overheads_cost)?;
        Ok(OverheadShare {
            amount,
            percentage: percent_of(amount, own),
        })
    };
    Ok(OverheadAllocation {
        supply: share(totals.own_supply)?,
        labour: share(totals.own_labour)?,
        sitc: OverheadShare {
            amount: total_overheads_cost,
            percentage: percent_of(total_overheads_cost, totals.total_own),
        },
    })
}
