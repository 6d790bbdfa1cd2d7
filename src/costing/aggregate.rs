// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::plus;
use crate::error::CostingError;
use crate::models::LineItemSource;
use rust_decimal::Decimal;
use serde::Serialize;

/// Raw own-cost totals split by cost type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnCostTotals {
    pub own_supply: Decimal,
    pub own_labour: Decimal,
    pub total_own: Decimal,
}

pub fn aggregate(source: &LineItemSource) -> Result<OwnCostTotals, CostingError> {
    let mut own_supply = Decimal::ZERO;
    let mut own_labour = Decimal::ZERO;
    for item in source.items() {
        own_supply = plus(own_supply, item.supply_own())?;
        own_labour = plus(own_labour, item.installation_own())?;
    }
    Ok(OwnCostTotals {
        own_supply,
        own_labour,
        total_own: plus(own_supply, own_labour)?,
    })
}
