// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::plus;
use crate::error::CostingError;
use crate::models::{LineItem, LineItemSource, MaterialType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBucket {
    pub items: Vec<LineItem>,
    pub total_amount: Decimal,
}

impl ItemBucket {
    fn push(&mut self, item: &LineItem) -> Result<(), CostingError> {
        self.total_amount = plus(self.total_amount, item.own_total()?)?;
        self.items.push(item.clone());
        Ok(())
    }
}

/// Line items partitioned by material type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupedItems {
    #[serde(rename = "HIGH SIDE SUPPLY")]
    pub high_side_supply: ItemBucket,
    #[serde(rename = "LOW SIDE SUPPLY")]
    pub low_side_supply: ItemBucket,
    #[serde(rename = "INSTALLATION")]
    pub installation: ItemBucket,
}

impl GroupedItems {
    pub fn bucket(&self, material: MaterialType) -> &ItemBucket {
        match material {
            MaterialType::HighSideSupply => &self.high_side_supply,
            MaterialType::LowSideSupply => &self.low_side_supply,
            MaterialType::Installation => &self.installation,
        }
    }

    fn bucket_mut(&mut self, material: MaterialType) -> &mut ItemBucket {
        match material {
            MaterialType::HighSideSupply => &mut self.high_side_supply,
            MaterialType::LowSideSupply => &mut self.low_side_supply,
            MaterialType::Installation => &mut self.installation,
        }
    }
}

pub fn group_by_material(source: &LineItemSource) -> Result<GroupedItems, CostingError> {
    let mut grouped = GroupedItems::default();
    for item in source.items() {
        grouped.bucket_mut(item.material()).push(item)?;
    }
    Ok(grouped)
}
