// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::CostingError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Material category used to bucket line items for GST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum MaterialType {
    #[serde(rename = "HIGH SIDE SUPPLY")]
    HighSideSupply,
    #[serde(rename = "LOW SIDE SUPPLY")]
    LowSideSupply,
    #[default]
    #[serde(rename = "INSTALLATION")]
    Installation,
}

impl MaterialType {
    pub const ALL: [MaterialType; 3] = [
        MaterialType::HighSideSupply,
        MaterialType::LowSideSupply,
        MaterialType::Installation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialType::HighSideSupply => "HIGH SIDE SUPPLY",
            MaterialType::LowSideSupply => "LOW SIDE SUPPLY",
            MaterialType::Installation => "INSTALLATION",
        }
    }
}

impl std::fmt::Display for MaterialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MaterialType {
    type Err = CostingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s
            .trim()
            .to_uppercase()
            .replace(['-', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        match norm.as_str() {
            "HIGH SIDE SUPPLY" | "HIGH SIDE" => Ok(MaterialType::HighSideSupply),
            "LOW SIDE SUPPLY" | "LOW SIDE" => Ok(MaterialType::LowSideSupply),
            "INSTALLATION" => Ok(MaterialType::Installation),
            _ => Err(CostingError::UnknownMaterialType(s.trim().to_string())),
        }
    }
}

/// One costed row of a quotation. Own amounts are extended costs computed
/// upstream; a missing amount counts as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: Decimal,
    #[serde(default)]
    pub supply_rate: Option<Decimal>,
    #[serde(default)]
    pub installation_rate: Option<Decimal>,
    #[serde(default)]
    pub supply_own_amount: Option<Decimal>,
    #[serde(default)]
    pub installation_own_amount: Option<Decimal>,
    #[serde(default)]
    pub material_type: Option<MaterialType>,
}

impl LineItem {
    pub fn supply_own(&self) -> Decimal {
        self.supply_own_amount.unwrap_or(Decimal::ZERO)
    }

    pub fn installation_own(&self) -> Decimal {
        self.installation_own_amount.unwrap_or(Decimal::ZERO)
    }

    pub fn own_total(&self) -> Result<Decimal, CostingError> {
        self.supply_own()
            .checked_add(self.installation_own())
            .ok_or(CostingError::AmountOverflow)
    }

    pub fn material(&self) -> MaterialType {
        self.material_type.unwrap_or_default()
    }

    pub fn check_quantity(&self) -> Result<(), CostingError> {
        if self.quantity.is_sign_negative() && !self.quantity.is_zero() {
            return Err(CostingError::NegativeQuantity(self.quantity));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

/// Where the engine reads line items from. Specifications win over a flat
/// list whenever at least one exists.
#[derive(Debug, Clone, PartialEq)]
pub enum LineItemSource {
    Specs(Vec<Specification>),
    Flat(Vec<LineItem>),
}

impl Default for LineItemSource {
    fn default() -> Self {
        LineItemSource::Flat(Vec::new())
    }
}

impl LineItemSource {
    pub fn from_parts(specs: Vec<Specification>, flat: Vec<LineItem>) -> Self {
        if specs.is_empty() {
            LineItemSource::Flat(flat)
        } else {
            LineItemSource::Specs(specs)
        }
    }

    /// Items in canonical order: specifications in order, then their items.
    pub fn items(&self) -> Box<dyn Iterator<Item = &LineItem> + '_> {
        match self {
            LineItemSource::Specs(specs) => Box::new(specs.iter().flat_map(|s| s.items.iter())),
            LineItemSource::Flat(items) => Box::new(items.iter()),
        }
    }

    pub fn item_count(&self) -> usize {
        self.items().count()
    }
}

/// Body of an upstream quotation payload: `{"specs": [...]}` or `{"items": [...]}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamPayload {
    #[serde(default)]
    pub specs: Vec<Specification>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl UpstreamPayload {
    pub fn into_source(self) -> LineItemSource {
        LineItemSource::from_parts(self.specs, self.items)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quotation {
    pub id: i64,
    pub name: String,
    pub client: Option<String>,
    pub overheads_cost: Decimal,
    pub created_at: String,
}
