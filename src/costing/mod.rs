// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Quotation costing: own-cost aggregation, overhead allocation, margins,
//! material grouping and GST rollup. Everything here is pure; callers feed a
//! [`QuotationDraft`] in and get a full [`CostingSnapshot`] back.

pub mod aggregate;
pub mod grouping;
pub mod gst;
pub mod margin;
pub mod overheads;
pub mod session;
pub mod validate;

pub use aggregate::{OwnCostTotals, aggregate};
pub use grouping::{GroupedItems, ItemBucket, group_by_material};
pub use gst::{DEFAULT_GST_PERCENTAGE, FinalCosting, GstRates, apply_gst};
pub use margin::{CategorySummary, CostCategory, MarginRates, MarginSummaries, summarize};
pub use overheads::{OverheadAllocation, OverheadShare, allocate};
pub use session::{Action, QuotationDraft, Transition, apply};
pub use validate::{PercentInput, parse_gst_percentage, parse_margin_percentage};

use crate::error::CostingError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostingSnapshot {
    pub supply_summary: CategorySummary,
    pub labour_summary: CategorySummary,
    pub sitc_summary: CategorySummary,
    pub gst_rates: GstRates,
    pub final_costing: FinalCosting,
}

impl CostingSnapshot {
    pub fn summary(&self, category: CostCategory) -> &CategorySummary {
        match category {
            CostCategory::Supply => &self.supply_summary,
            CostCategory::Labour => &self.labour_summary,
            CostCategory::Sitc => &self.sitc_summary,
        }
    }
}

/// Run the whole pipeline over one draft. Fails only when an amount no
/// longer fits in a `Decimal`.
pub fn recompute(draft: &QuotationDraft) -> Result<CostingSnapshot, CostingError> {
    let totals = aggregate(&draft.source)?;
    let overheads = allocate(&totals, draft.total_overheads_cost)?;
    let summaries = summarize(&totals, &overheads, &draft.margins)?;
    let final_costing = apply_gst(group_by_material(&draft.source)?, &draft.gst_rates)?;
    tracing::debug!(
        items = draft.source.item_count(),
        total_own = %totals.total_own,
        selling = %summaries.sitc.selling_amount,
        total_with_gst = %final_costing.total_with_gst,
        "costing recomputed"
    );
    Ok(CostingSnapshot {
        supply_summary: summaries.supply,
        labour_summary: summaries.labour,
        sitc_summary: summaries.sitc,
        gst_rates: draft.gst_rates,
        final_costing,
    })
}

/// `numerator / denominator`, or zero when the division is undefined.
pub(crate) fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

/// `part` as a percentage of `whole`, or zero when the ratio is undefined.
pub(crate) fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    ratio(part, whole)
        .checked_mul(Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::ZERO)
}

pub(crate) fn plus(a: Decimal, b: Decimal) -> Result<Decimal, CostingError> {
    a.checked_add(b).ok_or(CostingError::AmountOverflow)
}

pub(crate) fn times(a: Decimal, b: Decimal) -> Result<Decimal, CostingError> {
    a.checked_mul(b).ok_or(CostingError::AmountOverflow)
}
