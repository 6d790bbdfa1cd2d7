// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::gst::GstRates;
use super::margin::{CostCategory, MarginRates};
use super::validate::{parse_gst_percentage, parse_margin_percentage};
use super::{CostingSnapshot, recompute};
use crate::error::CostingError;
use crate::models::{LineItemSource, MaterialType};
use rust_decimal::Decimal;

/// Everything the user or upstream steps have entered for one quotation.
/// Summaries are never stored here; they come from [`QuotationDraft::snapshot`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuotationDraft {
    pub source: LineItemSource,
    pub total_overheads_cost: Decimal,
    pub margins: MarginRates,
    pub gst_rates: GstRates,
}

impl QuotationDraft {
    pub fn new(source: LineItemSource, total_overheads_cost: Decimal) -> Self {
        Self {
            source,
            total_overheads_cost,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> Result<CostingSnapshot, CostingError> {
        recompute(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ReplaceItems(LineItemSource),
    SetOverheadsCost(Decimal),
    EditMargin { category: CostCategory, raw: String },
    EditGst { bucket: MaterialType, raw: String },
}

/// Result of applying one action. When `error` is set the draft is the
/// previous one, unchanged. An accepted draft always recomputes cleanly.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub draft: QuotationDraft,
    pub error: Option<CostingError>,
}

impl Transition {
    fn accepted(previous: &QuotationDraft, draft: QuotationDraft) -> Self {
        match recompute(&draft) {
            Ok(_) => Self { draft, error: None },
            Err(error) => Self::rejected(previous, error),
        }
    }

    fn rejected(previous: &QuotationDraft, error: CostingError) -> Self {
        tracing::warn!(%error, "input rejected, keeping last valid value");
        Self {
            draft: previous.clone(),
            error: Some(error),
        }
    }

    pub fn into_result(self) -> Result<QuotationDraft, CostingError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.draft),
        }
    }
}

pub fn apply(draft: &QuotationDraft, action: Action) -> Transition {
    let next = match action {
        Action::ReplaceItems(source) => QuotationDraft {
            source,
            ..draft.clone()
        },
        Action::SetOverheadsCost(total_overheads_cost) => QuotationDraft {
            total_overheads_cost,
            ..draft.clone()
        },
        Action::EditMargin { category, raw } => {
            let value = match parse_margin_percentage(&raw) {
                Ok(v) => v.value(),
                Err(e) => return Transition::rejected(draft, e),
            };
            let margins = match category {
                CostCategory::Supply => MarginRates {
                    supply: value,
                    ..draft.margins
                },
                CostCategory::Labour => MarginRates {
                    labour: value,
                    ..draft.margins
                },
                CostCategory::Sitc => {
                    return Transition::rejected(draft, CostingError::SitcMarginReadOnly);
                }
            };
            QuotationDraft {
                margins,
                ..draft.clone()
            }
        }
        Action::EditGst { bucket, raw } => match parse_gst_percentage(&raw) {
            Ok(v) => QuotationDraft {
                gst_rates: draft.gst_rates.with_rate(bucket, v.value()),
                ..draft.clone()
            },
            Err(e) => return Transition::rejected(draft, e),
        },
    };
    Transition::accepted(draft, next)
}
