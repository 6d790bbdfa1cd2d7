// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use costsheet::costing::{Action, CostCategory, QuotationDraft, apply};
use costsheet::error::CostingError;
use costsheet::models::{LineItem, LineItemSource, MaterialType};
use rust_decimal::Decimal;

fn draft() -> QuotationDraft {
    let items = vec![
        LineItem {
            supply_own_amount: Some(Decimal::from(8000)),
            material_type: Some(MaterialType::HighSideSupply),
            ..LineItem::default()
        },
        LineItem {
            installation_own_amount: Some(Decimal::from(2000)),
            ..LineItem::default()
        },
    ];
    QuotationDraft::new(LineItemSource::Flat(items), Decimal::from(1000))
}

fn margin(category: CostCategory, raw: &str) -> Action {
    Action::EditMargin {
        category,
        raw: raw.to_string(),
    }
}

#[test]
fn new_draft_starts_with_zero_margins_and_default_gst() {
    let d = draft();
    let snap = d.snapshot().unwrap();
    assert!(snap.supply_summary.margin_percentage.is_zero());
    assert!(snap.labour_summary.margin_percentage.is_zero());
    assert!(snap.sitc_summary.margin_amount.is_zero());
    assert_eq!(snap.gst_rates.installation, Decimal::from(18));
    assert_eq!(snap.supply_summary.selling_amount, Decimal::from(8800));
}

#[test]
fn valid_margin_edit_produces_new_draft() {
    let before = draft();
    let t = apply(&before, margin(CostCategory::Supply, "10"));
    assert!(t.error.is_none());
    assert_eq!(t.draft.margins.supply, Decimal::from(10));
    assert!(t.draft.margins.labour.is_zero());
    // input draft untouched
    assert!(before.margins.supply.is_zero());
    assert_eq!(
        t.draft.snapshot().unwrap().supply_summary.margin_amount,
        Decimal::from(880)
    );
}

#[test]
fn rejected_margin_keeps_last_valid_value() {
    let base = apply(&draft(), margin(CostCategory::Labour, "20"))
        .into_result()
        .unwrap();
    for raw in ["100.01", "-1", "50.123", "x"] {
        let t = apply(&base, margin(CostCategory::Labour, raw));
        assert!(
            matches!(t.error, Some(CostingError::InvalidMarginValue { .. })),
            "input {raw}"
        );
        assert_eq!(t.draft, base);
        assert_eq!(
            t.draft.snapshot().unwrap().labour_summary.margin_amount,
            Decimal::from(440)
        );
    }
}

#[test]
fn empty_margin_clears_to_zero() {
    let base = apply(&draft(), margin(CostCategory::Supply, "15"))
        .into_result()
        .unwrap();
    let cleared = apply(&base, margin(CostCategory::Supply, ""))
        .into_result()
        .unwrap();
    assert!(cleared.margins.supply.is_zero());
}

#[test]
fn sitc_margin_is_read_only() {
    let base = draft();
    let t = apply(&base, margin(CostCategory::Sitc, "10"));
    assert_eq!(t.error, Some(CostingError::SitcMarginReadOnly));
    assert_eq!(t.draft, base);
}

#[test]
fn gst_edit_touches_only_its_bucket() {
    let t = apply(
        &draft(),
        Action::EditGst {
            bucket: MaterialType::HighSideSupply,
            raw: "28".into(),
        },
    );
    let next = t.into_result().unwrap();
    assert_eq!(next.gst_rates.high_side_supply, Decimal::from(28));
    assert_eq!(next.gst_rates.low_side_supply, Decimal::from(18));
    assert_eq!(next.gst_rates.installation, Decimal::from(18));
    let fc = next.snapshot().unwrap().final_costing;
    assert_eq!(fc.high_side_with_gst, Decimal::from(10240));
    assert_eq!(fc.installation_with_gst, Decimal::from(2360));
}

#[test]
fn replacing_items_and_overheads_recomputes_everything() {
    let base = apply(&draft(), margin(CostCategory::Supply, "10"))
        .into_result()
        .unwrap();
    let swapped = apply(
        &base,
        Action::ReplaceItems(LineItemSource::Flat(vec![LineItem {
            supply_own_amount: Some(Decimal::from(500)),
            ..LineItem::default()
        }])),
    )
    .into_result()
    .unwrap();
    let swapped = apply(&swapped, Action::SetOverheadsCost(Decimal::from(100)))
        .into_result()
        .unwrap();
    let snap = swapped.snapshot().unwrap();
    assert_eq!(snap.supply_summary.overheads_amount, Decimal::from(100));
    assert_eq!(snap.supply_summary.selling_amount, Decimal::from(660));
    assert_eq!(snap.sitc_summary.margin_amount, Decimal::from(60));
    // margin input survives the item swap
    assert_eq!(swapped.margins.supply, Decimal::from(10));
}

#[test]
fn gst_edit_that_cannot_be_costed_is_rejected() {
    let base = draft();
    let t = apply(
        &base,
        Action::EditGst {
            bucket: MaterialType::HighSideSupply,
            raw: "79228162514264337593543950335".to_string(),
        },
    );
    assert_eq!(t.error, Some(CostingError::AmountOverflow));
    assert_eq!(t.draft, base);
    assert!(t.draft.snapshot().is_ok());
}

#[test]
fn replacing_items_with_oversized_amounts_is_rejected() {
    let base = draft();
    let huge = LineItem {
        supply_own_amount: Some(Decimal::MAX),
        ..LineItem::default()
    };
    let t = apply(
        &base,
        Action::ReplaceItems(LineItemSource::Flat(vec![huge.clone(), huge])),
    );
    assert_eq!(t.error, Some(CostingError::AmountOverflow));
    assert_eq!(t.draft, base);
}
