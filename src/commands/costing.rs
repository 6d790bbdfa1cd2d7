// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::costing::{Action, CategorySummary, CostCategory, CostingSnapshot, apply};
use crate::db::{load_draft, store_draft_inputs};
use crate::models::MaterialType;
use crate::utils::{get_currency, id_for_quotation, maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::Table;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("margin", sub)) => {
            let category = sub
                .get_one::<String>("category")
                .unwrap()
                .parse::<CostCategory>()?;
            let raw = sub.get_one::<String>("value").unwrap().clone();
            edit(conn, sub, Action::EditMargin { category, raw })?
        }
        Some(("gst", sub)) => {
            let bucket = sub
                .get_one::<String>("bucket")
                .unwrap()
                .parse::<MaterialType>()?;
            let raw = sub.get_one::<String>("value").unwrap().clone();
            edit(conn, sub, Action::EditGst { bucket, raw })?
        }
        Some(("save", sub)) => save(conn, sub)?,
        Some(("history", sub)) => history(conn, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn snapshot_for(conn: &Connection, quote: &str) -> Result<CostingSnapshot> {
    let qid = id_for_quotation(conn, quote)?;
    let snapshot = load_draft(conn, qid)?
        .snapshot()
        .with_context(|| format!("Cost quotation '{}'", quote))?;
    Ok(snapshot)
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let quote = sub.get_one::<String>("quote").unwrap().trim();
    let snapshot = snapshot_for(conn, quote)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &snapshot)? {
        print_snapshot(&snapshot, &get_currency(conn)?);
    }
    Ok(())
}

/// Apply one percentage edit. The summary is printed either way; a rejected
/// edit leaves the stored value alone and is returned as the error.
fn edit(conn: &Connection, sub: &clap::ArgMatches, action: Action) -> Result<()> {
    let quote = sub.get_one::<String>("quote").unwrap().trim();
    let qid = id_for_quotation(conn, quote)?;
    let draft = load_draft(conn, qid)?;
    let transition = apply(&draft, action);
    let snapshot = transition
        .draft
        .snapshot()
        .with_context(|| format!("Cost quotation '{}'", quote))?;
    if transition.error.is_none() {
        store_draft_inputs(conn, qid, &transition.draft)?;
        tracing::info!(quotation = quote, "costing inputs updated");
    }
    print_snapshot(&snapshot, &get_currency(conn)?);
    match transition.error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn money(d: Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

pub fn summary_table(snapshot: &CostingSnapshot) -> Table {
    let (sup, lab, sitc) = (
        snapshot.summary(CostCategory::Supply),
        snapshot.summary(CostCategory::Labour),
        snapshot.summary(CostCategory::Sitc),
    );
    let line = |label: &str, f: fn(&CategorySummary) -> Decimal| {
        vec![label.to_string(), money(f(sup)), money(f(lab)), money(f(sitc))]
    };
    let rows = vec![
        line("Own Amount", |s| s.own_amount),
        line("Overheads %", |s| s.overheads_percentage),
        line("Overheads Amount", |s| s.overheads_amount),
        line("Sub Total", |s| s.sub_total),
        // SITC margin % is derived, shown in brackets
        vec![
            "Margin %".to_string(),
            money(sup.margin_percentage),
            money(lab.margin_percentage),
            format!("({})", money(sitc.margin_percentage)),
        ],
        line("Margin Amount", |s| s.margin_amount),
        line("Selling Amount", |s| s.selling_amount),
        vec![
            "MF".to_string(),
            format!("{:.4}", sup.mf.round_dp(4)),
            format!("{:.4}", lab.mf.round_dp(4)),
            format!("{:.4}", sitc.mf.round_dp(4)),
        ],
    ];
    let headers = [
        "",
        CostCategory::Supply.label(),
        CostCategory::Labour.label(),
        CostCategory::Sitc.label(),
    ];
    pretty_table(&headers, rows)
}

pub fn gst_table(snapshot: &CostingSnapshot) -> Table {
    let fc = &snapshot.final_costing;
    let mut rows: Vec<Vec<String>> = MaterialType::ALL
        .iter()
        .map(|m| {
            vec![
                m.to_string(),
                fc.grouped_items.bucket(*m).items.len().to_string(),
                money(fc.amount_for(*m)),
                money(snapshot.gst_rates.rate_for(*m)),
                money(fc.with_gst_for(*m)),
            ]
        })
        .collect();
    rows.push(vec![
        "TOTAL".into(),
        String::new(),
        money(fc.total_without_gst),
        money(fc.total_gst_amount),
        money(fc.total_with_gst),
    ]);
    pretty_table(
        &["Bucket", "Items", "Amount", "GST % / GST", "With GST"],
        rows,
    )
}

pub fn print_snapshot(snapshot: &CostingSnapshot, ccy: &str) {
    println!("Costing summary ({})", ccy);
    println!("{}", summary_table(snapshot));
    println!("GST breakdown ({})", ccy);
    println!("{}", gst_table(snapshot));
}

fn save(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let quote = sub.get_one::<String>("quote").unwrap().trim();
    let qid = id_for_quotation(conn, quote)?;
    let snapshot = snapshot_for(conn, quote)?;
    let payload = serde_json::to_string(&snapshot)?;
    let saved_at = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO costings(quotation_id, saved_at, payload) VALUES (?1, ?2, ?3)",
        params![qid, saved_at, payload],
    )?;
    tracing::info!(quotation = quote, total_with_gst = %snapshot.final_costing.total_with_gst, "costing saved");
    println!(
        "Saved costing for '{}' (total with GST {})",
        quote,
        money(snapshot.final_costing.total_with_gst)
    );
    Ok(())
}

fn history(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let quote = sub.get_one::<String>("quote").unwrap().trim();
    let qid = id_for_quotation(conn, quote)?;
    let mut stmt = conn.prepare(
        "SELECT id, saved_at, payload FROM costings WHERE quotation_id=?1 ORDER BY id DESC",
    )?;
    let rows = stmt.query_map(params![qid], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (id, saved_at, payload) = row?;
        let snap: CostingSnapshot = serde_json::from_str(&payload)
            .with_context(|| format!("Invalid saved costing #{}", id))?;
        data.push(vec![
            id.to_string(),
            saved_at,
            money(snap.sitc_summary.selling_amount),
            money(snap.final_costing.total_without_gst),
            money(snap.final_costing.total_with_gst),
        ]);
    }
    println!(
        "{}",
        pretty_table(
            &["#", "Saved", "Selling (SITC)", "Without GST", "With GST"],
            data
        )
    );
    Ok(())
}
