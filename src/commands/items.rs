// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::quotes::{ITEM_HEADERS, item_rows};
use crate::costing::{Action, apply};
use crate::db::{insert_item, load_draft, load_source};
use crate::models::{LineItem, LineItemSource, MaterialType};
use crate::utils::{
    id_for_quotation, id_for_spec, maybe_print_json, parse_decimal, pretty_table,
};
use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("classify", sub)) => classify(conn, sub)?,
        Some(("rm", sub)) => {
            let quote = sub.get_one::<String>("quote").unwrap().trim();
            let id = *sub.get_one::<i64>("id").unwrap();
            let qid = id_for_quotation(conn, quote)?;
            let n = conn.execute(
                "DELETE FROM line_items WHERE id=?1 AND quotation_id=?2",
                params![id, qid],
            )?;
            if n == 0 {
                return Err(anyhow!("Item #{} not found in '{}'", id, quote));
            }
            println!("Removed item #{}", id);
        }
        _ => {}
    }
    Ok(())
}

/// Build a line item from raw text fields. Quantity must not be negative.
pub fn line_item_from_fields(
    description: &str,
    quantity: &str,
    supply_rate: Option<&str>,
    installation_rate: Option<&str>,
    supply_own: Option<&str>,
    installation_own: Option<&str>,
    material: Option<&str>,
) -> Result<LineItem> {
    let opt = |raw: Option<&str>| -> Result<Option<Decimal>> {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_decimal)
            .transpose()
    };
    let quantity = if quantity.trim().is_empty() {
        Decimal::ZERO
    } else {
        parse_decimal(quantity)?
    };
    let material_type = material
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<MaterialType>())
        .transpose()?;
    let item = LineItem {
        id: None,
        description: description.trim().to_string(),
        quantity,
        supply_rate: opt(supply_rate)?,
        installation_rate: opt(installation_rate)?,
        supply_own_amount: opt(supply_own)?,
        installation_own_amount: opt(installation_own)?,
        material_type,
    };
    item.check_quantity()?;
    Ok(item)
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let quote = sub.get_one::<String>("quote").unwrap().trim();
    let qid = id_for_quotation(conn, quote)?;
    let spec_id = match sub.get_one::<String>("spec").map(|s| s.trim()) {
        Some(s) if !s.is_empty() => Some(id_for_spec(conn, qid, s)?),
        _ => None,
    };
    let arg = |k: &str| sub.get_one::<String>(k).map(|s| s.as_str());
    let item = line_item_from_fields(
        arg("description").unwrap_or_default(),
        arg("quantity").unwrap_or("1"),
        arg("supply-rate"),
        arg("install-rate"),
        arg("supply-own"),
        arg("install-own"),
        arg("type"),
    )?;
    ensure_costable(conn, qid, spec_id, &item)?;
    let id = insert_item(conn, qid, spec_id, &item)?;
    tracing::info!(quotation = quote, item = id, "line item added");
    println!(
        "Added item #{} '{}' ({}, own {:.2})",
        id,
        item.description,
        item.material(),
        item.own_total()?
    );
    Ok(())
}

// Refuse an item whose amounts would push the quotation past what can be costed.
fn ensure_costable(
    conn: &Connection,
    quotation_id: i64,
    spec_id: Option<i64>,
    item: &LineItem,
) -> Result<()> {
    let draft = load_draft(conn, quotation_id)?;
    let mut source = draft.source.clone();
    match (&mut source, spec_id) {
        (LineItemSource::Specs(specs), Some(sid)) => {
            if let Some(spec) = specs.iter_mut().find(|s| s.id == Some(sid)) {
                spec.items.push(item.clone());
            }
        }
        (LineItemSource::Flat(items), None) => items.push(item.clone()),
        _ => {}
    }
    apply(&draft, Action::ReplaceItems(source))
        .into_result()
        .with_context(|| format!("Item '{}' not added", item.description))?;
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let quote = sub.get_one::<String>("quote").unwrap().trim();
    let qid = id_for_quotation(conn, quote)?;
    let source = load_source(conn, qid)?;
    let rows = match &source {
        LineItemSource::Specs(specs) => specs
            .iter()
            .flat_map(|s| item_rows(&s.name, &s.items))
            .collect::<Vec<_>>(),
        LineItemSource::Flat(items) => item_rows("", items),
    };
    let items: Vec<&LineItem> = source.items().collect();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
        println!("{}", pretty_table(&ITEM_HEADERS, rows));
    }
    Ok(())
}

fn classify(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let quote = sub.get_one::<String>("quote").unwrap().trim();
    let id = *sub.get_one::<i64>("id").unwrap();
    let material = sub.get_one::<String>("type").unwrap().parse::<MaterialType>()?;
    let qid = id_for_quotation(conn, quote)?;
    let n = conn.execute(
        "UPDATE line_items SET material_type=?1 WHERE id=?2 AND quotation_id=?3",
        params![material.as_str(), id, qid],
    )?;
    if n == 0 {
        return Err(anyhow!("Item #{} not found in '{}'", id, quote));
    }
    println!("Item #{} classified as {}", id, material);
    Ok(())
}

