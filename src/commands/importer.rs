// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::items::line_item_from_fields;
use crate::costing::{Action, apply};
use crate::db::{insert_item, insert_specification, load_draft, replace_source};
use crate::models::UpstreamPayload;
use crate::utils::{http_client, id_for_quotation};
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::{HashMap, hash_map::Entry};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("items", sub)) => import_items(conn, sub),
        Some(("pull", sub)) => pull(conn, sub),
        _ => Ok(()),
    }
}

// Columns: spec, description, quantity, supply_rate, installation_rate,
// supply_own_amount, installation_own_amount, material_type
fn import_items(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let quote = sub.get_one::<String>("quote").unwrap().trim();
    let path = sub.get_one::<String>("path").unwrap().trim();
    let qid = id_for_quotation(conn, quote)?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let tx = conn.transaction()?;
    let mut spec_cache: HashMap<String, i64> = HashMap::new();
    let mut count = 0usize;

    for (line, result) in rdr.records().enumerate() {
        let rec = result?;
        let row = line + 2;
        let spec = rec.get(0).unwrap_or("").trim().to_string();
        let description = rec.get(1).context("description missing")?;
        let item = line_item_from_fields(
            description,
            rec.get(2).unwrap_or(""),
            rec.get(3),
            rec.get(4),
            rec.get(5),
            rec.get(6),
            rec.get(7),
        )
        .with_context(|| format!("Invalid item on row {} ('{}')", row, description.trim()))?;

        let spec_id = if spec.is_empty() {
            None
        } else {
            let id = match spec_cache.entry(spec.clone()) {
                Entry::Occupied(entry) => *entry.get(),
                Entry::Vacant(entry) => {
                    let existing: Option<i64> = tx
                        .query_row(
                            "SELECT id FROM specifications WHERE quotation_id=?1 AND name=?2",
                            params![qid, &spec],
                            |r| r.get(0),
                        )
                        .optional()?;
                    let id = match existing {
                        Some(id) => id,
                        None => insert_specification(&tx, qid, &spec)?,
                    };
                    *entry.insert(id)
                }
            };
            Some(id)
        };
        insert_item(&tx, qid, spec_id, &item)?;
        count += 1;
    }
    load_draft(&tx, qid)?
        .snapshot()
        .with_context(|| format!("Import into '{}' rolled back", quote))?;
    tx.commit()?;
    tracing::info!(quotation = quote, count, path, "line items imported");
    println!("Imported {} item(s) into '{}' from {}", count, quote, path);
    Ok(())
}

pub fn fetch_payload(url: &str) -> Result<UpstreamPayload> {
    let client = http_client()?;
    let resp = client
        .get(url)
        .send()
        .with_context(|| format!("GET {}", url))?
        .error_for_status()?;
    let payload: UpstreamPayload = resp
        .json()
        .with_context(|| format!("Decode quotation payload from {}", url))?;
    Ok(payload)
}

/// Swap a quotation's line items for the ones in `payload`. Returns the
/// number of items now on the quotation.
pub fn replace_items(conn: &mut Connection, quotation_id: i64, payload: UpstreamPayload) -> Result<usize> {
    let source = payload.into_source();
    for item in source.items() {
        item.check_quantity()
            .with_context(|| format!("Item '{}' in payload", item.description))?;
    }
    let draft = load_draft(conn, quotation_id)?;
    let next = apply(&draft, Action::ReplaceItems(source)).into_result()?;
    replace_source(conn, quotation_id, &next.source)?;
    Ok(next.source.item_count())
}

fn pull(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let quote = sub.get_one::<String>("quote").unwrap().trim();
    let url = sub.get_one::<String>("url").unwrap().trim();
    let qid = id_for_quotation(conn, quote)?;
    let payload = fetch_payload(url)?;
    let count = replace_items(conn, qid, payload)?;
    tracing::info!(quotation = quote, count, url, "line items pulled");
    println!("Pulled {} item(s) into '{}'", count, quote);
    Ok(())
}
