// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::costing::{Action, apply};
use crate::db::{load_draft, load_flat_items, load_specifications, store_draft_inputs};
use crate::models::{LineItem, Quotation};
use crate::utils::{
    fmt_money, get_currency, get_default_gst, id_for_quotation, maybe_print_json,
    parse_non_negative, pretty_table,
};
use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("new", sub)) => create(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("quote").unwrap().trim();
            let id = id_for_quotation(conn, name)?;
            conn.execute("DELETE FROM quotations WHERE id=?1", params![id])?;
            tracing::info!(quotation = name, "quotation removed");
            println!("Removed quotation '{}'", name);
        }
        Some(("overheads", sub)) => set_overheads(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn create(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let client = sub
        .get_one::<String>("client")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let overheads = match sub.get_one::<String>("overheads") {
        Some(raw) => parse_non_negative(raw, "Overheads cost")?,
        None => Decimal::ZERO,
    };
    let gst = get_default_gst(conn)?.to_string();
    conn.execute(
        "INSERT INTO quotations(name, client, overheads_cost, gst_high_side, gst_low_side, gst_installation)
         VALUES (?1, ?2, ?3, ?4, ?4, ?4)",
        params![name, client, overheads.to_string(), gst],
    )
    .with_context(|| format!("Create quotation '{}'", name))?;
    tracing::info!(quotation = %name, %overheads, "quotation created");
    println!("Created quotation '{}' (overheads {}, GST {}%)", name, overheads, gst);
    Ok(())
}

pub fn load_quotations(conn: &Connection) -> Result<Vec<Quotation>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, client, overheads_cost, created_at FROM quotations ORDER BY name",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, Option<String>>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, name, client, overheads, created_at) = row?;
        let overheads_cost = overheads
            .parse::<Decimal>()
            .with_context(|| format!("Invalid overheads '{}' for {}", overheads, name))?;
        out.push(Quotation {
            id,
            name,
            client,
            overheads_cost,
            created_at,
        });
    }
    Ok(out)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let quotations = load_quotations(conn)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &quotations)? {
        return Ok(());
    }
    let mut data = Vec::new();
    for q in quotations {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM line_items WHERE quotation_id=?1",
            params![q.id],
            |r| r.get(0),
        )?;
        data.push(vec![
            q.name,
            q.client.unwrap_or_default(),
            format!("{:.2}", q.overheads_cost),
            count.to_string(),
            q.created_at,
        ]);
    }
    println!(
        "{}",
        pretty_table(&["Name", "Client", "Overheads", "Items", "Created"], data)
    );
    Ok(())
}

pub(crate) fn item_rows(spec: &str, items: &[LineItem]) -> Vec<Vec<String>> {
    let opt = |d: Option<Decimal>| d.map(|v| format!("{:.2}", v)).unwrap_or_default();
    items
        .iter()
        .map(|it| {
            vec![
                it.id.map(|i| i.to_string()).unwrap_or_default(),
                spec.to_string(),
                it.description.clone(),
                it.quantity.to_string(),
                opt(it.supply_rate),
                opt(it.installation_rate),
                format!("{:.2}", it.supply_own()),
                format!("{:.2}", it.installation_own()),
                it.material().to_string(),
            ]
        })
        .collect()
}

pub(crate) const ITEM_HEADERS: [&str; 9] = [
    "ID",
    "Spec",
    "Description",
    "Qty",
    "Supply Rate",
    "Install Rate",
    "Supply Own",
    "Install Own",
    "Material",
];

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("quote").unwrap().trim();
    let id = id_for_quotation(conn, name)?;
    let (client, created): (Option<String>, String) = conn.query_row(
        "SELECT client, created_at FROM quotations WHERE id=?1",
        params![id],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    let draft = load_draft(conn, id)?;
    let ccy = get_currency(conn)?;
    println!(
        "Quotation '{}'{} created {}",
        name,
        client.map(|c| format!(" for {}", c)).unwrap_or_default(),
        created
    );
    println!("Overheads pool: {}", fmt_money(&draft.total_overheads_cost, &ccy));

    let specs = load_specifications(conn, id)?;
    let mut rows = Vec::new();
    for spec in &specs {
        rows.extend(item_rows(&spec.name, &spec.items));
    }
    let flat = load_flat_items(conn, id)?;
    if !specs.is_empty() && !flat.is_empty() {
        println!(
            "Note: {} flat item(s) are ignored because specifications exist",
            flat.len()
        );
    }
    rows.extend(item_rows("", &flat));
    println!("{}", pretty_table(&ITEM_HEADERS, rows));
    Ok(())
}

fn set_overheads(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("quote").unwrap().trim();
    let amount = parse_non_negative(sub.get_one::<String>("amount").unwrap(), "Overheads cost")?;
    let id = id_for_quotation(conn, name)?;
    let draft = load_draft(conn, id)?;
    let next = apply(&draft, Action::SetOverheadsCost(amount)).into_result()?;
    store_draft_inputs(conn, id, &next)?;
    tracing::info!(quotation = name, %amount, "overheads pool updated");
    println!("Overheads for '{}' set to {}", name, amount);
    Ok(())
}
