// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::costing::{GstRates, MarginRates, QuotationDraft};
use crate::models::{LineItem, LineItemSource, MaterialType, Specification};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Costsheet", "costsheet"));

pub const DB_ENV: &str = "COSTSHEET_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("costsheet.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS quotations(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        client TEXT,
        overheads_cost TEXT NOT NULL DEFAULT '0',
        margin_supply TEXT NOT NULL DEFAULT '0',
        margin_labour TEXT NOT NULL DEFAULT '0',
        gst_high_side TEXT NOT NULL DEFAULT '18',
        gst_low_side TEXT NOT NULL DEFAULT '18',
        gst_installation TEXT NOT NULL DEFAULT '18',
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS specifications(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        quotation_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        UNIQUE(quotation_id, name),
        FOREIGN KEY(quotation_id) REFERENCES quotations(id) ON DELETE CASCADE
    );

    -- spec_id NULL means the item belongs to the quotation's flat list
    CREATE TABLE IF NOT EXISTS line_items(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        quotation_id INTEGER NOT NULL,
        spec_id INTEGER,
        description TEXT NOT NULL DEFAULT '',
        quantity TEXT NOT NULL DEFAULT '0',
        supply_rate TEXT,
        installation_rate TEXT,
        supply_own_amount TEXT,
        installation_own_amount TEXT,
        material_type TEXT,
        FOREIGN KEY(quotation_id) REFERENCES quotations(id) ON DELETE CASCADE,
        FOREIGN KEY(spec_id) REFERENCES specifications(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_line_items_quotation ON line_items(quotation_id);

    CREATE TABLE IF NOT EXISTS costings(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        quotation_id INTEGER NOT NULL,
        saved_at TEXT NOT NULL,
        payload TEXT NOT NULL,
        FOREIGN KEY(quotation_id) REFERENCES quotations(id) ON DELETE CASCADE
    );
    "#,
    )?;
    Ok(())
}

fn dec(s: &str, what: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid {} '{}' in database", what, s))
}

fn opt_dec(s: Option<String>, what: &str) -> Result<Option<Decimal>> {
    s.map(|v| dec(&v, what)).transpose()
}

const ITEM_COLUMNS: &str = "id, description, quantity, supply_rate, installation_rate, \
     supply_own_amount, installation_own_amount, material_type";

type RawItem = (
    i64,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn raw_item(r: &Row<'_>) -> rusqlite::Result<RawItem> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
        r.get(6)?,
        r.get(7)?,
    ))
}

fn item_from_raw(raw: RawItem) -> Result<LineItem> {
    let (id, description, qty, s_rate, i_rate, s_own, i_own, mt) = raw;
    Ok(LineItem {
        id: Some(id),
        description,
        quantity: dec(&qty, "quantity")?,
        supply_rate: opt_dec(s_rate, "supply rate")?,
        installation_rate: opt_dec(i_rate, "installation rate")?,
        supply_own_amount: opt_dec(s_own, "supply own amount")?,
        installation_own_amount: opt_dec(i_own, "installation own amount")?,
        material_type: mt.map(|m| m.parse::<MaterialType>()).transpose()?,
    })
}

fn load_items(conn: &Connection, quotation_id: i64, spec_id: Option<i64>) -> Result<Vec<LineItem>> {
    let rows = match spec_id {
        Some(sid) => {
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {} FROM line_items WHERE quotation_id=?1 AND spec_id=?2 ORDER BY id",
                ITEM_COLUMNS
            ))?;
            let rows = stmt
                .query_map(params![quotation_id, sid], raw_item)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        }
        None => {
            let mut stmt = conn.prepare_cached(&format!(
                "SELECT {} FROM line_items WHERE quotation_id=?1 AND spec_id IS NULL ORDER BY id",
                ITEM_COLUMNS
            ))?;
            let rows = stmt
                .query_map(params![quotation_id], raw_item)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        }
    };
    rows.into_iter().map(item_from_raw).collect()
}

pub fn load_flat_items(conn: &Connection, quotation_id: i64) -> Result<Vec<LineItem>> {
    load_items(conn, quotation_id, None)
}

pub fn load_specifications(conn: &Connection, quotation_id: i64) -> Result<Vec<Specification>> {
    let mut stmt =
        conn.prepare("SELECT id, name FROM specifications WHERE quotation_id=?1 ORDER BY id")?;
    let heads = stmt
        .query_map(params![quotation_id], |r| {
            Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    let mut specs = Vec::with_capacity(heads.len());
    for (id, name) in heads {
        specs.push(Specification {
            id: Some(id),
            name,
            items: load_items(conn, quotation_id, Some(id))?,
        });
    }
    Ok(specs)
}

pub fn load_source(conn: &Connection, quotation_id: i64) -> Result<LineItemSource> {
    let specs = load_specifications(conn, quotation_id)?;
    let flat = if specs.is_empty() {
        load_flat_items(conn, quotation_id)?
    } else {
        Vec::new()
    };
    Ok(LineItemSource::from_parts(specs, flat))
}

pub fn load_draft(conn: &Connection, quotation_id: i64) -> Result<QuotationDraft> {
    let (overheads, m_supply, m_labour, g_high, g_low, g_inst): (
        String,
        String,
        String,
        String,
        String,
        String,
    ) = conn
        .query_row(
            "SELECT overheads_cost, margin_supply, margin_labour, gst_high_side, gst_low_side, gst_installation
             FROM quotations WHERE id=?1",
            params![quotation_id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?)),
        )
        .with_context(|| format!("Quotation #{} not found", quotation_id))?;
    Ok(QuotationDraft {
        source: load_source(conn, quotation_id)?,
        total_overheads_cost: dec(&overheads, "overheads cost")?,
        margins: MarginRates {
            supply: dec(&m_supply, "supply margin")?,
            labour: dec(&m_labour, "labour margin")?,
        },
        gst_rates: GstRates {
            high_side_supply: dec(&g_high, "high side GST")?,
            low_side_supply: dec(&g_low, "low side GST")?,
            installation: dec(&g_inst, "installation GST")?,
        },
    })
}

/// Persist the user-entered inputs of a draft. Line items are stored separately.
pub fn store_draft_inputs(conn: &Connection, quotation_id: i64, draft: &QuotationDraft) -> Result<()> {
    conn.execute(
        "UPDATE quotations SET overheads_cost=?2, margin_supply=?3, margin_labour=?4,
             gst_high_side=?5, gst_low_side=?6, gst_installation=?7
         WHERE id=?1",
        params![
            quotation_id,
            draft.total_overheads_cost.to_string(),
            draft.margins.supply.to_string(),
            draft.margins.labour.to_string(),
            draft.gst_rates.high_side_supply.to_string(),
            draft.gst_rates.low_side_supply.to_string(),
            draft.gst_rates.installation.to_string(),
        ],
    )?;
    Ok(())
}

pub fn insert_item(
    conn: &Connection,
    quotation_id: i64,
    spec_id: Option<i64>,
    item: &LineItem,
) -> Result<i64> {
    let opt = |d: Option<Decimal>| d.map(|v| v.to_string());
    conn.execute(
        "INSERT INTO line_items(quotation_id, spec_id, description, quantity, supply_rate,
             installation_rate, supply_own_amount, installation_own_amount, material_type)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
        params![
            quotation_id,
            spec_id,
            item.description,
            item.quantity.to_string(),
            opt(item.supply_rate),
            opt(item.installation_rate),
            opt(item.supply_own_amount),
            opt(item.installation_own_amount),
            item.material_type.map(|m| m.as_str()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_specification(conn: &Connection, quotation_id: i64, name: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO specifications(quotation_id, name) VALUES (?1, ?2)",
        params![quotation_id, name],
    )
    .with_context(|| format!("Add specification '{}'", name))?;
    Ok(conn.last_insert_rowid())
}

/// Drop every specification and line item of a quotation and write `source`
/// in their place.
pub fn replace_source(conn: &mut Connection, quotation_id: i64, source: &LineItemSource) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute(
        "DELETE FROM line_items WHERE quotation_id=?1",
        params![quotation_id],
    )?;
    tx.execute(
        "DELETE FROM specifications WHERE quotation_id=?1",
        params![quotation_id],
    )?;
    match source {
        LineItemSource::Specs(specs) => {
            for spec in specs {
                let spec_id = insert_specification(&tx, quotation_id, &spec.name)?;
                for item in &spec.items {
                    insert_item(&tx, quotation_id, Some(spec_id), item)?;
                }
            }
        }
        LineItemSource::Flat(items) => {
            for item in items {
                insert_item(&tx, quotation_id, None, item)?;
            }
        }
    }
    tx.commit()?;
    Ok(())
}
