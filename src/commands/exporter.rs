// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::costing::snapshot_for;
use crate::costing::{CostingSnapshot, gst::with_gst};
use crate::models::MaterialType;
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("costing", sub)) => export_costing(conn, sub),
        _ => Ok(()),
    }
}

fn export_costing(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let quote = sub.get_one::<String>("quote").unwrap().trim();
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    if fmt != "json" && fmt != "csv" {
        return Err(anyhow!("Unknown format: {} (use csv|json)", fmt));
    }
    let snapshot = snapshot_for(conn, quote)?;
    match fmt.as_str() {
        "csv" => write_csv(&snapshot, out)?,
        _ => std::fs::write(out, serde_json::to_string_pretty(&snapshot)?)?,
    }
    tracing::info!(quotation = quote, format = %fmt, out = %out, "costing exported");
    println!("Exported costing for '{}' to {}", quote, out);
    Ok(())
}

fn write_csv(snapshot: &CostingSnapshot, out: &str) -> Result<()> {
    let fc = &snapshot.final_costing;
    let mut wtr = csv::Writer::from_path(out)?;
    wtr.write_record([
        "bucket",
        "description",
        "quantity",
        "supply_own_amount",
        "installation_own_amount",
        "amount",
        "gst_percentage",
        "amount_with_gst",
    ])?;
    for material in MaterialType::ALL {
        let rate = snapshot.gst_rates.rate_for(material);
        for item in &fc.grouped_items.bucket(material).items {
            let amount = item.own_total()?;
            wtr.write_record([
                material.to_string(),
                item.description.clone(),
                item.quantity.to_string(),
                item.supply_own().to_string(),
                item.installation_own().to_string(),
                amount.to_string(),
                rate.to_string(),
                with_gst(amount, rate)?.round_dp(2).to_string(),
            ])?;
        }
        wtr.write_record([
            material.to_string(),
            "TOTAL".to_string(),
            String::new(),
            String::new(),
            String::new(),
            fc.amount_for(material).to_string(),
            rate.to_string(),
            fc.with_gst_for(material).round_dp(2).to_string(),
        ])?;
    }
    wtr.write_record([
        "ALL".to_string(),
        "GRAND TOTAL".to_string(),
        String::new(),
        String::new(),
        String::new(),
        fc.total_without_gst.to_string(),
        fc.total_gst_amount.round_dp(2).to_string(),
        fc.total_with_gst.round_dp(2).to_string(),
    ])?;
    wtr.flush()?;
    Ok(())
}
