// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::costing::parse_gst_percentage;
use crate::db::db_path;
use crate::utils::{get_currency, get_default_gst, pretty_table, set_currency, set_default_gst};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let rows = vec![
                vec!["database".to_string(), db_path()?.display().to_string()],
                vec!["currency".to_string(), get_currency(conn)?],
                vec![
                    "default_gst_percentage".to_string(),
                    get_default_gst(conn)?.to_string(),
                ],
            ];
            println!("{}", pretty_table(&["Setting", "Value"], rows));
        }
        Some(("default-gst", sub)) => {
            let raw = sub.get_one::<String>("value").unwrap();
            let rate = parse_gst_percentage(raw)?.value();
            set_default_gst(conn, rate)?;
            println!("Default GST set to {}%", rate);
        }
        Some(("currency", sub)) => {
            let code = sub.get_one::<String>("code").unwrap().trim().to_uppercase();
            if code.is_empty() {
                return Err(anyhow!("Currency code must not be empty"));
            }
            set_currency(conn, &code)?;
            println!("Currency set to {}", code);
        }
        _ => {}
    }
    Ok(())
}
