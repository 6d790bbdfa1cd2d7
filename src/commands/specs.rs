// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::costing::aggregate;
use crate::db::{insert_specification, load_specifications};
use crate::models::LineItemSource;
use crate::utils::{id_for_quotation, id_for_spec, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let quote = sub.get_one::<String>("quote").unwrap().trim();
            let name = sub.get_one::<String>("name").unwrap().trim();
            let qid = id_for_quotation(conn, quote)?;
            insert_specification(conn, qid, name)?;
            println!("Added specification '{}' to '{}'", name, quote);
        }
        Some(("list", sub)) => {
            let quote = sub.get_one::<String>("quote").unwrap().trim();
            let qid = id_for_quotation(conn, quote)?;
            let mut data = Vec::new();
            for s in load_specifications(conn, qid)? {
                let count = s.items.len();
                let own = aggregate(&LineItemSource::Flat(s.items))?.total_own;
                data.push(vec![s.name, count.to_string(), format!("{:.2}", own)]);
            }
            println!("{}", pretty_table(&["Specification", "Items", "Own Cost"], data));
        }
        Some(("rm", sub)) => {
            let quote = sub.get_one::<String>("quote").unwrap().trim();
            let name = sub.get_one::<String>("name").unwrap().trim();
            let qid = id_for_quotation(conn, quote)?;
            let sid = id_for_spec(conn, qid, name)?;
            conn.execute("DELETE FROM specifications WHERE id=?1", params![sid])?;
            println!("Removed specification '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
