// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn check(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Flat items shadowed by specifications
    let mut stmt = conn.prepare(
        "SELECT q.name, COUNT(li.id) FROM quotations q
         JOIN line_items li ON li.quotation_id=q.id AND li.spec_id IS NULL
         WHERE EXISTS (SELECT 1 FROM specifications s WHERE s.quotation_id=q.id)
         GROUP BY q.id ORDER BY q.name",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let q: String = r.get(0)?;
        let n: i64 = r.get(1)?;
        rows.push(vec![
            "flat_items_ignored".into(),
            format!("{}: {} item(s)", q, n),
        ]);
    }

    // 2) Items without any own cost
    let mut stmt2 = conn.prepare(
        "SELECT q.name, li.id, li.description FROM line_items li
         JOIN quotations q ON q.id=li.quotation_id
         WHERE COALESCE(li.supply_own_amount, '0') + 0 = 0
           AND COALESCE(li.installation_own_amount, '0') + 0 = 0
         ORDER BY q.name, li.id",
    )?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let q: String = r.get(0)?;
        let id: i64 = r.get(1)?;
        let d: String = r.get(2)?;
        rows.push(vec!["item_no_own_cost".into(), format!("{} #{} {}", q, id, d)]);
    }

    // 3) Quotations with nothing to cost
    let mut stmt3 = conn.prepare(
        "SELECT name FROM quotations q
         WHERE NOT EXISTS (SELECT 1 FROM line_items li WHERE li.quotation_id=q.id)
         ORDER BY name",
    )?;
    let mut cur3 = stmt3.query([])?;
    while let Some(r) = cur3.next()? {
        let q: String = r.get(0)?;
        rows.push(vec!["quotation_no_items".into(), q]);
    }

    // 4) Empty specifications
    let mut stmt4 = conn.prepare(
        "SELECT q.name, s.name FROM specifications s
         JOIN quotations q ON q.id=s.quotation_id
         WHERE NOT EXISTS (SELECT 1 FROM line_items li WHERE li.spec_id=s.id)
         ORDER BY q.name, s.name",
    )?;
    let mut cur4 = stmt4.query([])?;
    while let Some(r) = cur4.next()? {
        let q: String = r.get(0)?;
        let s: String = r.get(1)?;
        rows.push(vec!["empty_specification".into(), format!("{} / {}", q, s)]);
    }

    Ok(rows)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = check(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
