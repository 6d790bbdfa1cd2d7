// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use costsheet::models::{LineItemSource, UpstreamPayload};
use costsheet::{cli, commands, db, utils};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde_json::json;
use std::io::Write;
use tempfile::{NamedTempFile, tempdir};

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn run(conn: &mut Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["costsheet"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("quote", sub)) => commands::quotes::handle(conn, sub),
        Some(("spec", sub)) => commands::specs::handle(conn, sub),
        Some(("item", sub)) => commands::items::handle(conn, sub),
        Some(("import", sub)) => commands::importer::handle(conn, sub),
        Some(("costing", sub)) => commands::costing::handle(conn, sub),
        Some(("export", sub)) => commands::exporter::handle(conn, sub),
        Some(("settings", sub)) => commands::settings::handle(conn, sub),
        Some(("doctor", _)) => commands::doctor::handle(conn),
        other => panic!("command not parsed: {:?}", other.map(|(n, _)| n)),
    }
}

fn quote_with_items(conn: &mut Connection) {
    run(conn, &["quote", "new", "--name", "Plant A", "--overheads", "1000"]).unwrap();
    run(
        conn,
        &[
            "item", "add", "--quote", "Plant A", "--description", "Chiller", "--supply-own",
            "8000", "--type", "high-side",
        ],
    )
    .unwrap();
    run(
        conn,
        &[
            "item", "add", "--quote", "Plant A", "--description", "Erection", "--install-own",
            "2000",
        ],
    )
    .unwrap();
}

fn stored(conn: &Connection, column: &str) -> String {
    conn.query_row(
        &format!("SELECT {} FROM quotations WHERE name='Plant A'", column),
        [],
        |r| r.get(0),
    )
    .unwrap()
}

#[test]
fn margin_edits_persist_and_flow_into_snapshot() {
    let mut conn = setup();
    quote_with_items(&mut conn);
    run(&mut conn, &["costing", "margin", "--quote", "Plant A", "--category", "supply", "--value", "10"]).unwrap();
    run(&mut conn, &["costing", "margin", "--quote", "Plant A", "--category", "labour", "--value", "20"]).unwrap();
    assert_eq!(stored(&conn, "margin_supply"), "10");
    assert_eq!(stored(&conn, "margin_labour"), "20");

    let snap = commands::costing::snapshot_for(&conn, "Plant A").unwrap();
    assert_eq!(snap.sitc_summary.margin_amount, Decimal::from(1320));
    assert_eq!(snap.sitc_summary.selling_amount, Decimal::from(12320));
}

#[test]
fn invalid_margin_is_reported_and_not_stored() {
    let mut conn = setup();
    quote_with_items(&mut conn);
    run(&mut conn, &["costing", "margin", "--quote", "Plant A", "--category", "supply", "--value", "12.5"]).unwrap();

    for raw in ["100.01", "-1", "50.123"] {
        let err = run(
            &mut conn,
            &["costing", "margin", "--quote", "Plant A", "--category", "supply", "--value", raw],
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid margin value"), "{}", err);
        assert_eq!(stored(&conn, "margin_supply"), "12.5");
    }

    run(&mut conn, &["costing", "margin", "--quote", "Plant A", "--category", "supply", "--value", ""]).unwrap();
    assert_eq!(stored(&conn, "margin_supply"), "0");
}

#[test]
fn sitc_margin_cannot_be_edited_from_cli() {
    let mut conn = setup();
    quote_with_items(&mut conn);
    let err = run(
        &mut conn,
        &["costing", "margin", "--quote", "Plant A", "--category", "sitc", "--value", "5"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("cannot be edited"));
}

#[test]
fn gst_edit_updates_one_bucket() {
    let mut conn = setup();
    quote_with_items(&mut conn);
    run(&mut conn, &["costing", "gst", "--quote", "Plant A", "--bucket", "high-side", "--value", "28"]).unwrap();
    assert_eq!(stored(&conn, "gst_high_side"), "28");
    assert_eq!(stored(&conn, "gst_installation"), "18");
    assert!(run(&mut conn, &["costing", "gst", "--quote", "Plant A", "--bucket", "installation", "--value", "-5"]).is_err());
    assert_eq!(stored(&conn, "gst_installation"), "18");

    let fc = commands::costing::snapshot_for(&conn, "Plant A").unwrap().final_costing;
    assert_eq!(fc.high_side_with_gst, Decimal::from(10240));
    assert_eq!(fc.installation_with_gst, Decimal::from(2360));
    assert_eq!(fc.total_gst_amount, Decimal::from(2600));
}

#[test]
fn default_gst_setting_applies_to_new_quotations() {
    let mut conn = setup();
    run(&mut conn, &["settings", "default-gst", "--value", "12"]).unwrap();
    run(&mut conn, &["quote", "new", "--name", "Plant A"]).unwrap();
    assert_eq!(stored(&conn, "gst_low_side"), "12");
    assert_eq!(utils::get_default_gst(&conn).unwrap(), Decimal::from(12));
}

#[test]
fn export_costing_writes_snapshot_json() {
    let mut conn = setup();
    run(&mut conn, &["quote", "new", "--name", "Plant A"]).unwrap();
    run(
        &mut conn,
        &[
            "item", "add", "--quote", "Plant A", "--description", "Compressor", "--supply-own",
            "1000", "--type", "HIGH SIDE SUPPLY",
        ],
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("costing.json");
    let out_str = out_path.to_string_lossy().to_string();
    run(&mut conn, &["export", "costing", "--quote", "Plant A", "--format", "json", "--out", &out_str]).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    let num = |v: &serde_json::Value| v.as_str().unwrap().parse::<Decimal>().unwrap();
    let fc = &parsed["finalCosting"];
    assert_eq!(num(&fc["highSideAmount"]), Decimal::from(1000));
    assert_eq!(num(&fc["highSideWithGST"]), Decimal::from(1180));
    assert_eq!(num(&fc["totalWithGST"]), Decimal::from(1180));
    assert_eq!(num(&fc["totalGSTAmount"]), Decimal::from(180));
    assert_eq!(
        fc["groupedItems"]["HIGH SIDE SUPPLY"]["items"][0]["description"],
        json!("Compressor")
    );
}

#[test]
fn export_costing_rejects_unknown_format() {
    let mut conn = setup();
    quote_with_items(&mut conn);
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("costing.xml");
    let out_str = out_path.to_string_lossy().to_string();
    assert!(run(&mut conn, &["export", "costing", "--quote", "Plant A", "--format", "xml", "--out", &out_str]).is_err());
    assert!(!out_path.exists());
}

#[test]
fn export_costing_csv_has_bucket_totals() {
    let mut conn = setup();
    quote_with_items(&mut conn);
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("costing.csv");
    let out_str = out_path.to_string_lossy().to_string();
    run(&mut conn, &["export", "costing", "--quote", "Plant A", "--format", "csv", "--out", &out_str]).unwrap();

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    let grand = records.last().unwrap();
    assert_eq!(&grand[1], "GRAND TOTAL");
    assert_eq!(grand[5].parse::<Decimal>().unwrap(), Decimal::from(10000));
    assert_eq!(grand[7].parse::<Decimal>().unwrap(), Decimal::from(11800));
    assert!(records.iter().any(|r| &r[0] == "HIGH SIDE SUPPLY" && &r[1] == "Chiller"));
}

#[test]
fn import_items_csv_groups_by_specification() {
    let mut conn = setup();
    run(&mut conn, &["quote", "new", "--name", "Plant A"]).unwrap();
    let mut tmp = NamedTempFile::new().unwrap();
    writeln!(
        tmp,
        "spec,description,quantity,supply_rate,installation_rate,supply_own_amount,installation_own_amount,material_type"
    )
    .unwrap();
    writeln!(tmp, "Chiller,Chiller unit,1,9000,,8000,,HIGH SIDE SUPPLY").unwrap();
    writeln!(tmp, "Chiller,Piping,10,,250,,2000,installation").unwrap();
    writeln!(tmp, "AHU,Duct,5,,,300,,low side").unwrap();
    tmp.flush().unwrap();
    let path = tmp.path().to_string_lossy().to_string();

    run(&mut conn, &["import", "items", "--quote", "Plant A", "--path", &path]).unwrap();

    let qid = utils::id_for_quotation(&conn, "Plant A").unwrap();
    match db::load_source(&conn, qid).unwrap() {
        LineItemSource::Specs(specs) => {
            assert_eq!(specs.len(), 2);
            assert_eq!(specs[0].name, "Chiller");
            assert_eq!(specs[0].items.len(), 2);
            assert_eq!(specs[1].items[0].description, "Duct");
        }
        other => panic!("expected specifications, got {:?}", other),
    }
    let fc = commands::costing::snapshot_for(&conn, "Plant A").unwrap().final_costing;
    assert_eq!(fc.high_side_amount, Decimal::from(8000));
    assert_eq!(fc.low_side_amount, Decimal::from(300));
    assert_eq!(fc.installation_amount, Decimal::from(2000));
}

#[test]
fn import_items_is_all_or_nothing() {
    let mut conn = setup();
    run(&mut conn, &["quote", "new", "--name", "Plant A"]).unwrap();
    let mut tmp = NamedTempFile::new().unwrap();
    writeln!(
        tmp,
        "spec,description,quantity,supply_rate,installation_rate,supply_own_amount,installation_own_amount,material_type"
    )
    .unwrap();
    writeln!(tmp, ",Valve,2,,,100,,").unwrap();
    writeln!(tmp, ",Broken,-3,,,100,,").unwrap();
    tmp.flush().unwrap();
    let path = tmp.path().to_string_lossy().to_string();

    assert!(run(&mut conn, &["import", "items", "--quote", "Plant A", "--path", &path]).is_err());
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM line_items", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn pulled_payload_replaces_items() {
    let mut conn = setup();
    quote_with_items(&mut conn);
    let payload: UpstreamPayload = serde_json::from_value(json!({
        "items": [
            {"description": "AHU", "quantity": "2", "supplyOwnAmount": "1500", "materialType": "LOW SIDE SUPPLY"},
            {"description": "Labour", "installationOwnAmount": 500}
        ]
    }))
    .unwrap();
    let qid = utils::id_for_quotation(&conn, "Plant A").unwrap();
    let count = commands::importer::replace_items(&mut conn, qid, payload).unwrap();
    assert_eq!(count, 2);

    let snap = commands::costing::snapshot_for(&conn, "Plant A").unwrap();
    assert_eq!(snap.sitc_summary.own_amount, Decimal::from(2000));
    assert_eq!(snap.supply_summary.overheads_amount, Decimal::from(750));
    assert_eq!(snap.final_costing.low_side_amount, Decimal::from(1500));
    assert_eq!(snap.final_costing.installation_amount, Decimal::from(500));
}

#[test]
fn classify_and_remove_items() {
    let mut conn = setup();
    quote_with_items(&mut conn);
    let id: i64 = conn
        .query_row("SELECT id FROM line_items WHERE description='Erection'", [], |r| r.get(0))
        .unwrap();
    let id_s = id.to_string();
    run(&mut conn, &["item", "classify", "--quote", "Plant A", "--id", &id_s, "--type", "low-side"]).unwrap();
    let fc = commands::costing::snapshot_for(&conn, "Plant A").unwrap().final_costing;
    assert_eq!(fc.low_side_amount, Decimal::from(2000));
    assert!(fc.installation_amount.is_zero());

    run(&mut conn, &["item", "rm", "--quote", "Plant A", "--id", &id_s]).unwrap();
    assert!(run(&mut conn, &["item", "rm", "--quote", "Plant A", "--id", &id_s]).is_err());
}

#[test]
fn item_add_rejects_negative_quantity() {
    let mut conn = setup();
    run(&mut conn, &["quote", "new", "--name", "Plant A"]).unwrap();
    let err = run(
        &mut conn,
        &["item", "add", "--quote", "Plant A", "--description", "Pump", "--qty", "-2"],
    )
    .unwrap_err();
    assert!(err.to_string().contains("negative"));
}

#[test]
fn saved_costings_are_listed_and_removed_with_quote() {
    let mut conn = setup();
    quote_with_items(&mut conn);
    run(&mut conn, &["costing", "save", "--quote", "Plant A"]).unwrap();
    run(&mut conn, &["costing", "save", "--quote", "Plant A"]).unwrap();
    run(&mut conn, &["costing", "history", "--quote", "Plant A"]).unwrap();
    let qid = utils::id_for_quotation(&conn, "Plant A").unwrap();
    let saved: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM costings WHERE quotation_id=?1",
            params![qid],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(saved, 2);

    run(&mut conn, &["quote", "rm", "--quote", "Plant A"]).unwrap();
    let left: i64 = conn
        .query_row("SELECT COUNT(*) FROM costings", [], |r| r.get(0))
        .unwrap();
    assert_eq!(left, 0);
    let items: i64 = conn
        .query_row("SELECT COUNT(*) FROM line_items", [], |r| r.get(0))
        .unwrap();
    assert_eq!(items, 0);
}

#[test]
fn doctor_flags_shadowed_and_empty() {
    let mut conn = setup();
    quote_with_items(&mut conn);
    run(&mut conn, &["spec", "add", "--quote", "Plant A", "--name", "Chiller"]).unwrap();
    run(&mut conn, &["quote", "new", "--name", "Empty"]).unwrap();

    let issues = commands::doctor::check(&conn).unwrap();
    let kinds: Vec<&str> = issues.iter().map(|r| r[0].as_str()).collect();
    assert!(kinds.contains(&"flat_items_ignored"));
    assert!(kinds.contains(&"quotation_no_items"));
    assert!(kinds.contains(&"empty_specification"));

    // the flat items no longer count once a specification exists
    let snap = commands::costing::snapshot_for(&conn, "Plant A").unwrap();
    assert!(snap.sitc_summary.own_amount.is_zero());
}

#[test]
fn overheads_command_validates_amount() {
    let mut conn = setup();
    quote_with_items(&mut conn);
    run(&mut conn, &["quote", "overheads", "--quote", "Plant A", "--amount", "2500"]).unwrap();
    assert_eq!(stored(&conn, "overheads_cost"), "2500");
    assert!(run(&mut conn, &["quote", "overheads", "--quote", "Plant A", "--amount", "-1"]).is_err());
    assert!(run(&mut conn, &["quote", "overheads", "--quote", "Plant A", "--amount", "abc"]).is_err());
    assert_eq!(stored(&conn, "overheads_cost"), "2500");
}

#[test]
fn draft_round_trips_through_store() {
    use costsheet::costing::{GstRates, MarginRates, QuotationDraft};
    use costsheet::models::{LineItem, MaterialType, Specification};

    let mut conn = setup();
    run(&mut conn, &["quote", "new", "--name", "Plant A"]).unwrap();
    let qid = utils::id_for_quotation(&conn, "Plant A").unwrap();

    let source = LineItemSource::Specs(vec![Specification {
        id: None,
        name: "Chiller".into(),
        items: vec![LineItem {
            description: "Compressor".into(),
            quantity: Decimal::from(2),
            supply_rate: Some(Decimal::new(450025, 2)),
            supply_own_amount: Some(Decimal::new(900050, 2)),
            material_type: Some(MaterialType::HighSideSupply),
            ..Default::default()
        }],
    }]);
    let draft = QuotationDraft {
        source,
        total_overheads_cost: Decimal::new(12345, 1),
        margins: MarginRates {
            supply: Decimal::new(1250, 2),
            labour: Decimal::from(20),
        },
        gst_rates: GstRates {
            high_side_supply: Decimal::from(28),
            low_side_supply: Decimal::from(18),
            installation: Decimal::from(12),
        },
    };
    db::replace_source(&mut conn, qid, &draft.source).unwrap();
    db::store_draft_inputs(&conn, qid, &draft).unwrap();

    let loaded = db::load_draft(&conn, qid).unwrap();
    assert_eq!(loaded.total_overheads_cost, draft.total_overheads_cost);
    assert_eq!(loaded.margins, draft.margins);
    assert_eq!(loaded.gst_rates, draft.gst_rates);
    let (a, b) = (loaded.snapshot().unwrap(), draft.snapshot().unwrap());
    assert_eq!(a.sitc_summary, b.sitc_summary);
    assert_eq!(a.final_costing.total_with_gst, b.final_costing.total_with_gst);
    let item = loaded.source.items().next().unwrap();
    assert!(item.id.is_some());
    assert_eq!(item.supply_own_amount, Some(Decimal::new(900050, 2)));
    assert_eq!(item.installation_own_amount, None);
}

#[test]
fn uncostable_gst_edit_is_not_stored() {
    let mut conn = setup();
    quote_with_items(&mut conn);
    let err = run(
        &mut conn,
        &[
            "costing", "gst", "--quote", "Plant A", "--bucket", "high-side", "--value",
            "79228162514264337593543950335",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("too large"), "{}", err);
    assert_eq!(stored(&conn, "gst_high_side"), "18");
    assert!(commands::costing::snapshot_for(&conn, "Plant A").is_ok());
}

#[test]
fn uncostable_item_is_not_added() {
    let mut conn = setup();
    run(&mut conn, &["quote", "new", "--name", "Plant A"]).unwrap();
    let big = format!("4{}", "0".repeat(28));
    run(&mut conn, &["item", "add", "--quote", "Plant A", "--description", "Big", "--supply-own", &big]).unwrap();
    let err = run(
        &mut conn,
        &["item", "add", "--quote", "Plant A", "--description", "Bigger", "--supply-own", &big],
    )
    .unwrap_err();
    assert!(err.to_string().contains("not added"), "{}", err);
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM line_items", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 1);
    assert!(commands::costing::snapshot_for(&conn, "Plant A").is_ok());
}
