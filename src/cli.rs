// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn quote_arg() -> Arg {
    Arg::new("quote")
        .long("quote")
        .short('q')
        .required(true)
        .help("Quotation name")
}

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print as pretty JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    ]
}

// Raw percentage text; validated by the costing engine, not by clap.
fn percent_value_arg() -> Arg {
    Arg::new("value")
        .long("value")
        .required(true)
        .allow_hyphen_values(true)
        .help("Percentage, e.g. 12.5 (empty clears to 0)")
}

// Decimal text; negatives reach the parser so they get a proper error.
fn amount_arg(id: &'static str, long: &'static str) -> Arg {
    Arg::new(id).long(long).allow_hyphen_values(true)
}

fn quote_cmd() -> Command {
    Command::new("quote")
        .about("Create and manage quotations")
        .subcommand_required(true)
        .subcommand(
            Command::new("new")
                .about("Create a quotation")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("client").long("client"))
                .arg(
                    amount_arg("overheads", "overheads")
                        .help("Total overheads cost to allocate (default 0)"),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("List quotations")
                .args(json_args()),
        )
        .subcommand(
            Command::new("show")
                .about("Show specifications and line items")
                .arg(quote_arg()),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a quotation with its items and saved costings")
                .arg(quote_arg()),
        )
        .subcommand(
            Command::new("overheads")
                .about("Set the total overheads cost pool")
                .arg(quote_arg())
                .arg(amount_arg("amount", "amount").required(true)),
        )
}

fn spec_cmd() -> Command {
    Command::new("spec")
        .about("Manage specifications (named groups of line items)")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(quote_arg())
                .arg(Arg::new("name").long("name").required(true)),
        )
        .subcommand(Command::new("list").arg(quote_arg()))
        .subcommand(
            Command::new("rm")
                .about("Delete a specification and its items")
                .arg(quote_arg())
                .arg(Arg::new("name").long("name").required(true)),
        )
}

fn item_cmd() -> Command {
    Command::new("item")
        .about("Manage line items")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(quote_arg())
                .arg(
                    Arg::new("spec")
                        .long("spec")
                        .help("Specification name; omit for the flat item list"),
                )
                .arg(Arg::new("description").long("description").required(true))
                .arg(amount_arg("quantity", "qty").default_value("1"))
                .arg(amount_arg("supply-rate", "supply-rate"))
                .arg(amount_arg("install-rate", "install-rate"))
                .arg(amount_arg("supply-own", "supply-own"))
                .arg(amount_arg("install-own", "install-own"))
                .arg(
                    Arg::new("type")
                        .long("type")
                        .help("high-side | low-side | installation (default installation)"),
                ),
        )
        .subcommand(
            Command::new("list")
                .arg(quote_arg())
                .args(json_args()),
        )
        .subcommand(
            Command::new("classify")
                .about("Set the material type of an item")
                .arg(quote_arg())
                .arg(
                    Arg::new("id")
                        .long("id")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                )
                .arg(Arg::new("type").long("type").required(true)),
        )
        .subcommand(
            Command::new("rm")
                .arg(quote_arg())
                .arg(
                    Arg::new("id")
                        .long("id")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                ),
        )
}

fn import_cmd() -> Command {
    Command::new("import")
        .about("Import line items")
        .subcommand_required(true)
        .subcommand(
            Command::new("items")
                .about("Append line items from a CSV file")
                .arg(quote_arg())
                .arg(Arg::new("path").long("path").required(true)),
        )
        .subcommand(
            Command::new("pull")
                .about("Replace line items with a JSON payload fetched over HTTP")
                .arg(quote_arg())
                .arg(Arg::new("url").long("url").required(true)),
        )
}

fn costing_cmd() -> Command {
    Command::new("costing")
        .about("Margins, overhead allocation and GST breakdown")
        .subcommand_required(true)
        .subcommand(
            Command::new("summary")
                .arg(quote_arg())
                .args(json_args()),
        )
        .subcommand(
            Command::new("margin")
                .about("Edit the supply or labour margin percentage")
                .arg(quote_arg())
                .arg(
                    Arg::new("category")
                        .long("category")
                        .required(true)
                        .help("supply | labour"),
                )
                .arg(percent_value_arg()),
        )
        .subcommand(
            Command::new("gst")
                .about("Edit the GST percentage of a material bucket")
                .arg(quote_arg())
                .arg(
                    Arg::new("bucket")
                        .long("bucket")
                        .required(true)
                        .help("high-side | low-side | installation"),
                )
                .arg(percent_value_arg()),
        )
        .subcommand(
            Command::new("save")
                .about("Store the current final costing snapshot")
                .arg(quote_arg()),
        )
        .subcommand(
            Command::new("history")
                .about("List saved costing snapshots")
                .arg(quote_arg()),
        )
}

fn export_cmd() -> Command {
    Command::new("export")
        .about("Export data")
        .subcommand_required(true)
        .subcommand(
            Command::new("costing")
                .arg(quote_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("json")
                        .help("json | csv"),
                )
                .arg(Arg::new("out").long("out").required(true)),
        )
}

fn settings_cmd() -> Command {
    Command::new("settings")
        .about("Configuration values")
        .subcommand_required(true)
        .subcommand(Command::new("show"))
        .subcommand(
            Command::new("default-gst")
                .about("GST percentage applied to new quotations")
                .arg(percent_value_arg()),
        )
        .subcommand(
            Command::new("currency")
                .about("Currency label used in tables")
                .arg(Arg::new("code").long("code").required(true)),
        )
}

pub fn build_cli() -> Command {
    Command::new("costsheet")
        .version(crate_version!())
        .about("Quotation costing: overhead allocation, margins, and GST rollup")
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(quote_cmd())
        .subcommand(spec_cmd())
        .subcommand(item_cmd())
        .subcommand(import_cmd())
        .subcommand(costing_cmd())
        .subcommand(export_cmd())
        .subcommand(settings_cmd())
        .subcommand(Command::new("doctor").about("Check quotations for inconsistencies"))
}
