use std::fs;
use std::io::Read;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use valfmt::value::convert::from_json;
use valfmt::{format_with, FormatOptions, StyleKind};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let matches = Command::new("valfmt")
        .about("Render a JSON value in a stable, human-readable form")
        .arg(
            Arg::new("input")
                .help("Input JSON file, or - for stdin")
                .default_value("-")
                .index(1),
        )
        .arg(
            Arg::new("style")
                .long("style")
                .help("Output dialect: pretty or diff")
                .default_value("pretty"),
        )
        .arg(
            Arg::new("sort")
                .long("sort")
                .help("Sort record entries alphabetically by key")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("indent")
                .long("indent")
                .help("Indentation unit")
                .default_value("  "),
        )
        .arg(
            Arg::new("chunk-size")
                .long("chunk-size")
                .help("Byte-blob chunk size override")
                .value_parser(clap::value_parser!(usize)),
        )
        .get_matches();

    let input = matches
        .get_one::<String>("input")
        .map(String::as_str)
        .unwrap_or("-");
    let json_content = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(input).with_context(|| format!("failed to read {input}"))?
    };

    let json: serde_json::Value =
        serde_json::from_str(&json_content).context("input is not valid JSON")?;
    debug!(bytes = json_content.len(), "parsed input document");

    let style_name = matches
        .get_one::<String>("style")
        .map(String::as_str)
        .unwrap_or("pretty");
    let options = FormatOptions {
        style: StyleKind::from_str(style_name)?,
        sort: matches.get_flag("sort"),
        chunk_size: matches.get_one::<usize>("chunk-size").copied(),
        indent: matches
            .get_one::<String>("indent")
            .cloned()
            .unwrap_or_else(|| "  ".to_string()),
        ..FormatOptions::default()
    };

    let subject = from_json(&json);
    println!("{}", format_with(&subject, options));

    Ok(())
}
