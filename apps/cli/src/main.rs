//! `fieldmap`: run mapping specs over JSON and XML documents.
//!
//! Usage:
//!   fieldmap map --spec mapping.yaml --source crm=customer.json --source order.xml --target-format xml
//!   fieldmap inspect customer.json
//!   fieldmap parse-path '/ns:orders/order<2>/@id'

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use config::SourceArg;
use fieldmap_document::DocumentFormat;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[clap(name = "fieldmap", version)]
#[clap(about = "Map fields between JSON and XML documents")]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[clap(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines
    #[clap(long, global = true)]
    log_json: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a mapping spec over one or more source documents
    Map(MapArgs),
    /// Print the field tree discovered in a document
    Inspect {
        file: PathBuf,
        #[clap(long, value_parser = parse_format)]
        format: Option<DocumentFormat>,
    },
    /// Parse a path expression and print its segments
    ParsePath { path: String },
}

#[derive(Args, Debug)]
pub struct MapArgs {
    /// Mapping spec (YAML or JSON)
    #[clap(short, long)]
    pub spec: PathBuf,

    /// Source document as ID=PATH, or PATH (id = file stem); repeatable
    #[clap(short = 'i', long = "source", required = true)]
    pub sources: Vec<SourceArg>,

    /// Format of the sources when their extension does not tell
    #[clap(long, value_parser = parse_format)]
    pub source_format: Option<DocumentFormat>,

    /// Format of a fresh target document
    #[clap(short = 't', long, value_parser = parse_format, default_value = "json")]
    pub target_format: DocumentFormat,

    /// Existing document to write into instead of a fresh one
    #[clap(long)]
    pub target: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// Engine configuration (YAML or JSON)
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Extra output namespace as PREFIX=URI; repeatable
    #[clap(long = "namespace", value_parser = parse_namespace)]
    pub namespaces: Vec<(String, String)>,

    /// Print diagnostics as JSON
    #[clap(long)]
    pub diagnostics_json: bool,

    /// Exit with status 2 when any error diagnostic was reported
    #[clap(long)]
    pub strict: bool,
}

fn parse_format(s: &str) -> std::result::Result<DocumentFormat, String> {
    s.parse().map_err(|e: fieldmap_document::DocumentError| e.to_string())
}

fn parse_namespace(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((prefix, uri)) if !prefix.is_empty() && !uri.is_empty() => {
            Ok((prefix.to_string(), uri.to_string()))
        }
        _ => Err(format!("invalid namespace '{}', expected PREFIX=URI", s)),
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_logging(&logging::LoggingOptions {
        level: &cli.log_level,
        json: cli.log_json,
    })?;

    match cli.command {
        Command::Map(args) => commands::map(args),
        Command::Inspect { file, format } => commands::inspect(&file, format),
        Command::ParsePath { path } => commands::parse_path(&path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_map_args() {
        let cli = Cli::parse_from([
            "fieldmap",
            "map",
            "--spec",
            "m.yaml",
            "-i",
            "crm=c.json",
            "-i",
            "o.xml",
            "-t",
            "xml",
            "--namespace",
            "p=urn:p",
            "--strict",
        ]);
        let Command::Map(args) = cli.command else {
            panic!("expected map");
        };
        assert_eq!(args.sources.len(), 2);
        assert_eq!(args.sources[1].id, "o");
        assert_eq!(args.target_format, DocumentFormat::Xml);
        assert_eq!(args.namespaces, vec![("p".to_string(), "urn:p".to_string())]);
        assert!(args.strict);
    }

    #[test]
    fn test_bad_namespace() {
        assert!(parse_namespace("p").is_err());
        assert!(parse_namespace("=urn").is_err());
    }
}
