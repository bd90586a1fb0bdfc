use crate::config;
use crate::MapArgs;
use anyhow::{Context, Result};
use fieldmap_conversion::TypeConversionRegistry;
use fieldmap_document::{DocumentFormat, InstanceSchemaProvider};
use fieldmap_engine::{MappingEngine, Target};
use fieldmap_model::SchemaProvider;
use fieldmap_path::PathExpression;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

pub fn map(args: MapArgs) -> Result<ExitCode> {
    let mut engine_config = config::load_config(args.config.as_deref())?;
    engine_config.namespaces.extend(args.namespaces);

    let spec = config::load_spec(&args.spec)?;
    let sources = args
        .sources
        .iter()
        .map(|source| source.load(args.source_format))
        .collect::<Result<Vec<_>>>()?;

    let engine =
        MappingEngine::new(Arc::new(TypeConversionRegistry::new())).with_config(engine_config);
    let plan = engine
        .compile(&spec)
        .with_context(|| format!("Failed to compile {}", args.spec.display()))?;

    let target = match &args.target {
        Some(path) => Target::from(config::load_document(path, None)?),
        None => Target::from(args.target_format),
    };
    let outcome = engine
        .execute(&plan, &sources, target)
        .context("Mapping failed")?;

    if args.diagnostics_json {
        eprintln!("{}", serde_json::to_string_pretty(&outcome.diagnostics)?);
    } else {
        for diagnostic in &outcome.diagnostics {
            eprintln!("{}", diagnostic);
        }
    }

    match &outcome.document {
        Some(document) => {
            let text = document.to_pretty_string()?;
            match &args.output {
                Some(path) => fs::write(path, text)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{}", text),
            }
        }
        None => tracing::warn!("mapping produced no document"),
    }

    tracing::info!(
        errors = outcome.error_count(),
        warnings = outcome.warning_count(),
        "mapping finished"
    );

    if args.strict && outcome.has_errors() {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

pub fn inspect(file: &Path, format: Option<DocumentFormat>) -> Result<ExitCode> {
    let document = config::load_document(file, format)?;
    let provider = InstanceSchemaProvider::new(document);
    match provider.describe() {
        Some(descriptor) => println!("{}", serde_json::to_string_pretty(&descriptor)?),
        None => println!("null"),
    }
    Ok(ExitCode::SUCCESS)
}

pub fn parse_path(path: &str) -> Result<ExitCode> {
    let parsed = PathExpression::parse(path).with_context(|| format!("Invalid path '{}'", path))?;
    let segments: Vec<_> = parsed
        .segments()
        .map(|s| {
            json!({
                "name": s.name,
                "prefix": s.prefix,
                "collection": format!("{:?}", s.collection).to_lowercase(),
                "index": s.index,
                "attribute": s.attribute,
            })
        })
        .collect();
    let out = json!({ "path": parsed.to_string(), "segments": segments });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(ExitCode::SUCCESS)
}
