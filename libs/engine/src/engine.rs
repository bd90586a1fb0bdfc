//! Mapping engine entry point
//!
//! The engine is built once and shared. It compiles [`MappingSpec`]s into
//! [`MappingPlan`]s and executes plans against source documents. All per-pass
//! state lives in a short-lived run, so one engine (and one plan) can serve
//! concurrent passes.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::outcome::MappingOutcome;
use crate::plan::{MappingPlan, PlannedField, PlannedMapping};
use crate::run::MappingRun;
use fieldmap_conversion::TypeConversionRegistry;
use fieldmap_document::{Document, DocumentFormat};
use fieldmap_model::{Field, Mapping, MappingSpec};
use fieldmap_path::PathExpression;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

/// A named input document.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub id: String,
    pub document: Document,
}

impl SourceDocument {
    pub fn new(id: impl Into<String>, document: Document) -> Self {
        Self {
            id: id.into(),
            document,
        }
    }
}

/// Where a pass writes: a fresh document of some format, or an existing one.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Format(DocumentFormat),
    Document(Document),
}

impl From<DocumentFormat> for Target {
    fn from(format: DocumentFormat) -> Self {
        Self::Format(format)
    }
}

impl From<Document> for Target {
    fn from(document: Document) -> Self {
        Self::Document(document)
    }
}

pub struct MappingEngine {
    registry: Arc<TypeConversionRegistry>,
    config: EngineConfig,
    /// Parsed paths by source text
    path_cache: Arc<Mutex<LruCache<String, PathExpression>>>,
}

impl MappingEngine {
    pub fn new(registry: Arc<TypeConversionRegistry>) -> Self {
        let config = EngineConfig::default();
        Self {
            registry,
            path_cache: Arc::new(Mutex::new(LruCache::new(cache_capacity(&config)))),
            config,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.path_cache = Arc::new(Mutex::new(LruCache::new(cache_capacity(&config))));
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<TypeConversionRegistry> {
        &self.registry
    }

    /// Compile a spec into a reusable plan.
    ///
    /// Every field path is parsed here; a malformed path fails the whole
    /// compilation. Shape problems do not: they are recorded on the mapping
    /// and reported when the plan runs.
    pub fn compile(&self, spec: &MappingSpec) -> Result<MappingPlan> {
        let mut namespaces = self.config.namespaces.clone();
        namespaces.extend(spec.namespaces.clone());

        let mappings = spec
            .mappings
            .iter()
            .enumerate()
            .map(|(i, m)| self.compile_mapping(m, (i + 1).to_string()))
            .collect::<Result<Vec<_>>>()?;

        let plan = MappingPlan {
            name: spec.name.clone(),
            mappings,
            lookup_tables: spec.lookup_tables.clone(),
            namespaces,
        };
        tracing::debug!(
            name = ?plan.name,
            mappings = plan.mapping_count(),
            invalid = plan.invalid_mappings().len(),
            "mapping plan compiled"
        );
        Ok(plan)
    }

    /// Run `plan` over `sources`, writing into `target`.
    ///
    /// Field-level problems end up in the outcome's diagnostics. Only
    /// missing or duplicate sources, and documents of the wrong format, are
    /// errors.
    pub fn execute(
        &self,
        plan: &MappingPlan,
        sources: &[SourceDocument],
        target: impl Into<Target>,
    ) -> Result<MappingOutcome> {
        if sources.is_empty() {
            return Err(EngineError::InvalidArgument(
                "at least one source document is required".into(),
            ));
        }
        for (i, source) in sources.iter().enumerate() {
            if sources[..i].iter().any(|other| other.id == source.id) {
                return Err(EngineError::InvalidArgument(format!(
                    "duplicate source document id '{}'",
                    source.id
                )));
            }
        }

        tracing::debug!(
            sources = sources.len(),
            mappings = plan.mapping_count(),
            "executing mapping plan"
        );
        let outcome =
            MappingRun::new(plan, &self.registry, &self.config, sources, target.into()).execute()?;
        tracing::debug!(
            errors = outcome.error_count(),
            warnings = outcome.warning_count(),
            "mapping pass finished"
        );
        Ok(outcome)
    }

    /// Compile and execute in one step.
    pub fn process(
        &self,
        spec: &MappingSpec,
        sources: &[SourceDocument],
        target: impl Into<Target>,
    ) -> Result<MappingOutcome> {
        let plan = self.compile(spec)?;
        self.execute(&plan, sources, target)
    }

    fn compile_mapping(&self, mapping: &Mapping, position: String) -> Result<PlannedMapping> {
        let children = mapping
            .mappings
            .iter()
            .enumerate()
            .map(|(i, child)| self.compile_mapping(child, format!("{}.{}", position, i + 1)))
            .collect::<Result<Vec<_>>>()?;

        let mut planned = PlannedMapping {
            label: mapping.id.clone().unwrap_or(position),
            mapping_type: mapping.mapping_type,
            inputs: self.compile_fields(&mapping.input_fields)?,
            outputs: self.compile_fields(&mapping.output_fields)?,
            lookup_table: mapping.lookup_table_name.clone(),
            delimiter: mapping.delimiter.clone(),
            collection_type: mapping.collection_type,
            collection_size: mapping.collection_size,
            children,
            invalid: None,
        };
        planned.invalid = planned.shape_error().or_else(|| self.index_error(&planned));
        Ok(planned)
    }

    /// Explicit output indexes pad the target up to the index, so they are
    /// held to the same limit as collection cardinality.
    fn index_error(&self, mapping: &PlannedMapping) -> Option<String> {
        let limit = self.config.max_collection_size;
        mapping.outputs.iter().find_map(|field| {
            field
                .path
                .segments()
                .filter_map(|seg| seg.index)
                .find(|index| *index >= limit)
                .map(|index| {
                    format!(
                        "output '{}' index {} exceeds the collection limit of {}",
                        field.path, index, limit
                    )
                })
        })
    }

    fn compile_fields(&self, fields: &[Field]) -> Result<Vec<PlannedField>> {
        fields
            .iter()
            .map(|field| {
                Ok(PlannedField {
                    path: self.parse_path(&field.path)?,
                    field_type: field.field_type,
                    doc_id: field.doc_id.clone(),
                    index: field.index,
                    actions: field.actions.clone(),
                })
            })
            .collect()
    }

    fn parse_path(&self, path: &str) -> Result<PathExpression> {
        let mut cache = self.path_cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(parsed) = cache.get(path) {
            return Ok(parsed.clone());
        }
        let parsed = PathExpression::parse(path)?;
        cache.put(path.to_string(), parsed.clone());
        Ok(parsed)
    }
}

fn cache_capacity(config: &EngineConfig) -> NonZeroUsize {
    NonZeroUsize::new(config.path_cache_size).unwrap_or(NonZeroUsize::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmap_model::MappingType;

    fn engine() -> MappingEngine {
        MappingEngine::new(Arc::new(TypeConversionRegistry::new()))
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MappingEngine>();
        assert_send_sync::<MappingPlan>();
    }

    #[test]
    fn test_compile_labels_and_namespaces() {
        let spec = MappingSpec::new(vec![
            Mapping::map(Field::new("/a"), Field::new("/b")),
            Mapping::collection(
                fieldmap_model::CollectionType::List,
                vec![Mapping::map(Field::new("/x<>/y"), Field::new("/z<>/y"))],
            )
            .with_id("lines"),
        ])
        .with_namespace("p", "urn:spec");

        let mut config = EngineConfig::default();
        config.namespaces.insert("p".into(), "urn:config".into());
        config.namespaces.insert("q".into(), "urn:q".into());
        let plan = engine().with_config(config).compile(&spec).unwrap();

        assert_eq!(plan.mappings[0].label, "1");
        assert_eq!(plan.mappings[1].label, "lines");
        assert_eq!(plan.mappings[1].children[0].label, "2.1");
        assert_eq!(plan.mapping_count(), 3);
        assert_eq!(plan.namespaces["p"], "urn:spec");
        assert_eq!(plan.namespaces["q"], "urn:q");
    }

    #[test]
    fn test_compile_rejects_malformed_path() {
        let spec = MappingSpec::new(vec![Mapping::map(Field::new("/a//b"), Field::new("/b"))]);
        let err = engine().compile(&spec).unwrap_err();
        assert!(matches!(err, EngineError::MalformedPath(_)));
    }

    #[test]
    fn test_compile_records_bad_shapes() {
        let mut bad = Mapping::map(Field::new("/a"), Field::new("/b"));
        bad.mapping_type = MappingType::Lookup;
        let spec = MappingSpec::new(vec![bad]);
        let plan = engine().compile(&spec).unwrap();
        assert_eq!(plan.invalid_mappings().len(), 1);
    }

    #[test]
    fn test_compile_bounds_explicit_output_index() {
        let engine = engine().with_config(EngineConfig {
            max_collection_size: 3,
            ..Default::default()
        });
        let spec = MappingSpec::new(vec![
            Mapping::map(Field::new("/items[7]/a"), Field::new("/out[2]/a")),
            Mapping::map(Field::new("/a"), Field::new("/out[3]/a")),
        ]);
        let plan = engine.compile(&spec).unwrap();

        assert!(plan.mappings[0].invalid.is_none());
        let reason = plan.mappings[1].invalid.as_deref().unwrap();
        assert!(reason.contains("index 3"));
    }

    #[test]
    fn test_path_cache_reuse() {
        let engine = engine().with_config(EngineConfig {
            path_cache_size: 2,
            ..Default::default()
        });
        let first = engine.parse_path("/a/b<>").unwrap();
        let second = engine.parse_path("/a/b<>").unwrap();
        assert_eq!(first, second);
        assert_eq!(engine.path_cache.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_execute_requires_sources() {
        let plan = engine().compile(&MappingSpec::default()).unwrap();
        let err = engine().execute(&plan, &[], DocumentFormat::Json).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }
}
