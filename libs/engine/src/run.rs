use crate::config::EngineConfig;
use crate::engine::{SourceDocument, Target};
use crate::error::Result;
use crate::outcome::MappingOutcome;
use crate::plan::{MappingPlan, PlannedField, PlannedMapping};
use fieldmap_conversion::{actions, Conversion, TypeConversionRegistry};
use fieldmap_document::{
    accessor_for, Document, DocumentAccessor, DocumentFormat, JsonAccessor, XmlAccessor,
};
use fieldmap_model::{
    ConversionConcern, Diagnostic, DiagnosticCode, FieldType, FieldValue, MappingType, Value,
};
use fieldmap_path::PathExpression;
use std::collections::HashSet;

/// Short-lived mapping execution
///
/// Owns the accessors and the target document for one pass over a plan.
pub(crate) struct MappingRun<'a> {
    plan: &'a MappingPlan,
    registry: &'a TypeConversionRegistry,
    config: &'a EngineConfig,
    sources: &'a [SourceDocument],
    json: JsonAccessor,
    xml: XmlAccessor,
    writer: Box<dyn DocumentAccessor>,
    target: Option<Document>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> MappingRun<'a> {
    pub(crate) fn new(
        plan: &'a MappingPlan,
        registry: &'a TypeConversionRegistry,
        config: &'a EngineConfig,
        sources: &'a [SourceDocument],
        target: Target,
    ) -> Self {
        let (format, target) = match target {
            Target::Format(format) => (format, None),
            Target::Document(doc) => (doc.format(), Some(doc)),
        };
        Self {
            plan,
            registry,
            config,
            sources,
            json: JsonAccessor::new(),
            xml: XmlAccessor::new(),
            writer: accessor_for(format, &plan.namespaces),
            target,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn execute(mut self) -> Result<MappingOutcome> {
        let plan = self.plan;
        for invalid in plan.invalid_mappings() {
            let reason = invalid.invalid.clone().unwrap_or_default();
            tracing::debug!(mapping = %invalid.label, %reason, "skipping invalid mapping");
            self.report(invalid, Diagnostic::error(DiagnosticCode::InvalidMapping, reason));
        }

        for mapping in &plan.mappings {
            self.run_mapping(mapping, false)?;
        }

        Ok(MappingOutcome {
            document: self.target,
            diagnostics: self.diagnostics,
        })
    }

    fn run_mapping(&mut self, mapping: &PlannedMapping, in_collection: bool) -> Result<()> {
        if mapping.invalid.is_some() {
            return Ok(());
        }
        tracing::debug!(mapping = %mapping.label, kind = %mapping.mapping_type, "running mapping");

        match mapping.mapping_type {
            MappingType::Map => self.run_map(mapping, in_collection),
            MappingType::Combine => self.run_combine(mapping, in_collection),
            MappingType::Separate => self.run_separate(mapping, in_collection),
            MappingType::Lookup => self.run_lookup(mapping, in_collection),
            MappingType::Collection => self.run_collection(mapping),
        }
    }

    fn run_map(&mut self, mapping: &PlannedMapping, in_collection: bool) -> Result<()> {
        let (Some(input), Some(output)) = (mapping.inputs.first(), mapping.outputs.first()) else {
            return Ok(());
        };
        if let Some(value) = self.read_input(mapping, input, in_collection)? {
            self.write_output(mapping, output, value)?;
        }
        Ok(())
    }

    fn run_combine(&mut self, mapping: &PlannedMapping, in_collection: bool) -> Result<()> {
        let Some(output) = mapping.outputs.first() else {
            return Ok(());
        };

        let mut ordered: Vec<(usize, &PlannedField)> = mapping
            .inputs
            .iter()
            .enumerate()
            .map(|(position, field)| (field.index.unwrap_or(position), field))
            .collect();
        ordered.sort_by_key(|(index, _)| *index);

        let mut parts = Vec::with_capacity(ordered.len());
        for (_, field) in ordered {
            let Some(value) = self.read_input(mapping, field, in_collection)? else {
                continue;
            };
            if let Some(text) = self.to_text(mapping, field, &value) {
                parts.push(text);
            }
        }

        if parts.is_empty() {
            tracing::trace!(mapping = %mapping.label, "nothing to combine");
            return Ok(());
        }
        let joined = parts.join(mapping.delimiter.as_deref().unwrap_or(""));
        self.write_output(mapping, output, Value::String(joined))
    }

    fn run_separate(&mut self, mapping: &PlannedMapping, in_collection: bool) -> Result<()> {
        let Some(input) = mapping.inputs.first() else {
            return Ok(());
        };
        let Some(value) = self.read_input(mapping, input, in_collection)? else {
            return Ok(());
        };
        let Some(text) = self.to_text(mapping, input, &value) else {
            return Ok(());
        };

        let delimiter = mapping
            .delimiter
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(" ");
        let tokens: Vec<&str> = text.split(delimiter).collect();

        for (position, output) in mapping.outputs.iter().enumerate() {
            let index = output.index.unwrap_or(position);
            match tokens.get(index) {
                Some(token) => self.write_output(mapping, output, Value::from(*token))?,
                None => tracing::trace!(
                    mapping = %mapping.label,
                    index,
                    tokens = tokens.len(),
                    "no token for output"
                ),
            }
        }
        Ok(())
    }

    fn run_lookup(&mut self, mapping: &PlannedMapping, in_collection: bool) -> Result<()> {
        let (Some(input), Some(output), Some(name)) = (
            mapping.inputs.first(),
            mapping.outputs.first(),
            mapping.lookup_table.as_deref(),
        ) else {
            return Ok(());
        };

        let plan = self.plan;
        let Some(table) = plan.lookup_table(name) else {
            self.report(
                mapping,
                Diagnostic::error(
                    DiagnosticCode::LookupTableNotFound,
                    format!("lookup table '{}' is not defined", name),
                ),
            );
            return Ok(());
        };

        let Some(value) = self.read_input(mapping, input, in_collection)? else {
            return Ok(());
        };
        let Some(key) = self.to_text(mapping, input, &value) else {
            return Ok(());
        };
        let Some(entry) = table.find(&key) else {
            tracing::trace!(mapping = %mapping.label, table = name, %key, "lookup miss");
            return Ok(());
        };

        let conversion = self
            .registry
            .convert(&Value::String(entry.target_value.clone()), Some(entry.target_type));
        match conversion.value {
            Some(value) => self.write_output(mapping, output, value),
            None => {
                self.unsupported(mapping, &output.path, &conversion);
                Ok(())
            }
        }
    }

    fn run_collection(&mut self, mapping: &PlannedMapping) -> Result<()> {
        let mut cardinality = mapping.collection_size.unwrap_or(0);
        for field in mapping.all_inputs() {
            cardinality = cardinality.max(self.source_count(field)?);
        }

        let limit = self.config.max_collection_size;
        if cardinality > limit {
            tracing::warn!(mapping = %mapping.label, cardinality, limit, "collection clamped");
            self.report(
                mapping,
                Diagnostic::warning(
                    DiagnosticCode::CollectionLimit,
                    format!("collection of {} items clamped to {}", cardinality, limit),
                ),
            );
            cardinality = limit;
        }
        tracing::debug!(mapping = %mapping.label, cardinality, "expanding collection");

        for index in 0..cardinality {
            for child in &mapping.children {
                self.run_mapping(&child.for_iteration(index), true)?;
            }
        }

        if cardinality > 0 {
            self.pad_outputs(mapping, cardinality)?;
        }
        Ok(())
    }

    /// Grow every output collection of `mapping` to `cardinality` entries.
    fn pad_outputs(&mut self, mapping: &PlannedMapping, cardinality: usize) -> Result<()> {
        let mut seen = HashSet::new();
        for field in mapping.all_outputs() {
            let Some((position, _)) = field.path.first_unindexed_collection() else {
                continue;
            };
            let collection = field.path.truncate(position + 1);
            if !seen.insert(collection.to_string()) {
                continue;
            }

            let present = match &self.target {
                Some(doc) => self
                    .writer
                    .collection_count(doc, &field.path, position)?,
                None => 0,
            };
            if present < cardinality {
                tracing::trace!(collection = %collection, present, cardinality, "padding collection");
                let placeholder =
                    FieldValue::new(collection.with_index(position, cardinality - 1));
                self.write(mapping, &placeholder)?;
            }
        }
        Ok(())
    }

    fn source_count(&self, field: &PlannedField) -> Result<usize> {
        let Some((position, _)) = field.path.first_unindexed_collection() else {
            return Ok(0);
        };
        let Some(source) = self.source_for(field.doc_id.as_deref()) else {
            return Ok(0);
        };
        let count = self.reader(source.document.format()).collection_count(
            &source.document,
            &field.path,
            position,
        )?;
        Ok(count)
    }

    /// Read one input: resolve, coerce to its declared type, run its actions.
    ///
    /// `None` means there is nothing to map, either because the path did not
    /// resolve or because the value was refused (already reported).
    fn read_input(
        &mut self,
        mapping: &PlannedMapping,
        field: &PlannedField,
        in_collection: bool,
    ) -> Result<Option<Value>> {
        let Some(source) = self.source_for(field.doc_id.as_deref()) else {
            let id = field.doc_id.as_deref().unwrap_or_default();
            self.report(
                mapping,
                Diagnostic::error(
                    DiagnosticCode::UnknownDocument,
                    format!("no source document with id '{}'", id),
                )
                .with_path(&field.path),
            );
            return Ok(None);
        };

        let mut value = field.value();
        self.reader(source.document.format())
            .read(&source.document, &mut value)?;

        match (value.value.take(), field.field_type) {
            (None, _) => {
                tracing::trace!(mapping = %mapping.label, path = %field.path, "input unresolved");
                if !in_collection && self.config.report_unresolved_paths {
                    self.report(
                        mapping,
                        Diagnostic::information(
                            DiagnosticCode::UnresolvedPath,
                            "input path resolved to no value",
                        )
                        .with_path(&field.path),
                    );
                }
            }
            (Some(raw), Some(declared)) => {
                let conversion = self.registry.convert(&raw, Some(declared));
                if conversion.concern == ConversionConcern::Unsupported {
                    self.unsupported(mapping, &field.path, &conversion);
                    return Ok(None);
                }
                value.value = conversion.value;
            }
            (Some(raw), None) => value.value = Some(raw),
        }

        let value = actions::apply(&field.actions, value);
        Ok(value.value)
    }

    /// Convert `value` to the output's declared type, run its actions and
    /// write it.
    fn write_output(
        &mut self,
        mapping: &PlannedMapping,
        field: &PlannedField,
        value: Value,
    ) -> Result<()> {
        let source = value.field_type();
        let conversion = self.registry.convert(&value, field.field_type);
        match conversion.concern {
            ConversionConcern::Unsupported => {
                self.unsupported(mapping, &field.path, &conversion);
                return Ok(());
            }
            ConversionConcern::Range | ConversionConcern::Format => {
                let target = field.field_type.unwrap_or(source);
                tracing::warn!(
                    mapping = %mapping.label,
                    path = %field.path,
                    %source,
                    %target,
                    concern = %conversion.concern,
                    "lossy conversion"
                );
                let (code, message) = if conversion.concern == ConversionConcern::Range {
                    (
                        DiagnosticCode::ConversionRange,
                        format!("{} to {} may not preserve the value", source, target),
                    )
                } else {
                    (
                        DiagnosticCode::ConversionFormat,
                        format!("{} to {} depends on the value's format", source, target),
                    )
                };
                self.report(
                    mapping,
                    Diagnostic::warning(code, message).with_path(&field.path),
                );
            }
            ConversionConcern::None => {}
        }

        let mut out = field.value();
        out.value = conversion.value;
        let out = actions::apply(&field.actions, out);
        if out.is_null() {
            return Ok(());
        }
        tracing::trace!(mapping = %mapping.label, path = %out.path, "writing output");
        self.write(mapping, &out)
    }

    fn write(&mut self, mapping: &PlannedMapping, field: &FieldValue) -> Result<()> {
        let document = self.writer.write(field, self.target.take())?;
        self.target = Some(document);
        for issue in self.writer.take_issues() {
            self.diagnostics.push(issue.with_mapping(mapping.label.clone()));
        }
        Ok(())
    }

    /// STRING form of a value for COMBINE, SEPARATE and LOOKUP keys.
    fn to_text(
        &mut self,
        mapping: &PlannedMapping,
        field: &PlannedField,
        value: &Value,
    ) -> Option<String> {
        let conversion = self.registry.convert(value, Some(FieldType::String));
        match conversion.value {
            Some(Value::String(text)) => Some(text),
            Some(other) => Some(other.to_string()),
            None => {
                self.unsupported(mapping, &field.path, &conversion);
                None
            }
        }
    }

    fn unsupported(
        &mut self,
        mapping: &PlannedMapping,
        path: &PathExpression,
        conversion: &Conversion,
    ) {
        let reason = conversion
            .reason
            .clone()
            .unwrap_or_else(|| "conversion not supported".to_string());
        tracing::debug!(mapping = %mapping.label, %path, %reason, "field skipped");
        self.report(
            mapping,
            Diagnostic::error(DiagnosticCode::UnsupportedConversion, reason).with_path(path),
        );
    }

    fn report(&mut self, mapping: &PlannedMapping, diagnostic: Diagnostic) {
        self.diagnostics
            .push(diagnostic.with_mapping(mapping.label.clone()));
    }

    fn source_for(&self, doc_id: Option<&str>) -> Option<&'a SourceDocument> {
        let sources: &'a [SourceDocument] = self.sources;
        match doc_id {
            None => sources.first(),
            Some(id) => sources.iter().find(|s| s.id == id),
        }
    }

    fn reader(&self, format: DocumentFormat) -> &dyn DocumentAccessor {
        match format {
            DocumentFormat::Json => &self.json,
            DocumentFormat::Xml => &self.xml,
        }
    }
}
