//! Record codec: typed values to generic records and back

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::asset::AssetCodec;
use crate::mapping::{construct, FieldKind, FieldSet, FieldSpec, FieldValue, Mapped};
use crate::observability::{Event, Logger, MappingMetrics};
use crate::record::{AssetHandle, GenericRecord, RecordValue, Reference};
use crate::resolver::ReferenceResolver;

/// An encoded record plus the embedded records it references
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRecord {
    pub record: GenericRecord,
    /// Embedded records, deepest first; save these before `record`
    pub children: Vec<GenericRecord>,
}

/// Bidirectional mapping between mapped types and generic records
#[derive(Clone)]
pub struct RecordCodec {
    assets: AssetCodec,
    resolver: ReferenceResolver,
    metrics: Arc<MappingMetrics>,
}

impl RecordCodec {
    pub fn new(assets: AssetCodec, resolver: ReferenceResolver, metrics: Arc<MappingMetrics>) -> Self {
        Self {
            assets,
            resolver,
            metrics,
        }
    }

    pub fn assets(&self) -> &AssetCodec {
        &self.assets
    }

    pub fn resolver(&self) -> &ReferenceResolver {
        &self.resolver
    }

    pub fn metrics(&self) -> &Arc<MappingMetrics> {
        &self.metrics
    }

    /// Encode every declared field of `item`
    ///
    /// Never fails: fields that cannot be converted are omitted, logged and
    /// counted in `fields_dropped`.
    pub fn encode<T: Mapped>(&self, item: &T) -> EncodedRecord {
        self.encode_fields(item.to_fields(), T::schema().specs())
    }

    /// Encode a field set against its declared layout
    pub fn encode_fields(&self, fields: FieldSet, layout: &[FieldSpec]) -> EncodedRecord {
        let (record_type, id, values) = fields.into_parts();
        let mut record = match id {
            Some(id) => GenericRecord::with_id(record_type, id),
            None => GenericRecord::new(record_type),
        };
        let mut children = Vec::new();

        for (name, value) in values {
            let Some(spec) = layout.iter().find(|spec| spec.name == name) else {
                self.field_dropped(record.record_type(), &name, "field is not declared");
                continue;
            };
            match self.encode_value(spec, value, &mut children) {
                Ok(encoded) => record.set(name, encoded),
                Err(reason) => self.field_dropped(record.record_type(), &name, &reason),
            }
        }

        self.metrics.increment_records_encoded();
        EncodedRecord { record, children }
    }

    fn encode_value(
        &self,
        spec: &FieldSpec,
        value: FieldValue,
        children: &mut Vec<GenericRecord>,
    ) -> Result<RecordValue, String> {
        if !spec.kind.accepts(&value) {
            return Err(format!("value does not fit {} field", spec.kind.name()));
        }

        let encoded = match (spec.kind, value) {
            (_, FieldValue::Null) => RecordValue::Null,
            (_, FieldValue::File(path)) => {
                let handle = self.assets.stage_file(&path).map_err(|e| e.to_string())?;
                self.asset_staged(spec, &handle);
                RecordValue::Asset(handle)
            }
            (_, FieldValue::Bytes(blob)) => {
                let handle = self.assets.to_asset(&blob).map_err(|e| e.to_string())?;
                self.asset_staged(spec, &handle);
                RecordValue::Asset(handle)
            }
            (FieldKind::Embedded(layout), FieldValue::Embedded(item)) => {
                let (encoded, reference) = self.resolver.to_reference(self, *item, layout().specs);
                collect_children(children, encoded);
                RecordValue::Reference(reference)
            }
            (FieldKind::EmbeddedList(layout), FieldValue::EmbeddedList(items)) => {
                let mut references = Vec::with_capacity(items.len());
                for item in items {
                    let (encoded, reference) = self.resolver.to_reference(self, item, layout().specs);
                    collect_children(children, encoded);
                    references.push(reference);
                }
                RecordValue::ReferenceList(references)
            }
            (_, FieldValue::Link(id)) => RecordValue::Reference(Reference::link(id)),
            (_, FieldValue::Bool(v)) => RecordValue::Bool(v),
            (_, FieldValue::Int(v)) => RecordValue::Int(v),
            (_, FieldValue::Double(v)) => RecordValue::Double(v),
            (_, FieldValue::Text(v)) => RecordValue::Text(v),
            (_, FieldValue::Date(v)) => RecordValue::Date(v),
            (kind, _) => return Err(format!("value does not fit {} field", kind.name())),
        };
        Ok(encoded)
    }

    fn asset_staged(&self, spec: &FieldSpec, handle: &AssetHandle) {
        self.metrics.increment_assets_staged();
        Logger::trace(
            Event::AssetStaged,
            &[("field", spec.name), ("path", handle.path.to_string_lossy().as_ref())],
        );
    }

    fn field_dropped(&self, record_type: &str, field: &str, reason: &str) {
        self.metrics.increment_fields_dropped();
        Logger::warn(
            Event::FieldDropped,
            &[("record_type", record_type), ("field", field), ("reason", reason)],
        );
    }

    /// Decode a record into `T`, resolving references through the store
    ///
    /// Returns `None` if a required field is missing or mistyped, or if `T`'s
    /// constructor rejects the fields. Callers treat that as "skip this record".
    pub async fn decode<T: Mapped>(&self, record: GenericRecord) -> Option<T> {
        let record_type = record.record_type().to_string();
        let id = record.id().map(|id| id.to_string()).unwrap_or_default();

        let fields = self.decode_fields(record, T::schema().specs()).await;
        match construct::<T>(fields) {
            Ok(item) => {
                self.metrics.increment_records_decoded();
                Some(item)
            }
            Err(failure) => {
                self.metrics.increment_decode_failures();
                Logger::warn(
                    Event::RecordDecodeFailed,
                    &[
                        ("record_type", record_type.as_str()),
                        ("id", id.as_str()),
                        ("reason", failure.reason().as_str()),
                    ],
                );
                None
            }
        }
    }

    /// Read every field of `layout` out of `record`
    ///
    /// Fields absent from the record are skipped; fields whose stored value does
    /// not fit the declared kind are left out for the constructor to judge.
    pub fn decode_fields<'a>(
        &'a self,
        record: GenericRecord,
        layout: &'static [FieldSpec],
    ) -> Pin<Box<dyn Future<Output = FieldSet> + Send + 'a>> {
        Box::pin(async move {
            let mut fields = FieldSet::new(record.record_type(), record.id().cloned());
            for spec in layout {
                let Some(value) = record.get(spec.name) else {
                    continue;
                };
                if let Some(decoded) = self.decode_value(spec, value).await {
                    fields.insert(spec.name, decoded);
                }
            }
            fields
        })
    }

    async fn decode_value(&self, spec: &FieldSpec, value: &RecordValue) -> Option<FieldValue> {
        match (spec.kind, value) {
            (_, RecordValue::Null) => Some(FieldValue::Null),
            (FieldKind::Bool, RecordValue::Bool(v)) => Some(FieldValue::Bool(*v)),
            (FieldKind::Int, RecordValue::Int(v)) => Some(FieldValue::Int(*v)),
            (FieldKind::Double, RecordValue::Double(v)) => Some(FieldValue::Double(*v)),
            (FieldKind::Double, RecordValue::Int(v)) => Some(FieldValue::Double(*v as f64)),
            (FieldKind::Text, RecordValue::Text(v)) => Some(FieldValue::Text(v.clone())),
            (FieldKind::Date, RecordValue::Date(v)) => Some(FieldValue::Date(*v)),
            (FieldKind::Bytes | FieldKind::File, RecordValue::Asset(handle)) => {
                match self.assets.from_asset(handle) {
                    Ok(blob) => Some(FieldValue::Bytes(blob)),
                    Err(e) => {
                        Logger::warn(
                            Event::AssetReadFailed,
                            &[("field", spec.name), ("reason", e.to_string().as_str())],
                        );
                        None
                    }
                }
            }
            (FieldKind::Link, RecordValue::Reference(reference)) => {
                Some(FieldValue::Link(reference.id.clone()))
            }
            (FieldKind::Embedded(layout), RecordValue::Reference(reference)) => self
                .resolver
                .resolve_reference(self, reference, layout())
                .await
                .map(|item| FieldValue::Embedded(Box::new(item))),
            (FieldKind::EmbeddedList(layout), RecordValue::ReferenceList(references)) => Some(
                FieldValue::EmbeddedList(
                    self.resolver
                        .resolve_references(self, references, layout())
                        .await,
                ),
            ),
            _ => None,
        }
    }
}

fn collect_children(children: &mut Vec<GenericRecord>, encoded: EncodedRecord) {
    children.extend(encoded.children);
    children.push(encoded.record);
}
