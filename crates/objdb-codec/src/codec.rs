use std::collections::BTreeMap;
use std::sync::Arc;

use objdb_schema::{ClassDescriptor, SchemaRegistry};
use objdb_types::{ClassTag, FieldIndex, Record};
use tracing::trace;

use crate::error::{CodecError, CodecResult, CorruptReason, SchemaResolutionFailure};
use crate::wire::{put_u16, put_value, WireReader};

/// Size of the fixed `class_tag` + `field_count` header.
const HEADER_LEN: usize = 4;

/// Encodes records to bytes and decodes them back against a schema registry.
#[derive(Clone)]
pub struct RecordCodec {
    schema: Arc<dyn SchemaRegistry>,
}

impl RecordCodec {
    pub fn new(schema: Arc<dyn SchemaRegistry>) -> Self {
        Self { schema }
    }

    /// Check that the record's class and every field index resolve.
    pub fn validate(&self, record: &Record) -> Result<(), SchemaResolutionFailure> {
        let class = self.resolve_class(record.class_tag)?;
        for &index in record.fields.keys() {
            resolve_field(class, index)?;
        }
        Ok(())
    }

    /// Encode a record.
    ///
    /// Fields are written in ascending index order. Only size limits are
    /// checked here; use [`validate`](Self::validate) for schema checks.
    pub fn encode(&self, record: &Record) -> CodecResult<Vec<u8>> {
        let count = u16::try_from(record.fields.len())
            .map_err(|_| CodecError::TooManyFields(record.fields.len()))?;

        let body: usize = record.fields.values().map(|v| 4 + v.len()).sum();
        let mut buf = Vec::with_capacity(HEADER_LEN + body);
        put_u16(&mut buf, record.class_tag.0);
        put_u16(&mut buf, count);

        for (&index, value) in &record.fields {
            if value.len() > usize::from(u16::MAX) {
                return Err(CodecError::ValueTooLong {
                    field: index,
                    len: value.len(),
                });
            }
            put_u16(&mut buf, index.0);
            put_value(&mut buf, value);
        }

        trace!(class = %record.class_tag, fields = count, len = buf.len(), "record encoded");
        Ok(buf)
    }

    /// Decode a record, resolving every reference through the registry.
    ///
    /// Nothing is returned unless the whole buffer decodes cleanly.
    pub fn decode(&self, bytes: &[u8]) -> CodecResult<Record> {
        let mut reader = WireReader::new(bytes);
        let (Some(tag), Some(count)) = (reader.read_u16(), reader.read_u16()) else {
            return Err(CorruptReason::TruncatedHeader(bytes.len()).into());
        };
        let class_tag = ClassTag(tag);
        let class = self.resolve_class(class_tag)?;

        let mut fields = BTreeMap::new();
        for position in 0..count {
            let truncated = CorruptReason::TruncatedField { position, count };
            let index = FieldIndex(reader.read_u16().ok_or(truncated.clone())?);
            resolve_field(class, index)?;
            let value = reader.read_value().ok_or(truncated)?;
            if fields.insert(index, value.to_vec()).is_some() {
                return Err(CorruptReason::DuplicateField(index).into());
            }
        }

        if reader.remaining() > 0 {
            return Err(CorruptReason::TrailingBytes(reader.remaining()).into());
        }

        Ok(Record { class_tag, fields })
    }

    fn resolve_class(&self, tag: ClassTag) -> Result<&ClassDescriptor, SchemaResolutionFailure> {
        self.schema
            .resolve_class(tag)
            .ok_or(SchemaResolutionFailure::UnknownClass(tag))
    }
}

fn resolve_field(
    class: &ClassDescriptor,
    index: FieldIndex,
) -> Result<(), SchemaResolutionFailure> {
    match class.resolve_field(index) {
        Some(_) => Ok(()),
        None => Err(SchemaResolutionFailure::UnknownField {
            class: class.tag,
            field: index,
        }),
    }
}

impl std::fmt::Debug for RecordCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordCodec")
            .field("classes", &self.schema.class_tags().len())
            .finish()
    }
}
