//! 🪶 Avro, the Confluent way: `0x00`, a big-endian schema id, then the binary datum.
//!
//! The registered schema is the contract, so the encoder is driven by it rather than by
//! our struct: every schema field is bound at startup to one of the record's fields
//! (exact name first, then ASCII case-insensitive), or to `null` when the field is
//! nullable and we have nothing for it. A required field we cannot fill, or a field whose
//! type we cannot produce, fails at startup instead of on the first record.
//!
//! Counters fit whatever numeric type the schema picked: `int`, `long`, `float`, `double`,
//! optionally wrapped in a `["null", T]` union. A count too big for an `int` is a
//! `YtxError::Format`, not a silent wrap-around.

use apache_avro::types::Value as AvroValue;
use apache_avro::{Schema, to_avro_datum};
use tracing::warn;

use super::schema_registry::RegisteredSchema;
use crate::common::{FieldValue, OutgoingRecord};
use crate::error::YtxError;

const MAGIC_BYTE: u8 = 0;

#[derive(Debug, Clone)]
enum Binding {
    /// Filled from `OutgoingRecord::fields()[index]`, encoded as `schema`.
    Ours { index: usize, schema: Schema },
    /// Nothing of ours maps here; the schema lets it be null.
    Null(AvroValue),
}

/// 🧬 Turns [`OutgoingRecord`]s into framed Avro bytes for one registered schema version.
#[derive(Debug)]
pub(crate) struct AvroRecordEncoder {
    subject: String,
    schema: Schema,
    schema_id: u32,
    bindings: Vec<(String, Binding)>,
}

impl AvroRecordEncoder {
    pub(crate) fn new(registered: &RegisteredSchema) -> Result<Self, YtxError> {
        let unusable = |reason: String| YtxError::SchemaRegistry {
            subject: registered.subject.clone(),
            reason,
            source: None,
        };

        if !registered.is_avro() {
            return Err(unusable(format!(
                "schema type {:?} is not AVRO",
                registered.schema_type
            )));
        }
        let schema = Schema::parse_str(&registered.schema)
            .map_err(|err| unusable(format!("schema does not parse as Avro: {err}")))?;
        let Schema::Record(record) = &schema else {
            return Err(unusable("value schema is not an Avro record".to_string()));
        };

        // 🧪 a throwaway record, only used to learn which kind of value each field holds
        let blank_record = OutgoingRecord {
            title: String::new(),
            views: 0,
            likes: 0,
            comments: 0,
        };
        let ours = blank_record.fields();

        let mut bindings = Vec::with_capacity(record.fields.len());
        let mut bound = [false; 4];
        for field in &record.fields {
            let position = ours
                .iter()
                .position(|(name, _)| *name == field.name)
                .or_else(|| {
                    ours.iter()
                        .position(|(name, _)| name.eq_ignore_ascii_case(&field.name))
                });

            let binding = match position {
                Some(index) => {
                    if convert(&field.schema, ours[index].1, &field.name)?.is_none() {
                        return Err(unusable(format!(
                            "field '{}' has a type we cannot produce: {:?}",
                            field.name, field.schema
                        )));
                    }
                    bound[index] = true;
                    Binding::Ours {
                        index,
                        schema: field.schema.clone(),
                    }
                }
                None => match null_for(&field.schema) {
                    Some(null) => {
                        warn!("🪶 schema field '{}' has no counterpart, publishing null", field.name);
                        Binding::Null(null)
                    }
                    None => {
                        return Err(unusable(format!(
                            "required field '{}' has no counterpart in the published record",
                            field.name
                        )));
                    }
                },
            };
            bindings.push((field.name.clone(), binding));
        }

        for ((name, _), was_bound) in ours.iter().zip(bound) {
            if !was_bound {
                warn!("🪶 '{}' is not in the registered schema and will not be published", name);
            }
        }

        Ok(Self {
            subject: registered.subject.clone(),
            schema,
            schema_id: registered.id,
            bindings,
        })
    }

    pub(crate) fn schema_id(&self) -> u32 {
        self.schema_id
    }

    /// 📦 `0x00` + schema id (big-endian u32) + Avro binary datum.
    pub(crate) fn encode(&self, record: &OutgoingRecord) -> Result<Vec<u8>, YtxError> {
        let ours = record.fields();
        let mut fields = Vec::with_capacity(self.bindings.len());
        for (name, binding) in &self.bindings {
            let value = match binding {
                Binding::Null(null) => null.clone(),
                Binding::Ours { index, schema } => convert(schema, ours[*index].1, name)?
                    .ok_or_else(|| YtxError::SchemaRegistry {
                        subject: self.subject.clone(),
                        reason: format!("field '{name}' no longer matches its schema"),
                        source: None,
                    })?,
            };
            fields.push((name.clone(), value));
        }

        let datum = to_avro_datum(&self.schema, AvroValue::Record(fields)).map_err(|err| {
            YtxError::SchemaRegistry {
                subject: self.subject.clone(),
                reason: format!("record does not fit the registered schema: {err}"),
                source: None,
            }
        })?;

        let mut framed = Vec::with_capacity(5 + datum.len());
        framed.push(MAGIC_BYTE);
        framed.extend_from_slice(&self.schema_id.to_be_bytes());
        framed.extend_from_slice(&datum);
        Ok(framed)
    }
}

/// `Ok(None)`: this schema cannot hold this kind of value at all.
/// `Err`: it could, but not this particular value (a count too big for an `int`).
fn convert(
    schema: &Schema,
    value: FieldValue<'_>,
    field: &str,
) -> Result<Option<AvroValue>, YtxError> {
    let too_big = |count: u64, target: &str| YtxError::Format {
        field: field.to_string(),
        value: count.to_string(),
        reason: format!("does not fit an Avro {target}"),
    };

    Ok(match (schema, value) {
        (Schema::String, FieldValue::Text(text)) => Some(AvroValue::String(text.to_string())),
        (Schema::Int, FieldValue::Count(count)) => Some(AvroValue::Int(
            i32::try_from(count).map_err(|_| too_big(count, "int"))?,
        )),
        (Schema::Long, FieldValue::Count(count)) => Some(AvroValue::Long(
            i64::try_from(count).map_err(|_| too_big(count, "long"))?,
        )),
        (Schema::Double, FieldValue::Count(count)) => Some(AvroValue::Double(count as f64)),
        (Schema::Float, FieldValue::Count(count)) => Some(AvroValue::Float(count as f32)),
        (Schema::Union(union), value) => {
            let mut first_error = None;
            for (index, variant) in union.variants().iter().enumerate() {
                match convert(variant, value, field) {
                    Ok(Some(inner)) => {
                        return Ok(Some(AvroValue::Union(index as u32, Box::new(inner))));
                    }
                    Ok(None) => {}
                    Err(err) => {
                        first_error.get_or_insert(err);
                    }
                }
            }
            match first_error {
                Some(err) => return Err(err),
                None => None,
            }
        }
        _ => None,
    })
}

fn null_for(schema: &Schema) -> Option<AvroValue> {
    match schema {
        Schema::Null => Some(AvroValue::Null),
        Schema::Union(union) => union
            .variants()
            .iter()
            .position(|variant| matches!(variant, Schema::Null))
            .map(|index| AvroValue::Union(index as u32, Box::new(AvroValue::Null))),
        _ => None,
    }
}
