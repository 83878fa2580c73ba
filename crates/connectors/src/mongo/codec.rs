use bson::{Binary, Bson, Document, spec::BinarySubtype};
use model::{
    core::value::Value,
    error::TransformError,
    records::row::{FieldValue, Record},
};
use uuid::Uuid;

/// Converts one wire value. Exotic BSON types a record field cannot
/// carry are rejected rather than silently stringified.
pub fn bson_to_value(bson: &Bson) -> Result<Value, TransformError> {
    match bson {
        Bson::Double(v) => Ok(Value::Float(*v)),
        Bson::String(v) => Ok(Value::String(v.clone())),
        Bson::Boolean(v) => Ok(Value::Boolean(*v)),
        Bson::Int32(v) => Ok(Value::Int(*v as i64)),
        Bson::Int64(v) => Ok(Value::Int(*v)),
        Bson::Null => Ok(Value::Null),
        Bson::ObjectId(oid) => Ok(Value::ObjectId(oid.to_hex())),
        Bson::DateTime(dt) => Ok(Value::Timestamp(dt.to_chrono())),
        Bson::Binary(bin) if bin.subtype == BinarySubtype::Uuid => {
            let uuid = Uuid::from_slice(&bin.bytes)
                .map_err(|e| TransformError::Unsupported(format!("uuid binary: {e}")))?;
            Ok(Value::Uuid(uuid))
        }
        Bson::Binary(bin) => Ok(Value::Bytes(bin.bytes.clone())),
        Bson::Document(_) | Bson::Array(_) => Ok(Value::Json(bson.clone().into_relaxed_extjson())),
        Bson::Decimal128(v) => Ok(Value::String(v.to_string())),
        other => Err(TransformError::Unsupported(format!(
            "bson element type {:?}",
            other.element_type()
        ))),
    }
}

/// Total in this direction: anything a `Value` can hold has a BSON
/// rendering. Object ids that no longer parse as such are carried as
/// plain strings.
pub fn value_to_bson(value: &Value) -> Bson {
    match value {
        Value::Int(v) => Bson::Int64(*v),
        Value::Float(v) => Bson::Double(*v),
        Value::String(v) => Bson::String(v.clone()),
        Value::Boolean(v) => Bson::Boolean(*v),
        Value::Bytes(v) => Bson::Binary(Binary {
            subtype: BinarySubtype::Generic,
            bytes: v.clone(),
        }),
        Value::Timestamp(v) => Bson::DateTime(bson::DateTime::from_chrono(*v)),
        Value::Uuid(v) => Bson::Binary(Binary {
            subtype: BinarySubtype::Uuid,
            bytes: v.as_bytes().to_vec(),
        }),
        Value::ObjectId(hex) => match bson::oid::ObjectId::parse_str(hex) {
            Ok(oid) => Bson::ObjectId(oid),
            Err(_) => Bson::String(hex.clone()),
        },
        Value::Json(v) => Bson::try_from(v.clone()).unwrap_or_else(|_| Bson::String(v.to_string())),
        Value::Null => Bson::Null,
    }
}

pub fn document_to_record(entity: &str, document: Document) -> Result<Record, TransformError> {
    let mut fields = Vec::with_capacity(document.len());
    for (name, bson) in document {
        let value = bson_to_value(&bson)?;
        fields.push(FieldValue { name, value });
    }
    Ok(Record::new(entity, fields))
}

pub fn record_to_document(record: &Record) -> Document {
    let mut document = Document::new();
    for field in &record.fields {
        document.insert(field.name.clone(), value_to_bson(&field.value));
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use chrono::{TimeZone, Utc};

    #[test]
    fn scalar_bson_round_trips_through_value() {
        let stamp = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let cases = vec![
            Bson::Int64(42),
            Bson::Double(2.5),
            Bson::String("ada".into()),
            Bson::Boolean(true),
            Bson::Null,
            Bson::DateTime(bson::DateTime::from_chrono(stamp)),
        ];
        for bson in cases {
            let value = bson_to_value(&bson).unwrap();
            assert_eq!(value_to_bson(&value), bson);
        }
    }

    #[test]
    fn object_ids_become_hex_strings_and_back() {
        let oid = bson::oid::ObjectId::new();
        let value = bson_to_value(&Bson::ObjectId(oid)).unwrap();
        assert_eq!(value, Value::ObjectId(oid.to_hex()));
        assert_eq!(value_to_bson(&value), Bson::ObjectId(oid));
    }

    #[test]
    fn malformed_object_id_falls_back_to_string() {
        let bson = value_to_bson(&Value::ObjectId("not hex".into()));
        assert_eq!(bson, Bson::String("not hex".into()));
    }

    #[test]
    fn int32_widens_to_int() {
        assert_eq!(bson_to_value(&Bson::Int32(7)).unwrap(), Value::Int(7));
    }

    #[test]
    fn nested_documents_are_carried_as_json() {
        let bson = Bson::Document(doc! { "a": 1, "b": "x" });
        let value = bson_to_value(&bson).unwrap();
        assert!(matches!(value, Value::Json(_)));
    }

    #[test]
    fn oplog_timestamps_are_rejected() {
        let bson = Bson::Timestamp(bson::Timestamp {
            time: 1,
            increment: 2,
        });
        assert!(matches!(
            bson_to_value(&bson),
            Err(TransformError::Unsupported(_))
        ));
    }

    #[test]
    fn documents_round_trip_as_records() {
        let document = doc! { "id": 3_i64, "name": "ada", "active": true };
        let record = document_to_record("users", document.clone()).unwrap();
        assert_eq!(record.get_value("name"), Value::String("ada".into()));
        assert_eq!(record_to_document(&record), document);
    }
}
