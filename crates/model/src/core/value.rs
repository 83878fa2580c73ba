use crate::core::data_type::DataType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, hash::Hash};
use uuid::Uuid;

/// Scalar universe shared by all backends. Partition keys, filter operands
/// and record fields are all carried as `Value`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    /// 24-char lowercase hex rendering of a document id.
    ObjectId(String),
    Json(serde_json::Value),
    Null,
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        use Value::*;
        std::mem::discriminant(self).hash(state);
        match self {
            Int(v) => v.hash(state),
            Float(v) => {
                // NaN and -0.0 hash by bit pattern
                v.to_bits().hash(state);
            }
            String(v) => v.hash(state),
            Boolean(v) => v.hash(state),
            Bytes(v) => v.hash(state),
            Timestamp(v) => v.hash(state),
            Uuid(v) => v.hash(state),
            ObjectId(v) => v.hash(state),
            Json(v) => {
                let json_str = serde_json::to_string(v).unwrap_or_default();
                json_str.hash(state);
            }
            Null => {}
        }
    }
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Float(v) => Some(*v as i64),
            Value::String(v) => v.parse::<i64>().ok(),
            Value::Boolean(v) => Some(if *v { 1 } else { 0 }),
            Value::Json(v) => v.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::String(v) => v.parse::<f64>().ok(),
            Value::Boolean(v) => Some(if *v { 1.0 } else { 0.0 }),
            Value::Json(v) => v.as_f64(),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<String> {
        match self {
            Value::Int(v) => Some(v.to_string()),
            Value::Float(v) => Some(v.to_string()),
            Value::String(v) => Some(v.clone()),
            Value::Boolean(v) => Some(v.to_string()),
            Value::Uuid(v) => Some(v.to_string()),
            Value::ObjectId(v) => Some(v.clone()),
            Value::Timestamp(v) => Some(v.to_rfc3339()),
            Value::Json(v) => v.as_str().map(|s| s.to_string()),
            _ => None,
        }
    }

    /// Same-kind ordering; numeric kinds compare across `Int`/`Float`.
    /// `None` means the two values are not comparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        use Value::*;
        match (self, other) {
            (Int(a), Int(b)) => Some(a.cmp(b)),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Int(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), Int(b)) => a.partial_cmp(&(*b as f64)),
            (String(a), String(b)) => Some(a.cmp(b)),
            (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
            (Timestamp(a), Timestamp(b)) => Some(a.cmp(b)),
            (Uuid(a), Uuid(b)) => Some(a.cmp(b)),
            (ObjectId(a), ObjectId(b)) => Some(a.cmp(b)),
            (Bytes(a), Bytes(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    pub fn equal(&self, other: &Value) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int,
            Value::Float(_) => DataType::Float,
            Value::String(_) => DataType::String,
            Value::Boolean(_) => DataType::Boolean,
            Value::Bytes(_) => DataType::Bytes,
            Value::Timestamp(_) => DataType::Timestamp,
            Value::Uuid(_) => DataType::Uuid,
            Value::ObjectId(_) => DataType::ObjectId,
            Value::Json(_) => DataType::Json,
            Value::Null => DataType::Null,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Bytes(v) => {
                write!(f, "0x")?;
                for byte in v {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Value::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Uuid(v) => write!(f, "{v}"),
            Value::ObjectId(v) => write!(f, "{v}"),
            Value::Json(v) => write!(f, "{v}"),
            Value::Null => write!(f, "NULL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_orders_same_kind_values() {
        assert_eq!(Value::Int(3).compare(&Value::Int(7)), Some(Ordering::Less));
        assert_eq!(
            Value::String("b".into()).compare(&Value::String("a".into())),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn compare_mixes_int_and_float() {
        assert_eq!(
            Value::Int(2).compare(&Value::Float(2.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Value::Float(1.5).compare(&Value::Int(2)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn compare_rejects_cross_kind_values() {
        assert_eq!(Value::Int(1).compare(&Value::String("1".into())), None);
        assert_eq!(Value::Null.compare(&Value::Null), None);
    }

    #[test]
    fn data_type_tracks_variant() {
        assert_eq!(Value::ObjectId("0".repeat(24)).data_type(), DataType::ObjectId);
        assert_eq!(Value::Null.data_type(), DataType::Null);
    }
}
