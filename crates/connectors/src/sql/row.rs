use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use model::core::value::Value;
use tokio_postgres::{Row, types::Json as PgJson};
use tracing::warn;

/// Native record of the relational backend: column values in result
/// order, names preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlTuple {
    pub columns: Vec<(String, Value)>,
}

impl SqlTuple {
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        SqlTuple { columns }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(col, _)| col.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }
}

/// Decodes one wire row by column type. Unknown or undecodeable columns
/// become `Null` rather than failing the partition.
pub fn decode_row(row: &Row) -> SqlTuple {
    let mut columns = Vec::with_capacity(row.columns().len());
    for (idx, column) in row.columns().iter().enumerate() {
        let value = column_value(row, idx, column.type_().name());
        columns.push((column.name().to_string(), value));
    }
    SqlTuple::new(columns)
}

fn column_value(row: &Row, idx: usize, type_name: &str) -> Value {
    match type_name {
        "int2" => opt(row.try_get::<_, Option<i16>>(idx), |v| Value::Int(v as i64)),
        "int4" => opt(row.try_get::<_, Option<i32>>(idx), |v| Value::Int(v as i64)),
        "int8" => opt(row.try_get::<_, Option<i64>>(idx), Value::Int),
        "float4" => opt(row.try_get::<_, Option<f32>>(idx), |v| {
            Value::Float(v as f64)
        }),
        "float8" => opt(row.try_get::<_, Option<f64>>(idx), Value::Float),
        "text" | "varchar" | "bpchar" | "name" => {
            opt(row.try_get::<_, Option<String>>(idx), Value::String)
        }
        "bool" => opt(row.try_get::<_, Option<bool>>(idx), Value::Boolean),
        "bytea" => opt(row.try_get::<_, Option<Vec<u8>>>(idx), Value::Bytes),
        "timestamptz" => opt(
            row.try_get::<_, Option<DateTime<Utc>>>(idx),
            Value::Timestamp,
        ),
        "timestamp" => opt(row.try_get::<_, Option<NaiveDateTime>>(idx), |naive| {
            Value::Timestamp(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
        }),
        "date" => opt(row.try_get::<_, Option<NaiveDate>>(idx), |date| {
            let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
            Value::Timestamp(DateTime::<Utc>::from_naive_utc_and_offset(midnight, Utc))
        }),
        "uuid" => opt(row.try_get::<_, Option<uuid::Uuid>>(idx), Value::Uuid),
        "json" | "jsonb" => opt(
            row.try_get::<_, Option<PgJson<serde_json::Value>>>(idx),
            |json| Value::Json(json.0),
        ),
        other => {
            warn!(column_type = other, "unknown column type, reading as null");
            Value::Null
        }
    }
}

fn opt<T>(result: Result<Option<T>, tokio_postgres::Error>, wrap: impl Fn(T) -> Value) -> Value {
    result.ok().flatten().map(wrap).unwrap_or(Value::Null)
}
