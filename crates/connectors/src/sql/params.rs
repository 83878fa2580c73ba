use model::core::value::Value;
use tokio_postgres::types::{Json as PgJson, ToSql};

/// One bound statement parameter, type-erased for the driver.
pub struct PgParam(Box<dyn ToSql + Sync + Send>);

impl PgParam {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Int(v) => PgParam(Box::new(v)),
            Value::Float(v) => PgParam(Box::new(v)),
            Value::String(v) => PgParam(Box::new(v)),
            Value::Boolean(v) => PgParam(Box::new(v)),
            Value::Bytes(v) => PgParam(Box::new(v)),
            Value::Timestamp(v) => PgParam(Box::new(v)),
            Value::Uuid(v) => PgParam(Box::new(v)),
            Value::ObjectId(v) => PgParam(Box::new(v)),
            Value::Json(v) => PgParam(Box::new(PgJson(v))),
            Value::Null => PgParam(Box::new(Option::<String>::None)),
        }
    }
}

impl AsRef<dyn ToSql + Sync> for PgParam {
    fn as_ref(&self) -> &(dyn ToSql + Sync + 'static) {
        &*self.0
    }
}

pub struct PgParamStore {
    pub params: Vec<PgParam>,
}

impl PgParamStore {
    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            params: values.into_iter().map(PgParam::from_value).collect(),
        }
    }

    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|param| param.as_ref())
            .collect::<Vec<_>>()
    }
}
