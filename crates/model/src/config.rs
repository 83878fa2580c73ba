use crate::core::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Comparison pushed down to a query-capable backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(field: &str, op: FilterOp, value: Value) -> Self {
        Filter {
            field: field.to_string(),
            op,
            value,
        }
    }
}

/// Write acknowledgement requested from the document sink. The relational
/// sink is always acknowledged and ignores this.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum WriteAck {
    Unacknowledged,
    #[default]
    Primary,
    Majority,
    Nodes(u32),
}

/// Inbound configuration for one dataset. Hosts populate this from their
/// own config surface; defaults cover everything a backend does not
/// strictly require.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Dataset number assigned by the host engine; part of every job and
    /// attempt identity.
    pub dataset_id: u32,
    /// Partition index of the task driving this config. Only the write
    /// path reads it; planning assigns its own indexes.
    pub partition_id: usize,
    pub hosts: Vec<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Database (relational) or database name (document store).
    pub catalog: String,
    /// Table or collection name.
    pub table: String,
    /// Columns to read; empty means all.
    pub input_columns: Vec<String>,
    pub filters: Vec<Filter>,
    /// Inclusive key bounds for arithmetic range planning.
    pub lower_bound: i64,
    pub upper_bound: i64,
    pub num_partitions: usize,
    /// Target chunk size in MB for split-point discovery.
    pub split_size: u32,
    pub write_ack: WriteAck,
    /// Backend-specific settings batch formats read by name.
    pub options: HashMap<String, String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            dataset_id: 0,
            partition_id: 0,
            hosts: Vec::new(),
            port: None,
            username: None,
            password: None,
            catalog: String::new(),
            table: String::new(),
            input_columns: Vec::new(),
            filters: Vec::new(),
            lower_bound: 0,
            upper_bound: 0,
            num_partitions: 1,
            split_size: 10,
            write_ack: WriteAck::default(),
            options: HashMap::new(),
        }
    }
}

impl ExtractorConfig {
    /// `catalog.table`, the fully qualified name backends address.
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.catalog, self.table)
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = ExtractorConfig::default();
        assert_eq!(cfg.num_partitions, 1);
        assert_eq!(cfg.split_size, 10);
        assert_eq!(cfg.write_ack, WriteAck::Primary);
        assert!(cfg.filters.is_empty());
    }

    #[test]
    fn namespace_joins_catalog_and_table() {
        let cfg = ExtractorConfig {
            catalog: "shop".into(),
            table: "orders".into(),
            ..Default::default()
        };
        assert_eq!(cfg.namespace(), "shop.orders");
    }
}
