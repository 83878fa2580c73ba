use crate::core::value::Value;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one planning call. A fresh id is generated every time a
/// dataset is planned; nothing about it outlives the call that minted it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId {
    /// UTC planning instant, `%Y%m%d%H%M%S`.
    pub stamp: String,
    /// Dataset number assigned by the host engine.
    pub dataset: u32,
}

impl JobId {
    pub fn generate(dataset: u32) -> Self {
        JobId {
            stamp: Utc::now().format("%Y%m%d%H%M%S").to_string(),
            dataset,
        }
    }

    pub fn with_stamp(stamp: impl Into<String>, dataset: u32) -> Self {
        JobId {
            stamp: stamp.into(),
            dataset,
        }
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job_{}_{}", self.stamp, self.dataset)
    }
}

/// Half-open key interval owned by one partition: `start` inclusive,
/// `end` exclusive, `None` meaning unbounded on that side. Replica hosts
/// are locality hints only and may carry ports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenRange {
    pub start: Option<Value>,
    pub end: Option<Value>,
    pub replicas: Vec<String>,
}

impl TokenRange {
    pub fn new(start: Option<Value>, end: Option<Value>, replicas: Vec<String>) -> Self {
        TokenRange {
            start,
            end,
            replicas,
        }
    }

    pub fn unbounded() -> Self {
        TokenRange {
            start: None,
            end: None,
            replicas: Vec::new(),
        }
    }
}

/// Opaque, serialized native split of a batch-format store. Only the
/// format that produced it can decode it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitHandle {
    pub bytes: Vec<u8>,
    pub hosts: Vec<String>,
}

impl SplitHandle {
    pub fn new(bytes: Vec<u8>, hosts: Vec<String>) -> Self {
        SplitHandle { bytes, hosts }
    }
}

/// What a partition covers: an ordered key range, or a native split the
/// planner could not interpret beyond its locality hosts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum PartitionBounds {
    KeyRange(TokenRange),
    NativeSplit(SplitHandle),
}

/// One unit of parallel work. Descriptors from a single planning call are
/// index-contiguous from zero and pairwise disjoint; for ordered backends
/// they cover the whole key space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionDescriptor {
    pub job: JobId,
    pub index: usize,
    pub bounds: PartitionBounds,
}

impl PartitionDescriptor {
    pub fn new(job: JobId, index: usize, bounds: PartitionBounds) -> Self {
        PartitionDescriptor { job, index, bounds }
    }

    pub fn key_range(&self) -> Option<&TokenRange> {
        match &self.bounds {
            PartitionBounds::KeyRange(range) => Some(range),
            PartitionBounds::NativeSplit(_) => None,
        }
    }

    /// Locality hosts as reported by the backend, ports intact.
    pub fn replicas(&self) -> &[String] {
        match &self.bounds {
            PartitionBounds::KeyRange(range) => &range.replicas,
            PartitionBounds::NativeSplit(handle) => &handle.hosts,
        }
    }
}

/// Partition identity is dataset + index, as the host engine tracks it;
/// two plans of the same dataset reuse indexes without being "equal work".
impl PartialEq for PartitionDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.job.dataset == other.job.dataset && self.index == other.index
    }
}

impl Eq for PartitionDescriptor {}

/// Drops a single trailing `:port` from a host string. Locality hosts are
/// compared against scheduler hostnames, never dialed. Strings with more
/// than one colon (IPv6 literals) pass through untouched.
pub fn strip_port(host: &str) -> String {
    let mut parts = host.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(port), None)
            if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) =>
        {
            name.to_string()
        }
        _ => host.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_renders_stamp_and_dataset() {
        let job = JobId::with_stamp("20260101120000", 7);
        assert_eq!(job.to_string(), "job_20260101120000_7");
    }

    #[test]
    fn descriptor_identity_is_dataset_and_index() {
        let a = PartitionDescriptor::new(
            JobId::with_stamp("20260101120000", 1),
            0,
            PartitionBounds::KeyRange(TokenRange::unbounded()),
        );
        let b = PartitionDescriptor::new(
            JobId::with_stamp("20260101130000", 1),
            0,
            PartitionBounds::KeyRange(TokenRange::new(
                Some(Value::Int(0)),
                None,
                vec!["h1".into()],
            )),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn descriptor_round_trips_through_serde() {
        let descriptor = PartitionDescriptor::new(
            JobId::with_stamp("20260101120000", 3),
            2,
            PartitionBounds::KeyRange(TokenRange::new(
                Some(Value::Int(10)),
                Some(Value::Int(20)),
                vec!["node-a:27017".into(), "node-b:27017".into()],
            )),
        );
        let json = serde_json::to_string(&descriptor).unwrap();
        let back: PartitionDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back.index, 2);
        assert_eq!(back.key_range(), descriptor.key_range());
    }

    #[test]
    fn strip_port_handles_plain_and_suffixed_hosts() {
        assert_eq!(strip_port("node-a:27017"), "node-a");
        assert_eq!(strip_port("node-a"), "node-a");
        assert_eq!(strip_port("10.0.0.5:5432"), "10.0.0.5");
        // not a port suffix
        assert_eq!(strip_port("fe80::1"), "fe80::1");
        assert_eq!(strip_port("node-a:"), "node-a:");
    }
}
