use model::partition::JobId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the task a batch format is being opened for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskPhase {
    Read,
    Write,
}

/// Per-task identity handed to batch formats when opening readers and
/// writers. Formats use it to isolate scratch space and name outputs, so
/// it must be unique per (job, phase, partition, attempt).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttemptId {
    pub job: JobId,
    pub phase: TaskPhase,
    pub partition: usize,
    pub attempt: u32,
}

impl AttemptId {
    /// First read attempt for one planned partition.
    pub fn read(job: JobId, partition: usize) -> Self {
        AttemptId {
            job,
            phase: TaskPhase::Read,
            partition,
            attempt: 0,
        }
    }

    /// First write attempt for the task identified by the config.
    pub fn write(job: JobId, partition: usize) -> Self {
        AttemptId {
            job,
            phase: TaskPhase::Write,
            partition,
            attempt: 0,
        }
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self.phase {
            TaskPhase::Read => 'r',
            TaskPhase::Write => 'w',
        };
        write!(
            f,
            "attempt_{}_{}_{}_{:06}_{}",
            self.job.stamp, self.job.dataset, phase, self.partition, self.attempt
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_zero_padded_read_attempt() {
        let attempt = AttemptId::read(JobId::with_stamp("20260101120000", 4), 12);
        assert_eq!(attempt.to_string(), "attempt_20260101120000_4_r_000012_0");
    }

    #[test]
    fn write_attempts_are_distinct_from_read_attempts() {
        let job = JobId::with_stamp("20260101120000", 4);
        let read = AttemptId::read(job.clone(), 3);
        let write = AttemptId::write(job, 3);
        assert_ne!(read, write);
        assert!(write.to_string().contains("_w_"));
    }
}
