use crate::{error::PlanningError, mongo::codec};
use bson::{Bson, Document};
use model::{
    core::value::Value,
    partition::{JobId, PartitionBounds, PartitionDescriptor, TokenRange},
};
use rand::{Rng, seq::SliceRandom};
use std::collections::HashMap;
use tracing::warn;

/// Hosts of one shard as listed in the topology registry. Replica-set
/// deployments render as `rs0/host-a:27017,host-b:27017`; the set name
/// prefix is dropped and the remainder split on commas.
pub(crate) fn parse_shard_hosts(host: &str) -> Vec<String> {
    let members = match host.split_once('/') {
        Some((_, members)) => members,
        None => host,
    };
    members
        .split(',')
        .filter(|h| !h.is_empty())
        .map(|h| h.to_string())
        .collect()
}

/// Chains N split points into N+1 contiguous ranges: the first starts
/// unbounded, each point closes one range and opens the next, the last
/// runs to the end of the key space. Every range carries the hosts of
/// the deployment that produced the points.
pub(crate) fn ranges_from_split_points(
    points: &[Bson],
    key: &str,
    hosts: &[String],
) -> Result<Vec<TokenRange>, PlanningError> {
    let mut ranges = Vec::with_capacity(points.len() + 1);
    let mut last = None;
    for point in points {
        let document = point.as_document().ok_or_else(|| {
            PlanningError::MalformedTopology("split point is not a document".into())
        })?;
        let bson = document.get(key).ok_or_else(|| {
            PlanningError::MalformedTopology(format!("split point missing key '{key}'"))
        })?;
        let current = Some(
            codec::bson_to_value(bson)
                .map_err(|e| PlanningError::MalformedTopology(e.to_string()))?,
        );
        ranges.push(TokenRange::new(last, current.clone(), hosts.to_vec()));
        last = current;
    }
    ranges.push(TokenRange::new(last, None, hosts.to_vec()));
    Ok(ranges)
}

/// One range per chunk, bounds read under the collection's shard key.
/// The key is discovered from the first chunk's `min` document; a later
/// chunk disagreeing means the registry is inconsistent and planning
/// fails rather than mis-partitioning.
pub(crate) fn ranges_from_chunks(
    chunks: &[Document],
    shards: &HashMap<String, Vec<String>>,
) -> Result<Vec<TokenRange>, PlanningError> {
    let mut key: Option<String> = None;
    let mut ranges = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let min = chunk
            .get_document("min")
            .map_err(|_| PlanningError::MalformedTopology("chunk missing min document".into()))?;
        let max = chunk
            .get_document("max")
            .map_err(|_| PlanningError::MalformedTopology("chunk missing max document".into()))?;
        let chunk_key = min
            .keys()
            .next()
            .ok_or_else(|| PlanningError::MalformedTopology("chunk min has no keys".into()))?;

        let key = match &key {
            Some(existing) => {
                if existing != chunk_key {
                    return Err(PlanningError::ShardKeyMismatch {
                        expected: existing.clone(),
                        found: chunk_key.clone(),
                    });
                }
                existing.clone()
            }
            None => {
                key = Some(chunk_key.clone());
                chunk_key.clone()
            }
        };

        let shard = chunk
            .get_str("shard")
            .map_err(|_| PlanningError::MalformedTopology("chunk missing shard name".into()))?;
        let replicas = match shards.get(shard) {
            Some(hosts) => hosts.clone(),
            None => {
                warn!(shard, "chunk references an unlisted shard");
                Vec::new()
            }
        };

        let start = chunk_bound(min.get(&key), &key)?;
        let end = chunk_bound(max.get(&key), &key)?;
        ranges.push(TokenRange::new(start, end, replicas));
    }
    Ok(ranges)
}

/// `MinKey`/`MaxKey` mark the edges of the key space; they become
/// unbounded range ends so querying stays uniform across backends.
fn chunk_bound(bson: Option<&Bson>, key: &str) -> Result<Option<Value>, PlanningError> {
    match bson {
        None => Err(PlanningError::MalformedTopology(format!(
            "chunk bound missing key '{key}'"
        ))),
        Some(Bson::MinKey) | Some(Bson::MaxKey) => Ok(None),
        Some(other) => codec::bson_to_value(other)
            .map(Some)
            .map_err(|e| PlanningError::MalformedTopology(e.to_string())),
    }
}

/// Spreads ranges so consecutive partitions do not all land on the same
/// shard. Ranges are shuffled before indexes are assigned, keeping
/// descriptors index-contiguous.
pub(crate) fn shuffle_ranges<R: Rng>(ranges: &mut [TokenRange], rng: &mut R) {
    ranges.shuffle(rng);
}

pub(crate) fn wrap_ranges(job: &JobId, ranges: Vec<TokenRange>) -> Vec<PartitionDescriptor> {
    ranges
        .into_iter()
        .enumerate()
        .map(|(index, range)| {
            PartitionDescriptor::new(job.clone(), index, PartitionBounds::KeyRange(range))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use rand::{SeedableRng, rngs::StdRng};

    fn hosts(list: &[&str]) -> Vec<String> {
        list.iter().map(|h| h.to_string()).collect()
    }

    #[test]
    fn shard_host_strings_lose_their_set_prefix() {
        assert_eq!(
            parse_shard_hosts("rs0/node-a:27017,node-b:27017"),
            hosts(&["node-a:27017", "node-b:27017"])
        );
        assert_eq!(parse_shard_hosts("node-c:27017"), hosts(&["node-c:27017"]));
        assert_eq!(parse_shard_hosts("rs1/"), Vec::<String>::new());
    }

    #[test]
    fn three_split_points_chain_into_four_ranges() {
        let points = vec![
            Bson::Document(doc! { "_id": 10_i64 }),
            Bson::Document(doc! { "_id": 20_i64 }),
            Bson::Document(doc! { "_id": 30_i64 }),
        ];
        let ranges = ranges_from_split_points(&points, "_id", &hosts(&["m1:27017"])).unwrap();

        assert_eq!(ranges.len(), 4);
        assert_eq!(ranges[0].start, None);
        assert_eq!(ranges[0].end, Some(Value::Int(10)));
        assert_eq!(ranges[1].start, Some(Value::Int(10)));
        assert_eq!(ranges[1].end, Some(Value::Int(20)));
        assert_eq!(ranges[2].start, Some(Value::Int(20)));
        assert_eq!(ranges[2].end, Some(Value::Int(30)));
        assert_eq!(ranges[3].start, Some(Value::Int(30)));
        assert_eq!(ranges[3].end, None);
        for range in &ranges {
            assert_eq!(range.replicas, hosts(&["m1:27017"]));
        }
    }

    #[test]
    fn no_split_points_still_covers_the_space() {
        let ranges = ranges_from_split_points(&[], "_id", &[]).unwrap();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].start, None);
        assert_eq!(ranges[0].end, None);
    }

    #[test]
    fn split_points_missing_the_key_are_malformed() {
        let points = vec![Bson::Document(doc! { "other": 1 })];
        let err = ranges_from_split_points(&points, "_id", &[]).unwrap_err();
        assert!(matches!(err, PlanningError::MalformedTopology(_)));
    }

    fn shard_map() -> HashMap<String, Vec<String>> {
        HashMap::from([
            ("shard-a".to_string(), hosts(&["a1:27017", "a2:27017"])),
            ("shard-b".to_string(), hosts(&["b1:27017"])),
        ])
    }

    fn chunk(shard: &str, min: Bson, max: Bson) -> Document {
        doc! { "shard": shard, "min": { "user_id": min }, "max": { "user_id": max } }
    }

    #[test]
    fn chunks_map_to_ranges_with_their_shards_hosts() {
        let chunks = vec![
            chunk("shard-a", Bson::MinKey, Bson::Int64(100)),
            chunk("shard-b", Bson::Int64(100), Bson::Int64(200)),
            chunk("shard-a", Bson::Int64(200), Bson::MaxKey),
        ];
        let ranges = ranges_from_chunks(&chunks, &shard_map()).unwrap();

        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0].start, None);
        assert_eq!(ranges[0].end, Some(Value::Int(100)));
        assert_eq!(ranges[0].replicas, hosts(&["a1:27017", "a2:27017"]));
        assert_eq!(ranges[1].start, Some(Value::Int(100)));
        assert_eq!(ranges[1].end, Some(Value::Int(200)));
        assert_eq!(ranges[1].replicas, hosts(&["b1:27017"]));
        assert_eq!(ranges[2].end, None);
    }

    #[test]
    fn chunks_disagreeing_on_the_key_fail_planning() {
        let chunks = vec![
            chunk("shard-a", Bson::MinKey, Bson::Int64(100)),
            doc! { "shard": "shard-b", "min": { "region": 1 }, "max": { "region": 2 } },
        ];
        let err = ranges_from_chunks(&chunks, &shard_map()).unwrap_err();
        assert!(matches!(
            err,
            PlanningError::ShardKeyMismatch { ref expected, ref found }
                if expected == "user_id" && found == "region"
        ));
    }

    #[test]
    fn unlisted_shards_leave_replicas_empty() {
        let chunks = vec![chunk("shard-z", Bson::MinKey, Bson::MaxKey)];
        let ranges = ranges_from_chunks(&chunks, &shard_map()).unwrap();
        assert!(ranges[0].replicas.is_empty());
    }

    #[test]
    fn shuffle_keeps_content_and_reindexes_contiguously() {
        let build = || -> Vec<TokenRange> {
            (0..8)
                .map(|i| {
                    TokenRange::new(
                        Some(Value::Int(i * 10)),
                        Some(Value::Int((i + 1) * 10)),
                        Vec::new(),
                    )
                })
                .collect()
        };

        let mut reordered = 0;
        for seed in 0..16 {
            let mut ranges = build();
            shuffle_ranges(&mut ranges, &mut StdRng::seed_from_u64(seed));
            if ranges != build() {
                reordered += 1;
            }

            let mut sorted = ranges.clone();
            sorted.sort_by_key(|r| match r.start {
                Some(Value::Int(v)) => v,
                _ => i64::MIN,
            });
            assert_eq!(sorted, build());

            let job = JobId::with_stamp("20260101120000", 2);
            let partitions = wrap_ranges(&job, ranges);
            for (i, partition) in partitions.iter().enumerate() {
                assert_eq!(partition.index, i);
                assert_eq!(partition.job, job);
            }
        }
        assert!(reordered > 0);
    }
}
