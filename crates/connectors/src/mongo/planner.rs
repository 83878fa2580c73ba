use crate::{
    error::PlanningError,
    mongo::{topology, utils},
};
use bson::{Bson, Document, doc};
use futures_util::TryStreamExt;
use model::{
    config::ExtractorConfig,
    partition::{JobId, PartitionDescriptor},
};
use mongodb::Client;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Plans one collection. Dials the configured deployment, decides from
/// the topology registry whether the collection is sharded, and shuts
/// the client down before returning on every path.
pub(crate) async fn plan(
    job: &JobId,
    key: &str,
    config: &ExtractorConfig,
) -> Result<Vec<PartitionDescriptor>, PlanningError> {
    if config.hosts.is_empty() {
        return Err(PlanningError::InvalidConfig("no hosts configured".into()));
    }
    let client = utils::connect(&config.hosts, config).await?;
    let outcome = plan_collection(&client, job, key, config).await;
    client.shutdown().await;
    outcome
}

async fn plan_collection(
    client: &Client,
    job: &JobId,
    key: &str,
    config: &ExtractorConfig,
) -> Result<Vec<PartitionDescriptor>, PlanningError> {
    let ns = config.namespace();
    if is_sharded(client, &ns).await? {
        let shards = shard_hosts(client).await?;
        let chunks = chunks(client, &ns).await?;
        let mut ranges = topology::ranges_from_chunks(&chunks, &shards)?;
        // Spread neighbouring chunks of one shard across the job.
        topology::shuffle_ranges(&mut ranges, &mut rand::rng());
        debug!(job = %job, ns, partitions = ranges.len(), "planned sharded collection");
        Ok(topology::wrap_ranges(job, ranges))
    } else {
        let (points, hosts) = match split_points(client, &ns, key, config).await {
            Some(points) => (points, config.hosts.clone()),
            None => probe_shards(client, &ns, key, config).await?,
        };
        let ranges = topology::ranges_from_split_points(&points, key, &hosts)?;
        debug!(job = %job, ns, partitions = ranges.len(), "planned unsharded collection");
        Ok(topology::wrap_ranges(job, ranges))
    }
}

/// The registry lists every sharded collection under its namespace.
async fn is_sharded(client: &Client, ns: &str) -> Result<bool, PlanningError> {
    let collections = client
        .database("config")
        .collection::<Document>("collections");
    let entry = collections.find_one(doc! { "_id": ns }, None).await?;
    Ok(entry.is_some())
}

/// Asks the deployment to cut the collection into ranges of at most
/// `split_size` megabytes. `None` covers both a refused command and a
/// reply without `splitKeys`; mongos routers refuse it, which is what
/// the shard probe recovers from.
async fn split_points(
    client: &Client,
    ns: &str,
    key: &str,
    config: &ExtractorConfig,
) -> Option<Vec<Bson>> {
    let command = doc! {
        "splitVector": ns,
        "keyPattern": { key: 1 },
        "force": false,
        "maxChunkSize": config.split_size,
    };
    match client.database("admin").run_command(command, None).await {
        Ok(reply) => reply.get_array("splitKeys").ok().cloned(),
        Err(err) => {
            warn!(%err, ns, "splitVector command refused");
            None
        }
    }
}

/// Retries `splitVector` against each shard's own members. An unsharded
/// collection in a sharded cluster lives on one shard, and only that
/// shard's mongod will answer.
async fn probe_shards(
    client: &Client,
    ns: &str,
    key: &str,
    config: &ExtractorConfig,
) -> Result<(Vec<Bson>, Vec<String>), PlanningError> {
    let shards = shard_hosts(client).await?;
    for (shard, hosts) in shards {
        if hosts.is_empty() {
            continue;
        }
        let probe = utils::connect(&hosts, config).await?;
        let found = split_points(&probe, ns, key, config).await;
        probe.shutdown().await;
        match found {
            Some(points) => {
                debug!(%shard, "split points served by shard members");
                return Ok((points, hosts));
            }
            None => warn!(%shard, "shard members produced no split points"),
        }
    }
    Err(PlanningError::NoSplitPoints(ns.to_string()))
}

async fn shard_hosts(client: &Client) -> Result<HashMap<String, Vec<String>>, PlanningError> {
    let mut cursor = client
        .database("config")
        .collection::<Document>("shards")
        .find(None, None)
        .await?;
    let mut shards = HashMap::new();
    while let Some(shard) = cursor.try_next().await? {
        let id = shard
            .get_str("_id")
            .map_err(|_| PlanningError::MalformedTopology("shard document missing _id".into()))?;
        let host = shard
            .get_str("host")
            .map_err(|_| PlanningError::MalformedTopology("shard document missing host".into()))?;
        shards.insert(id.to_string(), topology::parse_shard_hosts(host));
    }
    Ok(shards)
}

async fn chunks(client: &Client, ns: &str) -> Result<Vec<Document>, PlanningError> {
    let chunks = client
        .database("config")
        .collection::<Document>("chunks")
        .find(doc! { "ns": ns }, None)
        .await?
        .try_collect()
        .await?;
    Ok(chunks)
}
