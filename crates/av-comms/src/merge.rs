//! Collapse per-vehicle arrival records into per-intersection merger datagrams.

use std::collections::BTreeMap;

use av_core::IntersectionId;
use log::warn;

use crate::{ArrivalRecord, MergeLog, NodeRole, MAX_NODES};

/// Bucket `records` by intersection and build one [`MergeLog`] per non-empty
/// bucket.
///
/// Output is independent of input order: buckets come out in ascending
/// intersection id and records within a bucket in ascending vehicle id.
/// Buckets larger than [`MAX_NODES`] keep the first `MAX_NODES` records.
pub fn aggregate_arrivals<'a, I>(records: I) -> Vec<MergeLog>
where
    I: IntoIterator<Item = &'a ArrivalRecord>,
{
    let mut buckets: BTreeMap<IntersectionId, Vec<ArrivalRecord>> = BTreeMap::new();
    for record in records {
        buckets.entry(record.intersection_id).or_default().push(record.clone());
    }

    buckets
        .into_iter()
        .map(|(intersection_id, mut log)| {
            log.sort_by(|a, b| {
                a.vehicle_id
                    .cmp(&b.vehicle_id)
                    .then(a.requested_time.total_cmp(&b.requested_time))
            });
            if log.len() > MAX_NODES {
                warn!(
                    "{intersection_id}: {} arrival records exceed capacity {MAX_NODES}, truncating",
                    log.len()
                );
                log.truncate(MAX_NODES);
            }
            MergeLog {
                intersection_id,
                node_role: NodeRole::Follower,
                total_nodes: log.len(),
                log,
            }
        })
        .collect()
}
