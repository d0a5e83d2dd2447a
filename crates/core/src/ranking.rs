//! Per-actor speed rankings

use crate::data::OperationRecord;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Role label that marks a row with no usable role
pub const UNKNOWN_ROLE: &str = "(unknown)";

/// One actor's place in a ranking
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedEntry {
    /// 1-based, ascending by `avg_metric_sec`
    pub rank: usize,
    pub actor_key: String,
    pub actor_name: String,
    /// `None` when no record of the actor had a computable metric
    pub avg_metric_sec: Option<f64>,
    pub sum_metric_sec: f64,
    pub sample_count: usize,
    /// First record seen for the actor, for display only
    pub sample: OperationRecord,
}

/// A ranking within one group (e.g. one role label)
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedGroup {
    pub label: String,
    pub entries: Vec<RankedEntry>,
}

fn asc_none_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

struct ActorAccumulator<'a> {
    key: String,
    sample: &'a OperationRecord,
    count: usize,
    metric_count: usize,
    sum: f64,
}

/// Rank actors ascending by their mean metric (lower is better)
///
/// Actors are keyed by worker identity. Actors whose metric is never
/// computable are ranked last; ties keep first-seen order.
pub fn rank_actors<'a, MF>(
    records: impl IntoIterator<Item = &'a OperationRecord>,
    metric_fn: MF,
) -> Vec<RankedEntry>
where
    MF: Fn(&OperationRecord) -> Option<f64>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut actors: Vec<ActorAccumulator<'a>> = Vec::new();

    for record in records {
        let key = record.worker.key();
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            actors.push(ActorAccumulator {
                key,
                sample: record,
                count: 0,
                metric_count: 0,
                sum: 0.0,
            });
            actors.len() - 1
        });

        let actor = &mut actors[slot];
        actor.count += 1;
        if let Some(value) = metric_fn(record) {
            actor.metric_count += 1;
            actor.sum += value;
        }
    }

    let mut entries: Vec<RankedEntry> = actors
        .into_iter()
        .map(|a| RankedEntry {
            rank: 0,
            actor_name: a.sample.worker.display_name(),
            actor_key: a.key,
            avg_metric_sec: (a.metric_count > 0).then(|| a.sum / a.metric_count as f64),
            sum_metric_sec: a.sum,
            sample_count: a.count,
            sample: a.sample.clone(),
        })
        .collect();

    entries.sort_by(|a, b| asc_none_last(a.avg_metric_sec, b.avg_metric_sec));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    entries
}

/// Filter, group and rank
///
/// `group_fn` returns the group label of a record; records for which it
/// returns `None`, an empty label or [`UNKNOWN_ROLE`] are excluded. Groups are
/// ordered by label. An empty result means "no data" for the caller.
pub fn rank<'a, GF, FF, MF>(
    records: &'a [OperationRecord],
    group_fn: GF,
    filter_fn: FF,
    metric_fn: MF,
) -> Vec<RankedGroup>
where
    GF: Fn(&'a OperationRecord) -> Option<&'a str>,
    FF: Fn(&OperationRecord) -> bool,
    MF: Fn(&OperationRecord) -> Option<f64>,
{
    let mut groups: HashMap<&'a str, Vec<&'a OperationRecord>> = HashMap::new();

    for record in records.iter().filter(|r| filter_fn(r)) {
        match group_fn(record).map(str::trim) {
            Some(label) if !label.is_empty() && label != UNKNOWN_ROLE => {
                groups.entry(label).or_default().push(record);
            }
            _ => tracing::debug!("Excluded ranking record without a usable group label"),
        }
    }

    let mut labels: Vec<&str> = groups.keys().copied().collect();
    labels.sort_unstable();

    labels
        .into_iter()
        .map(|label| RankedGroup {
            label: label.to_string(),
            entries: rank_actors(groups[label].iter().copied(), &metric_fn),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SpeedRow, Worker};
    use crate::normalize::normalize;
    use pretty_assertions::assert_eq;

    fn speed(id: Option<i64>, name: &str, role: &str, secs: f64) -> OperationRecord {
        OperationRecord {
            airline: "HH".to_string(),
            role_label: Some(role.to_string()),
            worker: Worker::new(id, Some(name.to_string())),
            duration_actual_sec: secs,
            samples: 1,
            ..Default::default()
        }
    }

    fn role(r: &OperationRecord) -> Option<&str> {
        r.role_label.as_deref()
    }

    #[test]
    fn test_rank_actors_ascending_by_mean() {
        let records = vec![
            speed(Some(1), "kim", "소닉1", 600.0),
            speed(Some(2), "lee", "소닉1", 300.0),
            speed(Some(1), "kim", "소닉1", 200.0),
            speed(Some(3), "park", "소닉1", 500.0),
        ];
        let entries = rank_actors(&records, |r| Some(r.duration_actual_sec));

        let order: Vec<_> = entries.iter().map(|e| (e.rank, e.actor_name.as_str())).collect();
        assert_eq!(order, vec![(1, "lee"), (2, "kim"), (3, "park")]);
        assert_eq!(entries[1].avg_metric_sec, Some(400.0));
        assert_eq!(entries[1].sample_count, 2);
        assert_eq!(entries[1].sum_metric_sec, 800.0);
        // first-seen sample, not the best one
        assert_eq!(entries[1].sample.duration_actual_sec, 600.0);
    }

    #[test]
    fn test_rank_actors_uses_identifier_over_name() {
        let records = vec![speed(Some(1), "kim", "x", 100.0), speed(Some(1), "김", "x", 300.0)];
        let entries = rank_actors(&records, |r| Some(r.duration_actual_sec));

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].actor_key, "1");
        assert_eq!(entries[0].actor_name, "kim");
    }

    #[test]
    fn test_rank_actors_without_metric_sort_last() {
        let records = vec![
            speed(Some(1), "a", "x", 900.0),
            speed(Some(2), "b", "x", 100.0),
            speed(Some(3), "c", "x", 50.0),
        ];
        let entries = rank_actors(&records, |r| {
            (r.worker.id != Some(3)).then_some(r.duration_actual_sec)
        });

        let keys: Vec<_> = entries.iter().map(|e| e.actor_key.as_str()).collect();
        assert_eq!(keys, vec!["2", "1", "3"]);
        assert_eq!(entries[2].avg_metric_sec, None);
        assert_eq!(entries[2].sample_count, 1);
    }

    #[test]
    fn test_rank_groups_by_label_and_excludes_unknown() {
        let records = vec![
            speed(Some(1), "a", "라바", 100.0),
            speed(Some(2), "b", "", 100.0),
            speed(Some(3), "c", UNKNOWN_ROLE, 100.0),
            speed(Some(4), "d", "로보캅", 100.0),
            speed(Some(5), "e", "라바", 50.0),
        ];
        let groups = rank(&records, role, |_| true, |r| Some(r.duration_actual_sec));

        let labels: Vec<_> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["라바", "로보캅"]);
        assert_eq!(groups[0].entries[0].actor_name, "e");
        assert_eq!(groups[0].entries.len(), 2);
    }

    #[test]
    fn test_rank_filter_by_derived_airline() {
        let rows = vec![
            SpeedRow {
                flight_title: Some("HH123".to_string()),
                role_label: Some("x".to_string()),
                member_srl: Some(1),
                time_sec: 100.0,
                ..Default::default()
            },
            SpeedRow {
                airline: Some("RF".to_string()),
                flight_title: Some("HH999".to_string()),
                role_label: Some("x".to_string()),
                member_srl: Some(2),
                time_sec: 10.0,
                ..Default::default()
            },
        ];
        let records: Vec<_> = rows.iter().map(normalize).collect();
        let groups = rank(&records, role, |r| r.airline == "HH", |r| Some(r.duration_actual_sec));

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "x");
        assert_eq!(groups[0].entries.len(), 1);
        assert_eq!(groups[0].entries[0].actor_key, "1");
    }

    #[test]
    fn test_rank_empty_when_nothing_matches() {
        let records = vec![speed(Some(1), "a", "", 100.0)];
        assert!(rank(&records, role, |_| true, |r| Some(r.duration_actual_sec)).is_empty());
    }

    #[test]
    fn test_ranking_is_non_decreasing() {
        let records: Vec<_> = [420.0, 120.0, 360.0, 120.0, 90.0]
            .iter()
            .enumerate()
            .map(|(i, s)| speed(Some(i as i64), "w", "x", *s))
            .collect();
        let entries = rank_actors(&records, |r| Some(r.duration_actual_sec));

        for pair in entries.windows(2) {
            assert!(pair[0].avg_metric_sec <= pair[1].avg_metric_sec);
        }
        assert!(entries.iter().all(|e| e.sample_count > 0));
    }
}
