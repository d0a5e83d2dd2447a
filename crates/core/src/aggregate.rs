//! Keyed grouping and reduction
//!
//! Groups are tracked in first-occurrence order through an explicit index, so
//! every ordering (and every tie-break) is deterministic regardless of the
//! hash map used for lookups.

use crate::registry::{ordered_codes, CategorySet, Domain};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

/// Reduction of one group of records
///
/// `mean`, `min` and `max` are `None` whenever `count == 0`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GroupAggregate<K> {
    pub key: K,
    pub count: usize,
    pub sum: f64,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl<K> GroupAggregate<K> {
    /// An aggregate over no records
    pub fn empty(key: K) -> Self {
        Self {
            key,
            count: 0,
            sum: 0.0,
            mean: None,
            min: None,
            max: None,
        }
    }

    fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.mean = Some(self.sum / self.count as f64);
    }

    pub fn field(&self, field: Field) -> Option<f64> {
        match field {
            Field::Count => Some(self.count as f64),
            Field::Sum => Some(self.sum),
            Field::Mean => self.mean,
            Field::Min => self.min,
            Field::Max => self.max,
        }
    }
}

/// A reduced field that groups can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Count,
    Sum,
    Mean,
    Min,
    Max,
}

/// Output order of [`aggregate`]
#[derive(Debug, Clone, PartialEq)]
pub enum GroupOrder<K> {
    /// Exactly these keys in this order; absent keys are zero-filled and
    /// keys outside the list are dropped
    Registry(Vec<K>),
    /// Descending by a field, ties in first-seen order, undefined values last
    Descending(Field),
    /// Order of first appearance
    FirstSeen,
}

impl GroupOrder<String> {
    pub fn registry(domain: Domain) -> Self {
        GroupOrder::Registry(ordered_codes(domain).iter().map(|c| c.to_string()).collect())
    }
}

/// Compare optional values descending with `None` last
pub(crate) fn desc_none_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Group `records` by `key_fn` and reduce `metric_fn` per group
///
/// Records whose metric is `None` are skipped entirely.
pub fn aggregate<T, K, KF, MF>(
    records: impl IntoIterator<Item = T>,
    key_fn: KF,
    metric_fn: MF,
    order: &GroupOrder<K>,
) -> Vec<GroupAggregate<K>>
where
    K: Eq + Hash + Clone,
    KF: Fn(&T) -> K,
    MF: Fn(&T) -> Option<f64>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<GroupAggregate<K>> = Vec::new();

    for record in records {
        let Some(value) = metric_fn(&record) else {
            continue;
        };
        let key = key_fn(&record);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(GroupAggregate::empty(key));
            groups.len() - 1
        });
        groups[slot].push(value);
    }

    match order {
        GroupOrder::FirstSeen => groups,
        GroupOrder::Descending(field) => {
            // stable sort keeps first-seen order among ties
            groups.sort_by(|a, b| desc_none_last(a.field(*field), b.field(*field)));
            groups
        }
        GroupOrder::Registry(keys) => {
            let dropped = groups.iter().filter(|g| !keys.contains(&g.key)).count();
            if dropped > 0 {
                tracing::debug!("Dropped {} group(s) outside the registry", dropped);
            }
            keys.iter()
                .map(|key| match index.get(key) {
                    Some(&slot) => groups[slot].clone(),
                    None => GroupAggregate::empty(key.clone()),
                })
                .collect()
        }
    }
}

/// One actor's counts across a fixed category set
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PivotRow {
    pub key: String,
    pub label: String,
    /// One count per category, in category order
    pub counts: Vec<u64>,
    pub total: u64,
}

/// Actor-by-category count table
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PivotTable {
    pub columns: Vec<String>,
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column totals, in category order
    pub fn column_totals(&self) -> Vec<u64> {
        let mut totals = vec![0; self.columns.len()];
        for row in &self.rows {
            for (total, count) in totals.iter_mut().zip(&row.counts) {
                *total += count;
            }
        }
        totals
    }
}

/// Tabulate counts per actor across `columns`, rows sorted by total descending
///
/// `row_fn` yields `(key, display label)`; the label of the first record seen
/// for a key is kept. A record whose category is missing or unrecognized still
/// creates its actor's row but adds nothing to it.
pub fn pivot<T, RF, CF, NF>(
    records: impl IntoIterator<Item = T>,
    row_fn: RF,
    category_fn: CF,
    count_fn: NF,
    columns: &CategorySet,
) -> PivotTable
where
    RF: Fn(&T) -> (String, String),
    CF: Fn(&T) -> Option<String>,
    NF: Fn(&T) -> u64,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<PivotRow> = Vec::new();

    for record in records {
        let (key, label) = row_fn(&record);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            rows.push(PivotRow {
                key,
                label,
                counts: vec![0; columns.len()],
                total: 0,
            });
            rows.len() - 1
        });

        let position = category_fn(&record).and_then(|c| columns.position(&c));
        match position {
            Some(column) => {
                let count = count_fn(&record);
                rows[slot].counts[column] += count;
                rows[slot].total += count;
            }
            None => tracing::debug!("Skipped pivot record with unrecognized category"),
        }
    }

    rows.sort_by(|a, b| b.total.cmp(&a.total));

    PivotTable {
        columns: columns.codes().iter().map(|c| c.to_string()).collect(),
        rows,
    }
}
