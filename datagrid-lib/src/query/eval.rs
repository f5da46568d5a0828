//! In-memory query evaluation.

use std::collections::HashMap;

use super::AggregateKind;
use super::Clause;
use super::Condition;
use super::Predicate;
use super::Query;
use crate::model::Record;
use crate::model::Value;

/// Records returned by a query, with the total count and computed aggregates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataResult {
    /// The (possibly paged) records.
    pub result: Vec<Record>,
    /// Number of records matching the query before paging.
    pub count: usize,
    /// Aggregate values keyed by [`AggregateKind::key`].
    pub aggregates: HashMap<String, Value>,
}

impl DataResult {
    /// A result holding all of `records`.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            count: records.len(),
            result: records,
            aggregates: HashMap::new(),
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn aggregate(&self, field: &str, kind: AggregateKind) -> Option<&Value> {
        self.aggregates.get(&kind.key(field))
    }

    pub fn len(&self) -> usize {
        self.result.len()
    }

    pub fn is_empty(&self) -> bool {
        self.result.is_empty()
    }
}

/// Builds the predicate equivalent of a search clause.
///
/// `fields` empty means every field of `sample`.
pub(crate) fn search_predicate(clause: &Clause, sample: Option<&Record>) -> Option<Predicate> {
    let Clause::Search {
        key,
        fields,
        operator,
        ignore_case,
        ignore_accent,
    } = clause
    else {
        return None;
    };
    let targets: Vec<String> = if fields.is_empty() {
        sample
            .map(|r| r.field_names().into_iter().map(String::from).collect())
            .unwrap_or_default()
    } else {
        fields.clone()
    };
    Some(Predicate::Or(
        targets
            .into_iter()
            .map(|field| {
                Predicate::Condition(Condition {
                    field,
                    operator: *operator,
                    value: Value::String(key.clone()),
                    ignore_case: *ignore_case,
                    ignore_accent: *ignore_accent,
                })
            })
            .collect(),
    ))
}

/// Computes every aggregate clause of `query` over `records`.
pub fn compute_aggregates(query: &Query, records: &[Record]) -> HashMap<String, Value> {
    query
        .aggregates()
        .map(|(field, kind)| (kind.key(field), kind.compute(field, records)))
        .collect()
}

impl Query {
    /// Evaluates this query over `records`.
    ///
    /// Order: where, search, sort (stable, one pass per clause so later
    /// clauses take precedence), aggregates over the filtered set, count,
    /// then the page slice.
    pub fn execute_local(&self, records: &[Record]) -> DataResult {
        let mut rows: Vec<Record> = records
            .iter()
            .filter(|r| self.predicates().all(|p| p.matches(r)))
            .cloned()
            .collect();

        for clause in self.clauses() {
            if matches!(clause, Clause::Search { .. }) {
                // Search over every field considers each record's own fields.
                rows.retain(|r| search_predicate(clause, Some(r)).is_some_and(|p| p.matches(r)));
            }
        }

        for clause in self.clauses() {
            if let Clause::SortBy {
                field,
                direction,
                comparer,
            } = clause
            {
                rows.sort_by(|a, b| {
                    let ordering = match comparer {
                        Some(c) => c.compare(a.get(field), b.get(field)),
                        None => a.get(field).compare(b.get(field)),
                    };
                    direction.apply(ordering)
                });
            }
        }

        let aggregates = compute_aggregates(self, &rows);
        let count = rows.len();

        if let Some((index, size)) = self.page_clause() {
            let skip = index.saturating_sub(1).saturating_mul(size);
            rows = rows.into_iter().skip(skip).take(size).collect();
        }

        log::debug!(
            "[query] local evaluation: {} of {} records (count {})",
            rows.len(),
            records.len(),
            count
        );

        DataResult {
            result: rows,
            count,
            aggregates,
        }
    }
}
