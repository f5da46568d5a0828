//! Composes a [`Query`] from grid settings.

use chrono::Days;
use chrono::NaiveDate;

use super::AggregateKind;
use super::Clause;
use super::Condition;
use super::FilterOperator;
use super::Predicate;
use super::Query;
use crate::model::Column;
use crate::model::Value;
use crate::settings::FilterDescriptor;
use crate::settings::GridSettings;
use crate::settings::PageSettings;
use crate::source::Protocol;

/// Builds the query for the current settings snapshot.
///
/// Stages always run in the same order: sort, filter, search, aggregate,
/// page. Identical inputs yield identical clause sequences.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Column;
/// use datagrid_lib::query::QueryBuilder;
/// use datagrid_lib::settings::GridSettings;
/// use datagrid_lib::source::Protocol;
///
/// let columns = vec![Column::new("OrderID"), Column::new("ShipCountry")];
/// let settings = GridSettings::default();
/// let query = QueryBuilder::new(&columns, &settings)
///     .protocol(Protocol::ODataV4)
///     .table("Orders")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder<'a> {
    columns: &'a [Column],
    settings: &'a GridSettings,
    protocol: Protocol,
    table: Option<String>,
    skip_page: bool,
    requires_count: bool,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(columns: &'a [Column], settings: &'a GridSettings) -> Self {
        Self {
            columns,
            settings,
            protocol: Protocol::Local,
            table: None,
            skip_page: false,
            requires_count: false,
        }
    }

    /// Protocol of the target source. Custom comparers and the search
    /// rendering depend on it.
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn maybe_table(mut self, table: Option<&str>) -> Self {
        self.table = table.map(String::from);
        self
    }

    /// Omit the page stage.
    pub fn skip_page(mut self, skip: bool) -> Self {
        self.skip_page = skip;
        self
    }

    /// Append a `RequiresCount` clause.
    pub fn requires_count(mut self, required: bool) -> Self {
        self.requires_count = required;
        self
    }

    pub fn build(&self) -> Query {
        let mut query = Query::new();
        query.set_table(self.table.clone());

        let query = self.sort_stage(query);
        let query = self.filter_stage(query);
        let query = self.search_stage(query);
        let query = self.aggregate_stage(query);
        let mut query = self.page_stage(query);
        if self.requires_count {
            query = query.requires_count();
        }

        log::debug!("[query] built {:?} for {:?}", query.shape(), self.protocol);
        query
    }

    fn column(&self, field: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.field == field)
    }

    // =========================================================================
    // Stages
    // =========================================================================

    fn sort_stage(&self, mut query: Query) -> Query {
        // Most recently added descriptor first, so it ends up lowest precedence.
        for descriptor in self.settings.sort_settings.columns.iter().rev() {
            let comparer = if self.protocol.is_local() {
                self.column(&descriptor.field).and_then(|c| c.sort_comparer.clone())
            } else {
                None
            };
            query = query.push(Clause::SortBy {
                field: descriptor.field.clone(),
                direction: descriptor.direction,
                comparer,
            });
        }
        query
    }

    fn filter_stage(&self, query: Query) -> Query {
        let filter = &self.settings.filter_settings;
        if !filter.enabled || filter.columns.is_empty() {
            return query;
        }

        let mut groups: Vec<(&str, Predicate)> = Vec::new();
        for descriptor in &filter.columns {
            let predicate = self.descriptor_predicate(descriptor);
            if let Some(i) = groups.iter().position(|(field, _)| *field == descriptor.field) {
                let existing = std::mem::replace(&mut groups[i].1, Predicate::And(Vec::new()));
                groups[i].1 = existing.link(descriptor.predicate, predicate);
            } else {
                groups.push((descriptor.field.as_str(), predicate));
            }
        }

        let mut predicates: Vec<Predicate> = groups.into_iter().map(|(_, p)| p).collect();
        let combined = if predicates.len() == 1 {
            predicates.remove(0)
        } else {
            Predicate::And(predicates)
        };
        query.filter(combined)
    }

    fn descriptor_predicate(&self, descriptor: &FilterDescriptor) -> Predicate {
        let is_date_column = self
            .column(&descriptor.field)
            .is_some_and(|c| c.column_type.is_date());
        let day = if is_date_column || matches!(descriptor.value, Value::Date(_) | Value::DateTime(_)) {
            descriptor.value.as_date()
        } else {
            None
        };

        let condition = |operator: FilterOperator, value: Value| {
            Predicate::Condition(Condition {
                field: descriptor.field.clone(),
                operator,
                value,
                ignore_case: !descriptor.case_sensitive,
                ignore_accent: descriptor.ignore_accent,
            })
        };

        match day {
            Some(day) => date_range_predicate(day, descriptor.operator, &condition)
                .unwrap_or_else(|| condition(descriptor.operator, descriptor.value.clone())),
            None => condition(descriptor.operator, descriptor.value.clone()),
        }
    }

    fn search_stage(&self, query: Query) -> Query {
        let search = &self.settings.search_settings;
        if !search.enabled || search.value.is_empty() {
            return query;
        }

        let fields: Vec<String> = if search.fields.is_empty() {
            self.columns
                .iter()
                .filter(|c| c.allow_searching)
                .map(|c| c.field.clone())
                .collect()
        } else {
            search.fields.clone()
        };

        if self.protocol == Protocol::ODataV4 {
            if fields.is_empty() {
                log::debug!("[query] no searchable fields, search '{}' skipped", search.value);
                return query;
            }
            let per_field = fields
                .into_iter()
                .map(|field| {
                    Predicate::Condition(Condition {
                        field,
                        operator: search.operator,
                        value: Value::String(search.value.clone()),
                        ignore_case: search.ignore_case,
                        ignore_accent: search.ignore_accent,
                    })
                })
                .collect::<Vec<_>>();
            return query.filter(Predicate::Or(per_field));
        }

        query.push(Clause::Search {
            key: search.value.clone(),
            fields,
            operator: search.operator,
            ignore_case: search.ignore_case,
            ignore_accent: search.ignore_accent,
        })
    }

    fn aggregate_stage(&self, mut query: Query) -> Query {
        let aggregates = &self.settings.aggregate_settings;
        if !aggregates.enabled {
            return query;
        }
        let mut seen: Vec<(&str, AggregateKind)> = Vec::new();
        for row in &aggregates.rows {
            for column in &row.columns {
                for kind in &column.types {
                    let pair = (column.field.as_str(), *kind);
                    if !seen.contains(&pair) {
                        seen.push(pair);
                        query = query.aggregate(column.field.clone(), *kind);
                    }
                }
            }
        }
        query
    }

    fn page_stage(&self, query: Query) -> Query {
        let page = &self.settings.page_settings;
        if !page.enabled || self.skip_page {
            return query;
        }
        let size = if page.page_size < 1 {
            PageSettings::DEFAULT_PAGE_SIZE
        } else {
            page.page_size
        };
        query.page(page.current_page.max(1), size)
    }
}

/// Day-range rendering of a date comparison: a date matches the whole day
/// `[day 00:00, next day 00:00)`. `None` for operators without date semantics.
fn date_range_predicate(
    day: NaiveDate,
    operator: FilterOperator,
    condition: impl Fn(FilterOperator, Value) -> Predicate,
) -> Option<Predicate> {
    let start = day.and_hms_opt(0, 0, 0)?.and_utc();
    let next = day.checked_add_days(Days::new(1))?.and_hms_opt(0, 0, 0)?.and_utc();
    let start = Value::DateTime(start);
    let next = Value::DateTime(next);

    let predicate = match operator {
        FilterOperator::Equal => Predicate::And(vec![
            condition(FilterOperator::GreaterThanOrEqual, start),
            condition(FilterOperator::LessThan, next),
        ]),
        FilterOperator::NotEqual => Predicate::Or(vec![
            condition(FilterOperator::LessThan, start),
            condition(FilterOperator::GreaterThanOrEqual, next),
        ]),
        FilterOperator::GreaterThan => condition(FilterOperator::GreaterThanOrEqual, next),
        FilterOperator::GreaterThanOrEqual => condition(FilterOperator::GreaterThanOrEqual, start),
        FilterOperator::LessThan => condition(FilterOperator::LessThan, start),
        FilterOperator::LessThanOrEqual => condition(FilterOperator::LessThan, next),
        _ => return None,
    };
    Some(predicate)
}
