//! Query composition and evaluation.
//!
//! A [`Query`] is an ordered clause list. [`QueryBuilder`] derives one from
//! grid settings; [`Query::execute_local`] evaluates it in memory and
//! [`odata`] renders it as an OData query string.

mod aggregate;
mod builder;
mod eval;
mod fold;
pub mod odata;
mod order;
mod predicate;

pub use aggregate::*;
pub use builder::*;
pub use eval::*;
pub use fold::fold_accents;
pub use order::*;
pub use predicate::*;

/// One step of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Order by a field. Clauses later in the list take precedence.
    SortBy {
        field: String,
        direction: Direction,
        comparer: Option<Comparer>,
    },
    /// Keep records matching the predicate.
    Where(Predicate),
    /// Keep records where any of `fields` (all fields when empty) matches `key`.
    Search {
        key: String,
        fields: Vec<String>,
        operator: FilterOperator,
        ignore_case: bool,
        ignore_accent: bool,
    },
    /// Compute a summary over the filtered set.
    Aggregate { field: String, kind: AggregateKind },
    /// Take page `index` (1-based) of `size` records.
    Page { index: usize, size: usize },
    /// Report the total filtered count.
    RequiresCount,
}

/// Discriminant of a [`Clause`], for comparing clause sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    SortBy,
    Where,
    Search,
    Aggregate,
    Page,
    RequiresCount,
}

impl Clause {
    pub fn kind(&self) -> ClauseKind {
        match self {
            Clause::SortBy { .. } => ClauseKind::SortBy,
            Clause::Where(_) => ClauseKind::Where,
            Clause::Search { .. } => ClauseKind::Search,
            Clause::Aggregate { .. } => ClauseKind::Aggregate,
            Clause::Page { .. } => ClauseKind::Page,
            Clause::RequiresCount => ClauseKind::RequiresCount,
        }
    }
}

/// An ordered list of query clauses with an optional table reference.
///
/// # Example
///
/// ```
/// use datagrid_lib::query::{Direction, Predicate, Query};
///
/// let query = Query::from_table("Orders")
///     .filter(Predicate::contains("ShipCountry", "France").ignore_case(true))
///     .sort_by("OrderDate", Direction::Descending)
///     .page(2, 12)
///     .requires_count();
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    table: Option<String>,
    clauses: Vec<Clause>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_table(table: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            clauses: Vec::new(),
        }
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn set_table(&mut self, table: Option<String>) {
        self.table = table;
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Clause kinds in order.
    pub fn shape(&self) -> Vec<ClauseKind> {
        self.clauses.iter().map(Clause::kind).collect()
    }

    pub fn push(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn sort_by(self, field: impl Into<String>, direction: Direction) -> Self {
        self.push(Clause::SortBy {
            field: field.into(),
            direction,
            comparer: None,
        })
    }

    pub fn sort_by_with(self, field: impl Into<String>, direction: Direction, comparer: Comparer) -> Self {
        self.push(Clause::SortBy {
            field: field.into(),
            direction,
            comparer: Some(comparer),
        })
    }

    pub fn filter(self, predicate: Predicate) -> Self {
        self.push(Clause::Where(predicate))
    }

    /// Adds a `contains` search over `fields` (all fields when empty).
    pub fn search(self, key: impl Into<String>, fields: Vec<String>, ignore_case: bool) -> Self {
        self.push(Clause::Search {
            key: key.into(),
            fields,
            operator: FilterOperator::Contains,
            ignore_case,
            ignore_accent: false,
        })
    }

    pub fn aggregate(self, field: impl Into<String>, kind: AggregateKind) -> Self {
        self.push(Clause::Aggregate {
            field: field.into(),
            kind,
        })
    }

    /// Sets the page, replacing any earlier page clause.
    pub fn page(mut self, index: usize, size: usize) -> Self {
        self.clauses.retain(|c| !matches!(c, Clause::Page { .. }));
        self.push(Clause::Page { index, size })
    }

    /// A copy without page and count clauses, for reads over the whole
    /// filtered set.
    pub fn unpaged(&self) -> Self {
        Self {
            table: self.table.clone(),
            clauses: self
                .clauses
                .iter()
                .filter(|c| !matches!(c, Clause::Page { .. } | Clause::RequiresCount))
                .cloned()
                .collect(),
        }
    }

    pub fn requires_count(mut self) -> Self {
        if !self.is_count_required() {
            self.clauses.push(Clause::RequiresCount);
        }
        self
    }

    /// `(index, size)` of the page clause.
    pub fn page_clause(&self) -> Option<(usize, usize)> {
        self.clauses.iter().find_map(|c| match c {
            Clause::Page { index, size } => Some((*index, *size)),
            _ => None,
        })
    }

    pub fn is_count_required(&self) -> bool {
        self.clauses.iter().any(|c| matches!(c, Clause::RequiresCount))
    }

    /// All `Where` predicates.
    pub fn predicates(&self) -> impl Iterator<Item = &Predicate> {
        self.clauses.iter().filter_map(|c| match c {
            Clause::Where(p) => Some(p),
            _ => None,
        })
    }

    /// `(field, kind)` of every aggregate clause.
    pub fn aggregates(&self) -> impl Iterator<Item = (&str, AggregateKind)> {
        self.clauses.iter().filter_map(|c| match c {
            Clause::Aggregate { field, kind } => Some((field.as_str(), *kind)),
            _ => None,
        })
    }
}
