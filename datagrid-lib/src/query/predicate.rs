//! Filter predicates.

use std::fmt;
use std::str::FromStr;

use regex::RegexBuilder;
use serde::Deserialize;
use serde::Serialize;

use super::fold::fold_accents;
use crate::error::ConfigError;
use crate::model::Record;
use crate::model::Value;

/// Comparison performed by a single [`Condition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    StartsWith,
    EndsWith,
    Contains,
    DoesNotContain,
    DoesNotStartWith,
    DoesNotEndWith,
    IsNull,
    IsNotNull,
    IsEmpty,
    IsNotEmpty,
    /// SQL-style pattern: `%` matches any run, `_` one character.
    Like,
    /// Glob pattern: `*` matches any run, `?` one character.
    Wildcard,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 18] = [
        FilterOperator::Equal,
        FilterOperator::NotEqual,
        FilterOperator::GreaterThan,
        FilterOperator::GreaterThanOrEqual,
        FilterOperator::LessThan,
        FilterOperator::LessThanOrEqual,
        FilterOperator::StartsWith,
        FilterOperator::EndsWith,
        FilterOperator::Contains,
        FilterOperator::DoesNotContain,
        FilterOperator::DoesNotStartWith,
        FilterOperator::DoesNotEndWith,
        FilterOperator::IsNull,
        FilterOperator::IsNotNull,
        FilterOperator::IsEmpty,
        FilterOperator::IsNotEmpty,
        FilterOperator::Like,
        FilterOperator::Wildcard,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Equal => "equal",
            FilterOperator::NotEqual => "notequal",
            FilterOperator::GreaterThan => "greaterthan",
            FilterOperator::GreaterThanOrEqual => "greaterthanorequal",
            FilterOperator::LessThan => "lessthan",
            FilterOperator::LessThanOrEqual => "lessthanorequal",
            FilterOperator::StartsWith => "startswith",
            FilterOperator::EndsWith => "endswith",
            FilterOperator::Contains => "contains",
            FilterOperator::DoesNotContain => "doesnotcontain",
            FilterOperator::DoesNotStartWith => "doesnotstartwith",
            FilterOperator::DoesNotEndWith => "doesnotendwith",
            FilterOperator::IsNull => "isnull",
            FilterOperator::IsNotNull => "isnotnull",
            FilterOperator::IsEmpty => "isempty",
            FilterOperator::IsNotEmpty => "isnotempty",
            FilterOperator::Like => "like",
            FilterOperator::Wildcard => "wildcard",
        }
    }

    /// Operators that ignore the condition value.
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            FilterOperator::IsNull
                | FilterOperator::IsNotNull
                | FilterOperator::IsEmpty
                | FilterOperator::IsNotEmpty
        )
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == lower)
            .ok_or_else(|| ConfigError::UnknownOperator(s.to_string()))
    }
}

/// How a filter descriptor joins the previous descriptor on the same field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    #[default]
    And,
    Or,
}

/// A single `field operator value` test.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Value,
    pub ignore_case: bool,
    pub ignore_accent: bool,
}

impl Condition {
    /// Evaluates the condition against one record.
    pub fn matches(&self, record: &Record) -> bool {
        let actual = record.get(&self.field);
        match self.operator {
            FilterOperator::IsNull => actual.is_null(),
            FilterOperator::IsNotNull => !actual.is_null(),
            FilterOperator::IsEmpty => actual.is_empty(),
            FilterOperator::IsNotEmpty => !actual.is_empty(),
            FilterOperator::Equal => self.equals(actual),
            FilterOperator::NotEqual => !self.equals(actual),
            FilterOperator::GreaterThan => self.ordered(actual, |o| o.is_gt()),
            FilterOperator::GreaterThanOrEqual => self.ordered(actual, |o| o.is_ge()),
            FilterOperator::LessThan => self.ordered(actual, |o| o.is_lt()),
            FilterOperator::LessThanOrEqual => self.ordered(actual, |o| o.is_le()),
            FilterOperator::StartsWith => self.text(actual, |a, e| a.starts_with(e)),
            FilterOperator::EndsWith => self.text(actual, |a, e| a.ends_with(e)),
            FilterOperator::Contains => self.text(actual, |a, e| a.contains(e)),
            FilterOperator::DoesNotStartWith => !self.text(actual, |a, e| a.starts_with(e)),
            FilterOperator::DoesNotEndWith => !self.text(actual, |a, e| a.ends_with(e)),
            FilterOperator::DoesNotContain => !self.text(actual, |a, e| a.contains(e)),
            FilterOperator::Like => self.pattern(actual, '%', '_'),
            FilterOperator::Wildcard => self.pattern(actual, '*', '?'),
        }
    }

    fn normalize(&self, s: &str) -> String {
        let s = if self.ignore_accent {
            fold_accents(s)
        } else {
            s.into()
        };
        if self.ignore_case {
            s.to_lowercase()
        } else {
            s.into_owned()
        }
    }

    fn equals(&self, actual: &Value) -> bool {
        match (actual, &self.value) {
            (Value::String(a), Value::String(e)) => self.normalize(a) == self.normalize(e),
            _ => actual.compare(&self.value).is_eq(),
        }
    }

    fn ordered(&self, actual: &Value, test: impl Fn(std::cmp::Ordering) -> bool) -> bool {
        if actual.is_null() || self.value.is_null() {
            return false;
        }
        match (actual, &self.value) {
            (Value::String(a), Value::String(e)) => test(self.normalize(a).cmp(&self.normalize(e))),
            _ => test(actual.compare(&self.value)),
        }
    }

    fn text(&self, actual: &Value, test: impl Fn(&str, &str) -> bool) -> bool {
        if actual.is_null() {
            return false;
        }
        test(
            &self.normalize(&actual.to_string()),
            &self.normalize(&self.value.to_string()),
        )
    }

    fn pattern(&self, actual: &Value, any: char, one: char) -> bool {
        if actual.is_null() {
            return false;
        }
        let mut expr = String::from("^");
        for c in self.normalize(&self.value.to_string()).chars() {
            if c == any {
                expr.push_str(".*");
            } else if c == one {
                expr.push('.');
            } else {
                expr.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
            }
        }
        expr.push('$');
        match RegexBuilder::new(&expr).dot_matches_new_line(true).build() {
            Ok(re) => re.is_match(&self.normalize(&actual.to_string())),
            Err(e) => {
                log::warn!("[query] invalid {} pattern {:?}: {}", self.operator, self.value, e);
                false
            }
        }
    }
}

/// A composable filter condition.
///
/// # Example
///
/// ```
/// use datagrid_lib::query::Predicate;
///
/// let france_or_spain = Predicate::eq("ShipCountry", "France")
///     .or_else(Predicate::eq("ShipCountry", "Spain"));
///
/// let heavy = Predicate::gt("Freight", 50.0).and_also(france_or_spain);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Condition(Condition),
    /// Logical AND of multiple predicates.
    And(Vec<Predicate>),
    /// Logical OR of multiple predicates.
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Creates a case-sensitive condition.
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<Value>) -> Self {
        Predicate::Condition(Condition {
            field: field.into(),
            operator,
            value: value.into(),
            ignore_case: false,
            ignore_accent: false,
        })
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::Equal, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::NotEqual, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::GreaterThan, value)
    }

    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::GreaterThanOrEqual, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::LessThan, value)
    }

    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOperator::LessThanOrEqual, value)
    }

    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Contains, value.into())
    }

    pub fn starts_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::StartsWith, value.into())
    }

    pub fn ends_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::EndsWith, value.into())
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::IsNull, Value::Null)
    }

    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::IsNotNull, Value::Null)
    }

    pub fn and(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::And(predicates.into_iter().collect())
    }

    pub fn or(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Or(predicates.into_iter().collect())
    }

    /// Sets case-insensitivity on every condition in this predicate.
    pub fn ignore_case(mut self, ignore: bool) -> Self {
        self.for_each_condition(&mut |c| c.ignore_case = ignore);
        self
    }

    /// Sets accent-insensitivity on every condition in this predicate.
    pub fn ignore_accent(mut self, ignore: bool) -> Self {
        self.for_each_condition(&mut |c| c.ignore_accent = ignore);
        self
    }

    fn for_each_condition(&mut self, f: &mut impl FnMut(&mut Condition)) {
        match self {
            Predicate::Condition(c) => f(c),
            Predicate::And(items) | Predicate::Or(items) => {
                for item in items {
                    item.for_each_condition(f);
                }
            }
        }
    }

    /// Combines this predicate with another using logical AND.
    pub fn and_also(self, other: Predicate) -> Self {
        match self {
            Predicate::And(mut items) => {
                items.push(other);
                Predicate::And(items)
            }
            _ => Predicate::And(vec![self, other]),
        }
    }

    /// Combines this predicate with another using logical OR.
    pub fn or_else(self, other: Predicate) -> Self {
        match self {
            Predicate::Or(mut items) => {
                items.push(other);
                Predicate::Or(items)
            }
            _ => Predicate::Or(vec![self, other]),
        }
    }

    /// Joins `other` according to `linkage`.
    pub fn link(self, linkage: Linkage, other: Predicate) -> Self {
        match linkage {
            Linkage::And => self.and_also(other),
            Linkage::Or => self.or_else(other),
        }
    }

    /// Evaluates against one record. An empty `And` is true, an empty `Or` false.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::Condition(c) => c.matches(record),
            Predicate::And(items) => items.iter().all(|p| p.matches(record)),
            Predicate::Or(items) => items.iter().any(|p| p.matches(record)),
        }
    }

    /// Fields referenced by this predicate, in first-appearance order.
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::Condition(c) => {
                if !out.contains(&c.field.as_str()) {
                    out.push(&c.field);
                }
            }
            Predicate::And(items) | Predicate::Or(items) => {
                for item in items {
                    item.collect_fields(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Record {
        Record::new()
            .set("ShipCountry", "France")
            .set("ShipCity", "Reims")
            .set("ShipName", "Vins et alcools Chevalier")
            .set("Freight", 32.38)
            .set("ShipRegion", Value::Null)
    }

    #[test]
    fn test_operator_names_parse() {
        for op in FilterOperator::ALL {
            assert_eq!(op.as_str().parse::<FilterOperator>().unwrap(), op);
        }
        assert_eq!("StartsWith".parse::<FilterOperator>().unwrap(), FilterOperator::StartsWith);
        assert!("between".parse::<FilterOperator>().is_err());
    }

    #[test]
    fn test_case_sensitivity() {
        assert!(!Predicate::eq("ShipCountry", "france").matches(&order()));
        assert!(Predicate::eq("ShipCountry", "france").ignore_case(true).matches(&order()));
        assert!(Predicate::contains("ShipCountry", "RAN").ignore_case(true).matches(&order()));
    }

    #[test]
    fn test_accent_folding() {
        let r = Record::new().set("City", "Montréal");
        assert!(!Predicate::eq("City", "Montreal").matches(&r));
        assert!(Predicate::eq("City", "Montreal").ignore_accent(true).matches(&r));
    }

    #[test]
    fn test_comparisons_skip_nulls() {
        assert!(Predicate::gt("Freight", 30).matches(&order()));
        assert!(!Predicate::gt("ShipRegion", 0).matches(&order()));
        assert!(!Predicate::lt("ShipRegion", 0).matches(&order()));
    }

    #[test]
    fn test_null_and_empty_operators() {
        let r = order().set("Empty", "");
        assert!(Predicate::is_null("ShipRegion").matches(&r));
        assert!(Predicate::is_not_null("ShipCity").matches(&r));
        assert!(Predicate::new("Empty", FilterOperator::IsEmpty, Value::Null).matches(&r));
        assert!(Predicate::new("ShipRegion", FilterOperator::IsEmpty, Value::Null).matches(&r));
        assert!(Predicate::new("ShipCity", FilterOperator::IsNotEmpty, Value::Null).matches(&r));
    }

    #[test]
    fn test_negated_string_operators() {
        assert!(Predicate::new("ShipCity", FilterOperator::DoesNotContain, "xyz").matches(&order()));
        assert!(!Predicate::new("ShipCity", FilterOperator::DoesNotStartWith, "Re").matches(&order()));
        assert!(Predicate::new("ShipCity", FilterOperator::DoesNotEndWith, "Re").matches(&order()));
    }

    #[test]
    fn test_like_and_wildcard() {
        assert!(Predicate::new("ShipName", FilterOperator::Like, "Vins%").matches(&order()));
        assert!(Predicate::new("ShipName", FilterOperator::Like, "%alcools%").matches(&order()));
        assert!(Predicate::new("ShipCity", FilterOperator::Like, "R_ims").matches(&order()));
        assert!(!Predicate::new("ShipCity", FilterOperator::Like, "R_ms").matches(&order()));
        assert!(Predicate::new("ShipCity", FilterOperator::Wildcard, "*ei?s").matches(&order()));
        assert!(Predicate::new("ShipCity", FilterOperator::Wildcard, "re*").ignore_case(true).matches(&order()));
        // Regex metacharacters in the pattern are literal.
        let r = Record::new().set("Code", "a.b");
        assert!(!Predicate::new("Code", FilterOperator::Wildcard, "a.c").matches(&r));
    }

    #[test]
    fn test_combinators() {
        let p = Predicate::eq("ShipCountry", "Spain").or_else(Predicate::eq("ShipCity", "Reims"));
        assert!(p.matches(&order()));
        let p = p.and_also(Predicate::lt("Freight", 10));
        assert!(!p.matches(&order()));
        assert!(Predicate::and([]).matches(&order()));
        assert!(!Predicate::or([]).matches(&order()));
    }

    #[test]
    fn test_fields_in_first_appearance_order() {
        let p = Predicate::eq("b", 1).and_also(Predicate::eq("a", 1)).and_also(Predicate::eq("b", 2));
        assert_eq!(p.fields(), vec!["b", "a"]);
    }
}
