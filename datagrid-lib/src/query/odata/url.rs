//! OData URL and query string generation.

use chrono::SecondsFormat;

use crate::error::SourceError;
use crate::model::Value;
use crate::query::Clause;
use crate::query::Condition;
use crate::query::FilterOperator;
use crate::query::Predicate;
use crate::query::Query;
use crate::query::eval::search_predicate;
use crate::source::Protocol;

/// Converts a `Predicate` to an OData `$filter` expression.
pub fn predicate_to_odata(predicate: &Predicate, protocol: Protocol) -> Result<String, SourceError> {
    match predicate {
        Predicate::Condition(c) => condition_to_odata(c, protocol),
        Predicate::And(items) => join(items, " and ", protocol),
        Predicate::Or(items) => join(items, " or ", protocol),
    }
}

fn join(items: &[Predicate], op: &str, protocol: Protocol) -> Result<String, SourceError> {
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        let part = predicate_to_odata(item, protocol)?;
        if !part.is_empty() {
            parts.push(part);
        }
    }
    Ok(conjunction(parts, op))
}

fn conjunction(mut parts: Vec<String>, op: &str) -> String {
    match parts.len() {
        0 => String::new(),
        1 => parts.remove(0),
        _ => format!("({})", parts.join(op)),
    }
}

/// Converts a single condition to an OData expression.
///
/// Case-insensitive string conditions compare `tolower(field)` against a
/// lowercased literal.
pub fn condition_to_odata(c: &Condition, protocol: Protocol) -> Result<String, SourceError> {
    let fold = c.ignore_case && matches!(c.value, Value::String(_));
    let field = if fold {
        format!("tolower({})", c.field)
    } else {
        c.field.clone()
    };
    let value = match (&c.value, fold) {
        (Value::String(s), true) => value_to_odata(&Value::String(s.to_lowercase()), protocol),
        (v, _) => value_to_odata(v, protocol),
    };
    let text = |s: &str| {
        let s = if fold { s.to_lowercase() } else { s.to_string() };
        escape_string(&s)
    };

    let expr = match c.operator {
        FilterOperator::Equal => format!("{} eq {}", field, value),
        FilterOperator::NotEqual => format!("{} ne {}", field, value),
        FilterOperator::GreaterThan => format!("{} gt {}", field, value),
        FilterOperator::GreaterThanOrEqual => format!("{} ge {}", field, value),
        FilterOperator::LessThan => format!("{} lt {}", field, value),
        FilterOperator::LessThanOrEqual => format!("{} le {}", field, value),
        FilterOperator::StartsWith => starts_with(&field, &text(&c.value.to_string())),
        FilterOperator::EndsWith => ends_with(&field, &text(&c.value.to_string())),
        FilterOperator::Contains => contains(&field, &text(&c.value.to_string()), protocol),
        FilterOperator::DoesNotStartWith => {
            format!("not {}", starts_with(&field, &text(&c.value.to_string())))
        }
        FilterOperator::DoesNotEndWith => {
            format!("not {}", ends_with(&field, &text(&c.value.to_string())))
        }
        FilterOperator::DoesNotContain => {
            format!("not {}", contains(&field, &text(&c.value.to_string()), protocol))
        }
        FilterOperator::IsNull => format!("{} eq null", c.field),
        FilterOperator::IsNotNull => format!("{} ne null", c.field),
        FilterOperator::IsEmpty => format!("{} eq ''", c.field),
        FilterOperator::IsNotEmpty => format!("{} ne ''", c.field),
        FilterOperator::Like => return pattern(&field, &c.value.to_string(), ('%', '_'), fold, protocol),
        FilterOperator::Wildcard => return pattern(&field, &c.value.to_string(), ('*', '?'), fold, protocol),
    };
    Ok(expr)
}

fn starts_with(field: &str, literal: &str) -> String {
    format!("startswith({},{})", field, literal)
}

fn ends_with(field: &str, literal: &str) -> String {
    format!("endswith({},{})", field, literal)
}

fn contains(field: &str, literal: &str, protocol: Protocol) -> String {
    if protocol == Protocol::OData {
        format!("substringof({},{})", literal, field)
    } else {
        format!("contains({},{})", field, literal)
    }
}

/// Most multi-character wildcards allowed between a pattern's first and last
/// segment; each one nests the remaining-text expression again.
const MAX_INNER_SEGMENTS: usize = 3;

/// A pattern piece between multi-character wildcards. `None` stands for the
/// single-character wildcard.
type Segment = Vec<Option<char>>;

/// Translates a like/wildcard pattern into string functions.
///
/// The first segment is anchored at the start and the last at the end, both
/// checked with `startswith`/`endswith` or positional `substring` when they
/// hold single-character wildcards. Inner segments are found in order with
/// chained `indexof`. Inner segments with single-character wildcards have no
/// OData equivalent and are rejected.
fn pattern(
    field: &str,
    pattern: &str,
    (any, one): (char, char),
    fold: bool,
    protocol: Protocol,
) -> Result<String, SourceError> {
    let pattern = if fold { pattern.to_lowercase() } else { pattern.to_string() };
    let segments: Vec<Segment> = pattern
        .split(any)
        .map(|s| s.chars().map(|ch| (ch != one).then_some(ch)).collect())
        .collect();
    let Some((first, rest)) = segments.split_first() else {
        return Ok(String::new());
    };

    let Some((last, inner)) = rest.split_last() else {
        if let Some(text) = literal(first) {
            return Ok(format!("{} eq {}", field, escape_string(&text)));
        }
        let mut parts = vec![format!("length({}) eq {}", field, first.len())];
        parts.extend(runs(first).map(|(at, text)| substring_eq(field, &at.to_string(), &text)));
        return Ok(conjunction(parts, " and "));
    };

    let inner: Vec<&Segment> = inner.iter().filter(|s| !s.is_empty()).collect();
    let anchored = [first, last].into_iter().filter(|s| !s.is_empty()).count();
    if inner.len() == 1 && anchored == 0 {
        if let Some(text) = literal(inner[0]) {
            return Ok(contains(field, &escape_string(&text), protocol));
        }
    }
    if inner.len() > MAX_INNER_SEGMENTS || inner.iter().any(|s| s.contains(&None)) {
        return Err(SourceError::UnsupportedFilter(format!(
            "pattern '{}' on {}",
            pattern, field
        )));
    }

    let mut parts = Vec::new();
    let has_one = first.contains(&None) || last.contains(&None);
    if inner.len() + anchored > 1 || has_one {
        let total: usize = segments.iter().map(Vec::len).sum();
        parts.push(format!("length({}) ge {}", field, total));
    }

    match literal(first) {
        Some(text) if !text.is_empty() => parts.push(starts_with(field, &escape_string(&text))),
        Some(_) => {}
        None => parts.extend(runs(first).map(|(at, text)| substring_eq(field, &at.to_string(), &text))),
    }
    match literal(last) {
        Some(text) if !text.is_empty() => parts.push(ends_with(field, &escape_string(&text))),
        Some(_) => {}
        None => parts.extend(runs(last).map(|(at, text)| {
            let from_end = format!("length({}) sub {}", field, last.len() - at);
            substring_eq(field, &from_end, &text)
        })),
    }

    // Leftmost matches leave the longest remainder for the last segment.
    let mut remainder = format!("substring({},{})", field, first.len());
    for segment in &inner {
        let text: String = segment.iter().flatten().collect();
        let found = format!("indexof({},{})", remainder, escape_string(&text));
        parts.push(format!("{} ge 0", found));
        remainder = format!("substring({},{} add {})", remainder, found, segment.len());
    }
    if !inner.is_empty() && !last.is_empty() {
        parts.push(format!("length({}) ge {}", remainder, last.len()));
    }

    Ok(conjunction(parts, " and "))
}

/// The segment's text when it holds no single-character wildcard.
fn literal(segment: &Segment) -> Option<String> {
    segment.iter().copied().collect()
}

/// Maximal literal runs of a segment with their character offsets.
fn runs(segment: &Segment) -> impl Iterator<Item = (usize, String)> + '_ {
    segment
        .split(Option::is_none)
        .scan(0, |offset, run| {
            let at = *offset;
            *offset += run.len() + 1;
            Some((at, run.iter().flatten().collect::<String>()))
        })
        .filter(|(_, text)| !text.is_empty())
}

fn substring_eq(field: &str, at: &str, text: &str) -> String {
    format!(
        "substring({},{},{}) eq {}",
        field,
        at,
        text.chars().count(),
        escape_string(text)
    )
}

/// Converts a `Value` to an OData literal representation.
pub fn value_to_odata(value: &Value, protocol: Protocol) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(n) => {
            // OData needs a decimal point on doubles
            let s = n.to_string();
            if s.contains('.') || s.contains('e') || s.contains('E') {
                s
            } else {
                format!("{}.0", s)
            }
        }
        Value::String(s) => escape_string(s),
        Value::DateTime(dt) => {
            if protocol == Protocol::OData {
                format!("datetime'{}'", dt.format("%Y-%m-%dT%H:%M:%S"))
            } else {
                dt.to_rfc3339_opts(SecondsFormat::Secs, true)
            }
        }
        Value::Date(d) => {
            if protocol == Protocol::OData {
                format!("datetime'{}T00:00:00'", d.format("%Y-%m-%d"))
            } else {
                d.format("%Y-%m-%d").to_string()
            }
        }
    }
}

/// Converts the sort clauses of a query to an OData `$orderby` expression.
///
/// Later sort clauses take precedence, so they are listed first.
pub fn order_to_odata(query: &Query) -> Option<String> {
    let parts: Vec<_> = query
        .clauses()
        .iter()
        .rev()
        .filter_map(|c| match c {
            Clause::SortBy { field, direction, .. } => {
                Some(format!("{} {}", field, direction.as_odata()))
            }
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(","))
    }
}

/// Combined `$filter` expression of every `Where` and `Search` clause.
///
/// A search renders as an OR of per-field tests using its operator.
pub fn filter_to_odata(query: &Query, protocol: Protocol) -> Result<Option<String>, SourceError> {
    let mut parts = Vec::new();
    for clause in query.clauses() {
        let part = match clause {
            Clause::Where(p) => predicate_to_odata(p, protocol)?,
            // A search over no listed fields has nothing to render remotely.
            Clause::Search { .. } => match search_predicate(clause, None) {
                Some(p) => predicate_to_odata(&p, protocol)?,
                None => continue,
            },
            _ => continue,
        };
        if !part.is_empty() {
            parts.push(part);
        }
    }
    Ok(match parts.len() {
        0 => None,
        _ => Some(parts.join(" and ")),
    })
}

/// Builds the query string (without the leading `?`) for a query.
///
/// # Example
///
/// ```
/// use datagrid_lib::query::{odata, Direction, Query};
/// use datagrid_lib::source::Protocol;
///
/// let query = Query::new().sort_by("Freight", Direction::Descending).page(2, 10);
/// assert_eq!(
///     odata::query_string(&query, Protocol::ODataV4).unwrap(),
///     "$orderby=Freight%20desc&$skip=10&$top=10"
/// );
/// ```
pub fn query_string(query: &Query, protocol: Protocol) -> Result<String, SourceError> {
    let mut params = Vec::new();
    if let Some(filter) = filter_to_odata(query, protocol)? {
        params.push(format!("$filter={}", urlencoding::encode(&filter)));
    }
    if let Some(order) = order_to_odata(query) {
        params.push(format!("$orderby={}", urlencoding::encode(&order)));
    }
    if let Some((index, size)) = query.page_clause() {
        params.push(format!("$skip={}", index.saturating_sub(1) * size));
        params.push(format!("$top={}", size));
    }
    if query.is_count_required() {
        if protocol == Protocol::OData {
            params.push("$inlinecount=allpages".to_string());
        } else {
            params.push("$count=true".to_string());
        }
    }
    Ok(params.join("&"))
}

/// OData literal for an entity key, e.g. `10248` or `'ALFKI'`.
pub fn key_to_odata(key: &Value, protocol: Protocol) -> String {
    value_to_odata(key, protocol)
}

/// Escapes a string for use in OData queries.
///
/// OData strings are enclosed in single quotes, with internal single quotes doubled.
pub fn escape_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::Record;
    use crate::query::Direction;

    #[test]
    fn test_simple_conditions() {
        assert_eq!(
            predicate_to_odata(&Predicate::eq("ShipCity", "Reims"), Protocol::ODataV4).unwrap(),
            "ShipCity eq 'Reims'"
        );
        assert_eq!(
            predicate_to_odata(&Predicate::gt("Freight", 10), Protocol::ODataV4).unwrap(),
            "Freight gt 10"
        );
        assert_eq!(
            predicate_to_odata(&Predicate::is_null("ShipRegion"), Protocol::ODataV4).unwrap(),
            "ShipRegion eq null"
        );
    }

    #[test]
    fn test_contains_differs_by_version() {
        let p = Predicate::contains("ShipCountry", "Fra");
        assert_eq!(predicate_to_odata(&p, Protocol::ODataV4).unwrap(), "contains(ShipCountry,'Fra')");
        assert_eq!(predicate_to_odata(&p, Protocol::OData).unwrap(), "substringof('Fra',ShipCountry)");
    }

    #[test]
    fn test_ignore_case_lowercases_both_sides() {
        let p = Predicate::contains("ShipCountry", "France").ignore_case(true);
        assert_eq!(
            predicate_to_odata(&p, Protocol::ODataV4).unwrap(),
            "contains(tolower(ShipCountry),'france')"
        );
    }

    #[test]
    fn test_negated_string_operator() {
        let p = Predicate::new("ShipCity", FilterOperator::DoesNotStartWith, "Re");
        assert_eq!(predicate_to_odata(&p, Protocol::ODataV4).unwrap(), "not startswith(ShipCity,'Re')");
    }

    #[test]
    fn test_like_pattern_maps_to_functions() {
        let p = Predicate::new("ShipName", FilterOperator::Like, "%vins%");
        assert_eq!(predicate_to_odata(&p, Protocol::ODataV4).unwrap(), "contains(ShipName,'vins')");
        let p = Predicate::new("ShipName", FilterOperator::Wildcard, "Vins*");
        assert_eq!(predicate_to_odata(&p, Protocol::ODataV4).unwrap(), "startswith(ShipName,'Vins')");
    }

    #[test]
    fn test_single_character_wildcards_are_positional() {
        let like = Predicate::new("ShipName", FilterOperator::Like, "R_ims");
        let wildcard = Predicate::new("ShipName", FilterOperator::Wildcard, "R?ims");
        let expected = "(length(ShipName) eq 5 and substring(ShipName,0,1) eq 'R' and substring(ShipName,2,3) eq 'ims')";
        assert_eq!(predicate_to_odata(&like, Protocol::ODataV4).unwrap(), expected);
        assert_eq!(predicate_to_odata(&wildcard, Protocol::ODataV4).unwrap(), expected);
        assert!(like.matches(&Record::new().set("ShipName", "Reims")));
    }

    #[test]
    fn test_inner_any_wildcard_anchors_both_ends() {
        let p = Predicate::new("ShipName", FilterOperator::Like, "Vins%oles");
        assert_eq!(
            predicate_to_odata(&p, Protocol::ODataV4).unwrap(),
            "(length(ShipName) ge 8 and startswith(ShipName,'Vins') and endswith(ShipName,'oles'))"
        );

        let p = Predicate::new("ShipName", FilterOperator::Wildcard, "?a*s");
        assert_eq!(
            predicate_to_odata(&p, Protocol::ODataV4).unwrap(),
            "(length(ShipName) ge 3 and substring(ShipName,1,1) eq 'a' and endswith(ShipName,'s'))"
        );
    }

    #[test]
    fn test_inner_segments_are_found_in_order() {
        let p = Predicate::new("ShipName", FilterOperator::Like, "a%b%c");
        assert_eq!(
            predicate_to_odata(&p, Protocol::ODataV4).unwrap(),
            "(length(ShipName) ge 3 and startswith(ShipName,'a') and endswith(ShipName,'c') \
             and indexof(substring(ShipName,1),'b') ge 0 \
             and length(substring(substring(ShipName,1),indexof(substring(ShipName,1),'b') add 1)) ge 1)"
        );
    }

    #[test]
    fn test_inexpressible_pattern_is_rejected() {
        let p = Predicate::new("ShipName", FilterOperator::Like, "%a_b%");
        let err = predicate_to_odata(&p, Protocol::ODataV4).unwrap_err();
        assert!(matches!(err, SourceError::UnsupportedFilter(_)));

        let q = Query::new().filter(p);
        assert!(query_string(&q, Protocol::OData).is_err());
    }

    #[test]
    fn test_combined_predicates() {
        let p = Predicate::eq("a", 1).and_also(Predicate::eq("b", 2).or_else(Predicate::eq("c", 3)));
        assert_eq!(
            predicate_to_odata(&p, Protocol::ODataV4).unwrap(),
            "(a eq 1 and (b eq 2 or c eq 3))"
        );
    }

    #[test]
    fn test_date_literals() {
        let d = NaiveDate::from_ymd_opt(1996, 7, 4).unwrap();
        let dt = d.and_hms_opt(0, 0, 0).unwrap().and_utc();
        assert_eq!(value_to_odata(&Value::DateTime(dt), Protocol::ODataV4), "1996-07-04T00:00:00Z");
        assert_eq!(
            value_to_odata(&Value::DateTime(dt), Protocol::OData),
            "datetime'1996-07-04T00:00:00'"
        );
        assert_eq!(value_to_odata(&Value::Date(d), Protocol::ODataV4), "1996-07-04");
    }

    #[test]
    fn test_float_literal_keeps_decimal_point() {
        assert_eq!(value_to_odata(&Value::Float(5.0), Protocol::ODataV4), "5.0");
        assert_eq!(value_to_odata(&Value::Float(32.38), Protocol::ODataV4), "32.38");
    }

    #[test]
    fn test_order_by_lists_highest_precedence_first() {
        // Clauses as composed from descriptors [OrderDate, Freight]
        let q = Query::new()
            .sort_by("Freight", Direction::Descending)
            .sort_by("OrderDate", Direction::Ascending);
        assert_eq!(order_to_odata(&q).as_deref(), Some("OrderDate asc,Freight desc"));
    }

    #[test]
    fn test_count_parameter_by_version() {
        let q = Query::new().page(1, 12).requires_count();
        assert_eq!(query_string(&q, Protocol::ODataV4).unwrap(), "$skip=0&$top=12&$count=true");
        assert_eq!(query_string(&q, Protocol::OData).unwrap(), "$skip=0&$top=12&$inlinecount=allpages");
    }

    #[test]
    fn test_search_clause_renders_or() {
        let q = Query::new().search("an", vec!["ShipCity".into(), "ShipName".into()], false);
        assert_eq!(
            filter_to_odata(&q, Protocol::OData).unwrap().as_deref(),
            Some("(substringof('an',ShipCity) or substringof('an',ShipName))")
        );
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("O'Brien"), "'O''Brien'");
    }
}
