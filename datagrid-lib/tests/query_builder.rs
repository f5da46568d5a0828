use chrono::NaiveDate;
use datagrid_lib::model::{Column, ColumnType, Record, Value};
use datagrid_lib::query::{
    AggregateKind, Clause, ClauseKind, Comparer, Direction, FilterOperator, Linkage, Predicate,
    QueryBuilder,
};
use datagrid_lib::settings::{
    AggregateColumn, AggregateRow, AggregateSettings, FilterDescriptor, FilterSettings,
    GridSettings, PageSettings, SearchSettings, SortSettings,
};
use datagrid_lib::source::Protocol;

fn columns() -> Vec<Column> {
    vec![
        Column::new("OrderID").primary_key().with_type(ColumnType::Number),
        Column::new("CustomerID"),
        Column::new("ShipCountry"),
        Column::new("OrderDate").with_type(ColumnType::Date),
        Column::new("Freight").with_type(ColumnType::Number).allow_searching(false),
    ]
}

fn full_settings() -> GridSettings {
    GridSettings::default()
        .with_sort_settings(
            SortSettings::default()
                .with_column("CustomerID", Direction::Descending)
                .with_column("Freight", Direction::Ascending),
        )
        .with_filter_settings(FilterSettings::default().with_column(FilterDescriptor::new(
            "ShipCountry",
            FilterOperator::Contains,
            "France",
        )))
        .with_search_settings(SearchSettings::default().with_value("vins"))
        .with_aggregate_settings(AggregateSettings::default().with_row(AggregateRow::new([
            AggregateColumn::new("Freight", [AggregateKind::Sum, AggregateKind::Max]),
        ])))
        .with_page_settings(PageSettings::default().with_current_page(2))
}

// ============================================================================
// Stage order and determinism
// ============================================================================

#[test]
fn test_stage_order_is_fixed() {
    let columns = columns();
    let settings = full_settings();
    let query = QueryBuilder::new(&columns, &settings).requires_count(true).build();
    assert_eq!(
        query.shape(),
        vec![
            ClauseKind::SortBy,
            ClauseKind::SortBy,
            ClauseKind::Where,
            ClauseKind::Search,
            ClauseKind::Aggregate,
            ClauseKind::Aggregate,
            ClauseKind::Page,
            ClauseKind::RequiresCount,
        ]
    );
}

#[test]
fn test_builder_is_deterministic() {
    let columns = columns();
    let settings = full_settings();
    let builder = QueryBuilder::new(&columns, &settings).protocol(Protocol::ODataV4).table("Orders");
    let first = builder.build();
    let second = builder.build();
    assert_eq!(first.shape(), second.shape());
    assert_eq!(first, second);
}

// ============================================================================
// Sort
// ============================================================================

#[test]
fn test_sort_descriptors_are_reversed() {
    let columns = columns();
    let settings = full_settings();
    let query = QueryBuilder::new(&columns, &settings).build();
    let fields: Vec<&str> = query
        .clauses()
        .iter()
        .filter_map(|c| match c {
            Clause::SortBy { field, .. } => Some(field.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(fields, vec!["Freight", "CustomerID"]);
}

#[test]
fn test_comparer_only_for_local_sources() {
    let comparer = Comparer::new(|a: &Value, b: &Value| b.compare(a));
    let columns = vec![Column::new("CustomerID").with_sort_comparer(comparer)];
    let settings = GridSettings::default()
        .with_sort_settings(SortSettings::default().with_column("CustomerID", Direction::Ascending));

    let local = QueryBuilder::new(&columns, &settings).build();
    assert!(matches!(&local.clauses()[0], Clause::SortBy { comparer: Some(_), .. }));

    let remote = QueryBuilder::new(&columns, &settings).protocol(Protocol::ODataV4).build();
    assert!(matches!(&remote.clauses()[0], Clause::SortBy { comparer: None, .. }));
}

// ============================================================================
// Filter
// ============================================================================

#[test]
fn test_disabled_filter_is_skipped() {
    let columns = columns();
    let mut settings = full_settings();
    settings.filter_settings.enabled = false;
    let query = QueryBuilder::new(&columns, &settings).build();
    assert!(!query.shape().contains(&ClauseKind::Where));
}

#[test]
fn test_same_field_descriptors_follow_linkage() {
    let columns = columns();
    let settings = GridSettings::default().with_filter_settings(
        FilterSettings::default()
            .with_column(FilterDescriptor::new("ShipCountry", FilterOperator::Equal, "France"))
            .with_column(
                FilterDescriptor::new("ShipCountry", FilterOperator::Equal, "Spain")
                    .with_predicate(Linkage::Or),
            )
            .with_column(FilterDescriptor::new("CustomerID", FilterOperator::StartsWith, "V")),
    );
    let query = QueryBuilder::new(&columns, &settings).skip_page(true).build();
    let predicates: Vec<&Predicate> = query.predicates().collect();
    assert_eq!(predicates.len(), 1);

    let Predicate::And(groups) = predicates[0] else {
        panic!("expected per-column groups joined by and");
    };
    assert_eq!(groups.len(), 2);
    assert!(matches!(&groups[0], Predicate::Or(items) if items.len() == 2));
    assert!(matches!(&groups[1], Predicate::Condition(c) if c.field == "CustomerID"));

    let vins = Record::new().set("ShipCountry", "Spain").set("CustomerID", "VINET");
    let other = Record::new().set("ShipCountry", "Spain").set("CustomerID", "TOMSP");
    assert!(predicates[0].matches(&vins));
    assert!(!predicates[0].matches(&other));
}

#[test]
fn test_case_sensitivity_flag() {
    let columns = columns();
    let settings = GridSettings::default().with_filter_settings(FilterSettings::default().with_column(
        FilterDescriptor::new("ShipCountry", FilterOperator::Contains, "france"),
    ));
    let query = QueryBuilder::new(&columns, &settings).build();
    let predicate = query.predicates().next().unwrap();
    assert!(predicate.matches(&Record::new().set("ShipCountry", "France")));

    let settings = GridSettings::default().with_filter_settings(FilterSettings::default().with_column(
        FilterDescriptor::new("ShipCountry", FilterOperator::Contains, "france").with_case_sensitive(true),
    ));
    let query = QueryBuilder::new(&columns, &settings).build();
    let predicate = query.predicates().next().unwrap();
    assert!(!predicate.matches(&Record::new().set("ShipCountry", "France")));
}

#[test]
fn test_date_equality_covers_whole_day() {
    let columns = columns();
    let day = NaiveDate::from_ymd_opt(1996, 7, 4).unwrap();
    let settings = GridSettings::default().with_filter_settings(
        FilterSettings::default().with_column(FilterDescriptor::new("OrderDate", FilterOperator::Equal, day)),
    );
    let query = QueryBuilder::new(&columns, &settings).build();
    let predicate = query.predicates().next().unwrap();

    let morning = day.and_hms_opt(8, 30, 0).unwrap().and_utc();
    let next_day = NaiveDate::from_ymd_opt(1996, 7, 5).unwrap().and_hms_opt(0, 0, 0).unwrap().and_utc();
    assert!(predicate.matches(&Record::new().set("OrderDate", morning)));
    assert!(predicate.matches(&Record::new().set("OrderDate", day)));
    assert!(!predicate.matches(&Record::new().set("OrderDate", next_day)));
}

#[test]
fn test_date_greater_than_starts_next_day() {
    let columns = columns();
    let day = NaiveDate::from_ymd_opt(1996, 7, 4).unwrap();
    let settings = GridSettings::default().with_filter_settings(
        FilterSettings::default().with_column(FilterDescriptor::new("OrderDate", FilterOperator::GreaterThan, day)),
    );
    let query = QueryBuilder::new(&columns, &settings).build();
    let predicate = query.predicates().next().unwrap();

    let late = day.and_hms_opt(23, 59, 0).unwrap().and_utc();
    assert!(!predicate.matches(&Record::new().set("OrderDate", late)));
    assert!(predicate.matches(&Record::new().set("OrderDate", NaiveDate::from_ymd_opt(1996, 7, 5).unwrap())));
}

// ============================================================================
// Search
// ============================================================================

#[test]
fn test_search_targets_searchable_columns() {
    let columns = columns();
    let settings = GridSettings::default().with_search_settings(SearchSettings::default().with_value("x"));
    let query = QueryBuilder::new(&columns, &settings).build();
    let Clause::Search { fields, ignore_case, .. } = &query.clauses()[0] else {
        panic!("expected a search clause");
    };
    assert_eq!(fields, &vec!["OrderID", "CustomerID", "ShipCountry", "OrderDate"]);
    assert!(*ignore_case);
}

#[test]
fn test_search_explicit_fields() {
    let columns = columns();
    let settings = GridSettings::default()
        .with_search_settings(SearchSettings::default().with_value("x").with_fields(["ShipCountry"]));
    let query = QueryBuilder::new(&columns, &settings).build();
    assert!(matches!(&query.clauses()[0], Clause::Search { fields, .. } if fields == &vec!["ShipCountry".to_string()]));
}

#[test]
fn test_search_odata_v4_becomes_or_predicate() {
    let columns = columns();
    let settings = GridSettings::default()
        .with_search_settings(SearchSettings::default().with_value("vins").with_fields(["CustomerID", "ShipCountry"]));

    let v4 = QueryBuilder::new(&columns, &settings).protocol(Protocol::ODataV4).build();
    assert!(matches!(&v4.clauses()[0], Clause::Where(Predicate::Or(items)) if items.len() == 2));

    let v3 = QueryBuilder::new(&columns, &settings)
        .protocol(Protocol::OData)
        .skip_page(true)
        .build();
    assert_eq!(v3.shape(), vec![ClauseKind::Search]);
}

#[test]
fn test_search_odata_v4_without_searchable_columns_is_skipped() {
    let columns = vec![
        Column::new("OrderID").allow_searching(false),
        Column::new("Freight").allow_searching(false),
    ];
    let settings = GridSettings::default().with_search_settings(SearchSettings::default().with_value("vins"));
    let query = QueryBuilder::new(&columns, &settings)
        .protocol(Protocol::ODataV4)
        .skip_page(true)
        .build();
    assert!(query.clauses().is_empty());
}

#[test]
fn test_empty_or_disabled_search_is_skipped() {
    let columns = columns();
    let settings = GridSettings::default();
    assert!(QueryBuilder::new(&columns, &settings).skip_page(true).build().clauses().is_empty());

    let settings = GridSettings::default()
        .with_search_settings(SearchSettings::default().with_value("x").with_enabled(false));
    assert!(QueryBuilder::new(&columns, &settings).skip_page(true).build().clauses().is_empty());
}

// ============================================================================
// Aggregates and paging
// ============================================================================

#[test]
fn test_aggregates_deduplicated_across_rows() {
    let columns = columns();
    let settings = GridSettings::default().with_aggregate_settings(
        AggregateSettings::default()
            .with_row(AggregateRow::new([AggregateColumn::new("Freight", [AggregateKind::Sum])]))
            .with_row(AggregateRow::new([AggregateColumn::new(
                "Freight",
                [AggregateKind::Sum, AggregateKind::Average],
            )])),
    );
    let query = QueryBuilder::new(&columns, &settings).skip_page(true).build();
    let aggregates: Vec<_> = query.aggregates().collect();
    assert_eq!(aggregates, vec![("Freight", AggregateKind::Sum), ("Freight", AggregateKind::Average)]);
}

#[test]
fn test_page_defaults_and_clamping() {
    let columns = columns();
    let mut settings = GridSettings::default();
    settings.page_settings.page_size = 0;
    settings.page_settings.current_page = 0;
    let query = QueryBuilder::new(&columns, &settings).build();
    assert_eq!(query.page_clause(), Some((1, 12)));
}

#[test]
fn test_paging_disabled_or_skipped() {
    let columns = columns();
    let settings = GridSettings::default().with_page_settings(PageSettings::default().with_enabled(false));
    assert_eq!(QueryBuilder::new(&columns, &settings).build().page_clause(), None);

    let settings = GridSettings::default();
    assert_eq!(QueryBuilder::new(&columns, &settings).skip_page(true).build().page_clause(), None);
}
