//! Integration tests against a live OData v4 service.
//!
//! These tests need network access and are ignored by default. To run them,
//! create a `.env` file in the datagrid-lib directory with:
//!
//! ```env
//! ODATA_URL=https://services.odata.org/V4/Northwind/Northwind.svc
//! ```
//!
//! Then run: `cargo test -p datagrid-lib -- --ignored`

use std::env;

use datagrid_lib::model::Column;
use datagrid_lib::query::Direction;
use datagrid_lib::query::FilterOperator;
use datagrid_lib::query::Linkage;
use datagrid_lib::settings::PageSettings;
use datagrid_lib::source::DataSource;
use datagrid_lib::source::ODataSource;
use datagrid_lib::source::Protocol;
use datagrid_lib::DataBinding;
use datagrid_lib::Grid;
use datagrid_lib::GridSettings;
use datagrid_lib::Query;

fn load_env() -> Option<String> {
    let _ = dotenvy::dotenv();
    env::var("ODATA_URL").ok()
}

fn source(url: String) -> ODataSource {
    ODataSource::builder()
        .url(url)
        .protocol(Protocol::ODataV4)
        .table("Orders")
        .build()
        .expect("valid source")
}

#[tokio::test]
#[ignore]
async fn test_live_query() {
    let Some(url) = load_env() else {
        eprintln!("Skipping: ODATA_URL not set");
        return;
    };
    let source = source(url);
    source.ready().await.unwrap();

    let result = source
        .execute_query(&Query::from_table("Orders").page(1, 5).requires_count())
        .await
        .unwrap();
    assert_eq!(result.len(), 5);
    assert!(result.count > 5);
}

#[tokio::test]
#[ignore]
async fn test_live_grid_filter_and_sort() {
    let Some(url) = load_env() else {
        eprintln!("Skipping: ODATA_URL not set");
        return;
    };
    let columns = vec![
        Column::new("OrderID").primary_key(),
        Column::new("CustomerID"),
        Column::new("ShipCountry"),
    ];
    let settings = GridSettings::default().with_page_settings(PageSettings::default().with_page_size(10));
    let mut grid = Grid::new(columns, settings, DataBinding::source(source(url))).with_table("Orders");

    grid.filter_by_column("ShipCountry", FilterOperator::Equal, "France", Linkage::And, false, false)
        .await
        .unwrap();
    grid.sort_by_column("OrderID", Direction::Descending, false).await.unwrap();

    let view = grid.current_view();
    assert!(!view.is_empty());
    assert!(view.result.iter().all(|r| r.get_str("ShipCountry") == Some("France")));
    let ids: Vec<i64> = view.result.iter().filter_map(|r| r.get_i64("OrderID")).collect();
    assert!(ids.windows(2).all(|w| w[0] > w[1]));
}
