//! Remote orders grid over OData v4.
//!
//! Run with: cargo run --example odata_orders
//!
//! Requires .env file with:
//! - ODATA_URL (service root, e.g. https://services.odata.org/V4/Northwind/Northwind.svc)
//! - ODATA_TABLE (optional, defaults to Orders)

use std::env;
use std::time::Duration;

use datagrid_lib::data::DataBinding;
use datagrid_lib::model::Column;
use datagrid_lib::query::Direction;
use datagrid_lib::source::ODataSource;
use datagrid_lib::source::Protocol;
use datagrid_lib::Grid;
use datagrid_lib::GridSettings;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let url = env::var("ODATA_URL").expect("ODATA_URL not set");
    let table = env::var("ODATA_TABLE").unwrap_or_else(|_| "Orders".to_string());

    let source = ODataSource::builder()
        .url(url)
        .protocol(Protocol::ODataV4)
        .table(&table)
        .timeout(Duration::from_secs(30))
        .build()?;
    println!("Querying {}\n", source.base_url());

    let columns = vec![
        Column::new("OrderID").primary_key(),
        Column::new("CustomerID"),
        Column::new("ShipCountry"),
    ];
    let mut grid = Grid::new(columns, GridSettings::default(), DataBinding::source(source)).with_table(table);
    grid.on_error(|e| eprintln!("Request failed: {}", e));

    grid.refresh().await?;
    println!("{} orders, {} pages", grid.current_view().count, grid.total_pages());

    grid.sort_by_column("ShipCountry", Direction::Ascending, false).await?;
    grid.search("Franc").await?;

    for record in &grid.current_view().result {
        println!(
            "{:?}  {:?}  {:?}",
            record.get("OrderID"),
            record.get_str("CustomerID"),
            record.get_str("ShipCountry")
        );
    }

    Ok(())
}
