//! In-memory orders grid.
//!
//! Run with: cargo run --example orders
//!
//! Debug logs go to `orders.log`.

use std::fs::File;

use datagrid_lib::data::DataBinding;
use datagrid_lib::model::Column;
use datagrid_lib::model::Record;
use datagrid_lib::query::AggregateKind;
use datagrid_lib::query::Direction;
use datagrid_lib::query::FilterOperator;
use datagrid_lib::query::Linkage;
use datagrid_lib::settings::AggregateColumn;
use datagrid_lib::settings::AggregateRow;
use datagrid_lib::settings::AggregateSettings;
use datagrid_lib::settings::EditSettings;
use datagrid_lib::settings::PageSettings;
use datagrid_lib::source::InMemorySource;
use datagrid_lib::Grid;
use datagrid_lib::GridSettings;
use gridnav::Key;
use gridnav::KeyInput;
use gridnav::Region;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;

const COUNTRIES: [&str; 4] = ["France", "Germany", "Brazil", "Belgium"];

fn orders() -> Vec<Record> {
    (0..40)
        .map(|i| {
            Record::new()
                .set("OrderID", 10248 + i as i64)
                .set("CustomerID", format!("CUST{:02}", i % 9))
                .set("ShipCountry", COUNTRIES[i % COUNTRIES.len()])
                .set("Freight", (i * 37 % 100) as f64 + 0.25)
        })
        .collect()
}

fn print_view(grid: &Grid) {
    println!(
        "page {}/{} ({} records)",
        grid.current_page(),
        grid.total_pages(),
        grid.current_view().count
    );
    for record in &grid.current_view().result {
        println!(
            "  {:>6}  {:<7} {:<8} {:>7.2}",
            record.get_i64("OrderID").unwrap_or_default(),
            record.get_str("CustomerID").unwrap_or_default(),
            record.get_str("ShipCountry").unwrap_or_default(),
            record.get_f64("Freight").unwrap_or_default(),
        );
    }
    if let Some(total) = grid.current_view().aggregate("Freight", AggregateKind::Sum) {
        println!("  freight total: {}", total);
    }
    println!();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_file = File::create("orders.log")?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)?;

    let columns = vec![
        Column::new("OrderID").primary_key(),
        Column::new("CustomerID"),
        Column::new("ShipCountry"),
        Column::new("Freight").allow_searching(false),
    ];
    let settings = GridSettings::default()
        .with_page_settings(PageSettings::default().with_page_size(5))
        .with_edit_settings(EditSettings::all())
        .with_aggregate_settings(
            AggregateSettings::default().with_row(AggregateRow::new([AggregateColumn::new(
                "Freight",
                [AggregateKind::Sum],
            )])),
        );

    let store = InMemorySource::new(orders());
    let mut grid = Grid::new(columns, settings, DataBinding::source(store.clone()));
    grid.on_page_change(|args| println!("-> page {} to {}", args.previous_page, args.current_page));
    grid.on_cell_focus(|args| println!("-> focused {:?}", args.cell));

    grid.refresh().await?;
    print_view(&grid);

    grid.filter_by_column("ShipCountry", FilterOperator::Equal, "France", Linkage::And, false, false)
        .await?;
    grid.sort_by_column("Freight", Direction::Descending, false).await?;
    print_view(&grid);

    grid.next_page().await?;
    print_view(&grid);

    grid.search("CUST04").await?;
    print_view(&grid);

    grid.clear_filter().await?;
    grid.search("").await?;
    grid.delete_record(Record::new().set("OrderID", 10248)).await?;
    println!("{} records left in the store\n", store.len());

    grid.navigate_to_cell(0, 0, Region::Content);
    grid.handle_key(Key::Right);
    grid.handle_key(KeyInput::ctrl(Key::End));
    if let Some(info) = grid.focused_row_info() {
        println!(
            "focus ends on {:?} of order {:?}",
            info.column.map(|c| c.field.as_str()),
            info.record.and_then(|r| r.get_i64("OrderID"))
        );
    }

    Ok(())
}
