// Server-delegated paging driven through a page source, the way the REPL does it

use fleet_table::api_client::query_params;
use fleet_table::table::{InMemoryPageSource, LatestRequest};
use fleet_table::{
    DataRow, DataValue, FetchRequest, PageSource, SortDirection, TableController, TableMode,
    TableOptions,
};
use std::time::{Duration, Instant};

type Controller = TableController<DataRow, LatestRequest>;

fn vehicles(n: i64) -> Vec<DataRow> {
    (1..=n)
        .map(|i| {
            DataRow::new()
                .with("id", DataValue::Integer(i))
                .with("plate", DataValue::String(format!("FL-{:04}", i)))
                .with("fuel", DataValue::Float((i % 17) as f64 * 1.5))
        })
        .collect()
}

fn open(source: &InMemoryPageSource<DataRow>, options: TableOptions) -> Controller {
    let probe = TableController::<DataRow, ()>::new(Vec::new(), usize::MAX, options.clone(), ());
    let first = source.fetch(&probe.fetch_request()).unwrap();
    TableController::new(first.rows, first.total_records, options, LatestRequest::new())
}

/// Fetch and install whatever the controller last asked for
fn service(table: &mut Controller, source: &InMemoryPageSource<DataRow>) -> Option<FetchRequest> {
    let request = table.delegate_mut().take()?;
    let page = source.fetch(&request).unwrap();
    table.apply_page(page.rows, page.total_records);
    Some(request)
}

fn ids(table: &Controller) -> Vec<i64> {
    table
        .rows()
        .iter()
        .filter_map(|r| match r.get("id") {
            Some(DataValue::Integer(i)) => Some(*i),
            _ => None,
        })
        .collect()
}

#[test]
fn test_first_page_opens_in_server_mode() {
    let source = InMemoryPageSource::new(vehicles(450));
    let table = open(&source, TableOptions::default());

    assert_eq!(table.mode(), TableMode::Server);
    assert_eq!(table.total_filtered_records(), 450);
    assert_eq!(table.total_pages(), 45);
    assert_eq!(ids(&table), (1..=10).collect::<Vec<_>>());
}

#[test]
fn test_paging_requests_are_serviced() {
    let source = InMemoryPageSource::new(vehicles(450));
    let mut table = open(&source, TableOptions::default());

    table.set_page(3);
    assert_eq!(table.delegate().issued(), 1);
    let request = service(&mut table, &source).unwrap();
    assert_eq!(request.page, 3);
    assert_eq!(ids(&table), (21..=30).collect::<Vec<_>>());

    table.set_page(1_000);
    service(&mut table, &source);
    assert_eq!(table.current_page(), 45);
    assert_eq!(ids(&table), (441..=450).collect::<Vec<_>>());
}

#[test]
fn test_only_latest_request_is_kept() {
    let source = InMemoryPageSource::new(vehicles(450));
    let mut table = open(&source, TableOptions::default());

    table.set_page(2);
    table.set_page(3);
    table.set_sort("plate");
    assert_eq!(table.delegate().issued(), 3);

    let request = service(&mut table, &source).unwrap();
    assert_eq!(request.page, 3);
    assert_eq!(request.sort_column.as_deref(), Some("plate"));
    assert!(table.delegate_mut().take().is_none());
}

#[test]
fn test_debounced_filter_shrinks_total() {
    let source = InMemoryPageSource::new(vehicles(450)).with_searchable_columns(["plate"]);
    let mut table = open(&source, TableOptions::default());
    table.set_page(12);
    service(&mut table, &source);

    let start = Instant::now();
    table.set_column_search_at("plate", "fl-00", start);
    table.set_column_search_at("plate", "fl-003", start + Duration::from_millis(400));
    assert!(!table.poll_debounce_at(start + Duration::from_millis(1_000)));
    assert!(table.poll_debounce_at(start + Duration::from_millis(1_400)));

    let request = service(&mut table, &source).unwrap();
    assert_eq!(request.page, 1);
    // FL-0030 .. FL-0039
    assert_eq!(table.total_filtered_records(), 10);
    assert_eq!(table.total_pages(), 1);
    assert_eq!(table.current_page(), 1);
    assert_eq!(ids(&table), (30..=39).collect::<Vec<_>>());
}

#[test]
fn test_descending_sort_round_trip() {
    let source = InMemoryPageSource::new(vehicles(300));
    let mut table = open(&source, TableOptions::default().with_page_size(5));

    table.set_sort("id");
    table.set_sort("id");
    let request = service(&mut table, &source).unwrap();
    assert_eq!(request.sort_direction, SortDirection::Descending);
    assert_eq!(ids(&table), vec![300, 299, 298, 297, 296]);

    let params = query_params(&request);
    assert!(params.contains(&("sortDirection".to_string(), "desc".to_string())));
    assert!(params.contains(&("pageSize".to_string(), "5".to_string())));
}

#[test]
fn test_small_source_opens_in_client_mode() {
    let source = InMemoryPageSource::new(vehicles(40));
    let options = TableOptions::default();
    let probe = TableController::<DataRow, ()>::new(Vec::new(), usize::MAX, options.clone(), ());
    let mut request = probe.fetch_request();
    let total = source.fetch(&request).unwrap().total_records;
    assert!(total < options.server_mode_threshold);

    request.page_size = total;
    let all = source.fetch(&request).unwrap();
    let mut table = TableController::new(all.rows, total, options, LatestRequest::new());
    assert_eq!(table.mode(), TableMode::Client);

    table.set_page(4);
    assert_eq!(ids(&table), (31..=40).collect::<Vec<_>>());
    assert_eq!(table.delegate().issued(), 0);
}
