use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fleet_table::{ColumnSearch, DataRow, DataValue, SortDirection, TableController, TableOptions};
use fleet_table::data::data_view::DataView;
use fleet_table::table::pagination::PageWindow;
use std::sync::Arc;

fn create_test_rows(rows: usize) -> Vec<DataRow> {
    let depots = vec![
        "North Yard",
        "South Yard",
        "Harbour",
        "Airport",
        "Central",
        "Ring Road",
        "Industrial Park",
    ];

    (0..rows)
        .map(|i| {
            DataRow::new()
                .with("tripId", DataValue::Integer(i as i64))
                .with("depot", DataValue::String(depots[i % depots.len()].to_string()))
                .with("distance", DataValue::Float(((i * 7919) % 1000) as f64 / 10.0))
                .with("driver", DataValue::String(format!("DRV-{:05}", i % 997)))
        })
        .collect()
}

fn benchmark_filter_sort_page(c: &mut Criterion) {
    let rows_10k = Arc::new(create_test_rows(10_000));
    let rows_100k = Arc::new(create_test_rows(100_000));
    let search: ColumnSearch = [("depot", "yard")].into_iter().collect();

    let mut group = c.benchmark_group("derive_page");

    group.bench_function("10k_rows", |b| {
        b.iter(|| {
            let view = DataView::new(rows_10k.clone())
                .filter_columns(black_box(&search))
                .sort_by("distance", SortDirection::Descending);
            black_box(view.page(PageWindow::new(3, 10)).len())
        });
    });

    group.bench_function("100k_rows", |b| {
        b.iter(|| {
            let view = DataView::new(rows_100k.clone())
                .filter_columns(black_box(&search))
                .sort_by("distance", SortDirection::Descending);
            black_box(view.page(PageWindow::new(3, 10)).len())
        });
    });

    group.finish();
}

fn benchmark_controller_sort_toggle(c: &mut Criterion) {
    let rows = create_test_rows(10_000);
    let options = TableOptions::default().with_threshold(usize::MAX);
    let mut table = TableController::with_rows(rows, options);

    c.bench_function("controller_sort_toggle_10k", |b| {
        b.iter(|| {
            table.set_sort(black_box("driver"));
            black_box(table.rows().len())
        });
    });
}

criterion_group!(benches, benchmark_filter_sort_page, benchmark_controller_sort_toggle);
criterion_main!(benches);
