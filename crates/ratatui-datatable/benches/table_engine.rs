use criterion::Criterion;
use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui_datatable::DataTable;
use ratatui_datatable::person::Person;
use ratatui_datatable::person::make_data_with_rng;
use ratatui_datatable::person::person_columns;
use ratatui_datatable::table::ColumnSort;
use ratatui_datatable::table::FilterValue;
use ratatui_datatable::table::Table;

const ROWS: usize = 50_000;

fn people() -> Vec<Person> {
    make_data_with_rng(ROWS, &mut StdRng::seed_from_u64(7))
}

fn bench_global_filter(c: &mut Criterion) {
    let mut table = Table::new(person_columns(), people());
    let queries = ["", "tan", "tanner lin", "single 3"];
    c.bench_function("table/global_filter/50k", |b| {
        let mut i = 0;
        b.iter(|| {
            table.set_global_filter(queries[i % queries.len()]);
            i += 1;
            black_box(table.pre_pagination_row_model().len());
        })
    });
}

fn bench_sorting(c: &mut Criterion) {
    let mut table = Table::new(person_columns(), people());
    c.bench_function("table/sort/age_then_last_name/50k", |b| {
        let mut desc = false;
        b.iter(|| {
            desc = !desc;
            let sorting = vec![
                ColumnSort::new("age", desc),
                ColumnSort::new("lastName", false),
            ];
            let _ = table.set_sorting(sorting);
            black_box(table.row_model().len());
        })
    });
}

fn bench_facets(c: &mut Criterion) {
    let people = people();
    c.bench_function("table/facets/status_and_age/50k", |b| {
        b.iter(|| {
            let mut table = Table::new(person_columns(), people.clone());
            let _ = table.set_column_filter("visits", Some(FilterValue::range(Some(100.0), None)));
            let status = table.column_index("status").unwrap_or(0);
            let age = table.column_index("age").unwrap_or(0);
            black_box(table.faceted_unique_values(status).len());
            black_box(table.faceted_min_max_values(age));
        })
    });
}

fn bench_render(c: &mut Criterion) {
    let mut dt = DataTable::new(person_columns(), people());
    let mut buf = Buffer::empty(Rect::new(0, 0, 160, 48));
    c.bench_function("data_table/render/160x48", |b| {
        b.iter(|| {
            dt.render(buf.area, &mut buf);
            black_box(buf.area);
        })
    });
}

criterion_group!(
    benches,
    bench_global_filter,
    bench_sorting,
    bench_facets,
    bench_render
);
criterion_main!(benches);
