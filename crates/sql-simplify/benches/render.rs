use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sql_simplify::{
    ColumnDef, Condition, Connection, Dialect, Join, OrmResult, QueryOutput, Record, Schema, Table,
    escape_char,
};

/// Rendering never touches the connection.
struct Offline;

impl Connection for Offline {
    async fn query(&self, _: &str) -> OrmResult<QueryOutput> {
        Ok(QueryOutput::default())
    }
}

/// Build a condition tree `depth` levels deep, alternating and/or, with
/// `width` comparisons per level.
fn build_condition(depth: usize, width: usize) -> Condition {
    let mut children: Vec<Condition> = (0..width)
        .map(|i| Condition::eq(format!("col{i}"), format!("value-{i}")))
        .collect();
    if depth > 1 {
        children.push(build_condition(depth - 1, width));
    }
    if depth % 2 == 0 {
        Condition::and(children)
    } else {
        Condition::or(children)
    }
}

fn bench_render_condition(c: &mut Criterion) {
    let mut group = c.benchmark_group("condition/render");

    for depth in [1, 4, 16] {
        let cond = build_condition(depth, 4);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &cond, |b, cond| {
            b.iter(|| black_box(cond.render(Dialect::MySql)));
        });
    }

    group.finish();
}

fn bench_escape(c: &mut Criterion) {
    let mut group = c.benchmark_group("escape/escape_char");

    for len in [16, 256, 4096] {
        let input: String = "a'b\"c;d-e_f%g".chars().cycle().take(len).collect();
        group.bench_with_input(BenchmarkId::from_parameter(len), &input, |b, input| {
            b.iter(|| black_box(escape_char(input)));
        });
    }

    group.finish();
}

fn bench_statements(c: &mut Criterion) {
    let schema = Schema::new()
        .column("id", ColumnDef::integer().auto_increment().primary_key())
        .column("name", ColumnDef::string().default_value(""))
        .column("email", ColumnDef::string().default_value(""))
        .column("active", ColumnDef::boolean().default_value(true));
    let users = Table::new("users", schema, Offline).expect("valid table");
    let row = Record::new()
        .with("name", "John Doe")
        .with("email", "john@example.com")
        .with("active", true);
    let cond = build_condition(4, 4);
    let join = Join::new("orders", "user_id", "id")
        .get(["users.name", "orders.total"])
        .condition(Condition::eq("users.email", "john@example.com"));

    let mut group = c.benchmark_group("table");
    group.bench_function("insert_sql", |b| b.iter(|| black_box(users.insert_sql(&row))));
    group.bench_function("update_sql", |b| {
        b.iter(|| black_box(users.update_sql(&row, &cond)))
    });
    group.bench_function("join_sql", |b| b.iter(|| black_box(users.join_sql(&join))));
    group.bench_function("create_table_sql", |b| {
        b.iter(|| black_box(users.create_table_sql()))
    });
    group.finish();
}

criterion_group!(benches, bench_render_condition, bench_escape, bench_statements);
criterion_main!(benches);
