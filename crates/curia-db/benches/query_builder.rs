use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use curia_db::{QueryBuilder, table};

/// Build a query with `n` where predicates and an `n`-value IN list:
/// select * from `t` where `col0` = ? and ... and `id` in (?, ...)
fn build_query(n: usize) -> QueryBuilder {
    let mut qb = table("t");
    for i in 0..n {
        qb = qb.where_(format!("col{i}"), "=", i as i64);
    }
    qb.where_in("id", (0..n as i64).collect::<Vec<_>>())
}

fn bench_to_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/to_sql");

    for n in [1, 5, 10, 50, 100] {
        let qb = build_query(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &qb, |b, qb| {
            b.iter(|| black_box(qb.to_sql()));
        });
    }

    group.finish();
}

fn bench_build_and_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/build_and_compile");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(build_query(n).compile()));
        });
    }

    group.finish();
}

fn bench_nested(c: &mut Criterion) {
    c.bench_function("query_builder/nested_join_union", |b| {
        b.iter(|| {
            let qb = table("users as u")
                .select(["u.id", "u.name", "p.title"])
                .left_join("posts as p", "u.id", "=", "p.user_id")
                .where_nested(|q| q.where_("u.role", "=", "admin").or_where("u.votes", ">", 100))
                .where_in_sub("u.id", table("sessions").select(["user_id"]).where_("active", "=", true))
                .union_all(table("archived_users as u").select(["u.id", "u.name", "u.bio"]))
                .order_by("id", "desc")
                .limit(20);
            black_box(qb.compile())
        });
    });
}

criterion_group!(benches, bench_to_sql, bench_build_and_compile, bench_nested);
criterion_main!(benches);
