use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mop_core::{FeatureDefinition, ObjectId, Runtime, Value};

fn person_schema(rt: &mut Runtime) -> ObjectId {
    let m = *rt.meta();
    let person = rt.create_class("Person").unwrap();
    rt.define_feature(person, FeatureDefinition::attribute("name", m.e_string))
        .unwrap();
    rt.define_feature(person, FeatureDefinition::attribute("age", m.e_int))
        .unwrap();
    let friends = rt
        .define_feature(person, FeatureDefinition::reference("friends", person).many())
        .unwrap();
    rt.set(friends, "eOpposite", friends).unwrap();
    person
}

fn bench_bootstrap(c: &mut Criterion) {
    c.bench_function("bootstrap", |b| {
        b.iter(|| black_box(Runtime::new()));
    });
}

fn bench_get_set(c: &mut Criterion) {
    let mut rt = Runtime::new();
    let person = person_schema(&mut rt);
    let p = rt.instantiate(person).unwrap();
    let age = rt.find_feature(person, "age").unwrap();

    let mut group = c.benchmark_group("scalar");
    group.bench_function("set_by_name", |b| {
        b.iter(|| rt.set(p, black_box("age"), 42).unwrap());
    });
    group.bench_function("set_by_descriptor", |b| {
        b.iter(|| rt.set(p, black_box(age), 42).unwrap());
    });
    group.bench_function("get_by_name", |b| {
        b.iter(|| rt.get(p, black_box("age")).unwrap());
    });
    group.bench_function("get_by_descriptor", |b| {
        b.iter(|| rt.get(p, black_box(age)).unwrap());
    });
    group.finish();
}

fn bench_collection_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("friends");

    for size in [10usize, 100] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("add", size), &size, |b, &size| {
            b.iter(|| {
                let mut rt = Runtime::new();
                let person = person_schema(&mut rt);
                let hub = rt.instantiate(person).unwrap();
                for _ in 0..size {
                    let other = rt.instantiate(person).unwrap();
                    rt.many(hub, "friends").unwrap().add(other).unwrap();
                }
                rt
            });
        });
        group.bench_with_input(BenchmarkId::new("add_all", size), &size, |b, &size| {
            b.iter(|| {
                let mut rt = Runtime::new();
                let person = person_schema(&mut rt);
                let hub = rt.instantiate(person).unwrap();
                let others: Vec<Value> = (0..size)
                    .map(|_| Value::Object(rt.instantiate(person).unwrap()))
                    .collect();
                rt.many(hub, "friends").unwrap().add_all(others).unwrap();
                rt
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_bootstrap, bench_get_set, bench_collection_add);
criterion_main!(benches);
