use std::hint::black_box;
use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray};
use criterion::{Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fexec_column::{Argument, Column, LowCardinalityColumn, SparseColumn, null_map_from_bools};
use fexec_function::{ArgumentSignature, BoundFunction, ScalarFunction};
use fexec_test_utils::columns::{const_int64, int64_type, utf8_type};
use fexec_test_utils::functions::{Add, Negate, Upper};
use fexec_types::DataType;

const ROWS: usize = 64 * 1024;

fn bind(function: Arc<dyn ScalarFunction>, arguments: &[Argument]) -> BoundFunction {
    let signatures: Vec<ArgumentSignature> = arguments.iter().map(ArgumentSignature::of).collect();
    BoundFunction::build(function, &signatures).unwrap()
}

fn bench_nullable_plus_constant(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let values: Vec<i64> = (0..ROWS).map(|_| rng.random_range(-1000..1000)).collect();
    let nulls: Vec<bool> = (0..ROWS).map(|_| rng.random_bool(0.1)).collect();
    let column = Column::nullable(
        Column::Full(Arc::new(Int64Array::from(values))),
        null_map_from_bools(&nulls),
    )
    .unwrap();
    let arguments = vec![
        Argument::new(column, DataType::nullable(int64_type()), "x"),
        Argument::new(const_int64(7, ROWS).unwrap(), int64_type(), "seven"),
    ];
    let plus = bind(Arc::new(Add::default()), &arguments);

    c.bench_function("plus_nullable_const_64k", |b| {
        b.iter(|| black_box(plus.execute(black_box(&arguments), ROWS).unwrap()))
    });
}

fn bench_sparse_negate(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let dense: Vec<i64> = (0..ROWS)
        .map(|_| {
            if rng.random_bool(0.02) {
                rng.random_range(1..100)
            } else {
                0
            }
        })
        .collect();
    let array: ArrayRef = Arc::new(Int64Array::from(dense.clone()));
    let sparse = vec![Argument::new(
        Column::Sparse(SparseColumn::from_full(&array).unwrap()),
        int64_type(),
        "x",
    )];
    let full = vec![Argument::new(Column::Full(array), int64_type(), "x")];
    let negate = bind(Arc::new(Negate::default()), &sparse);

    let mut group = c.benchmark_group("negate_64k");
    group.bench_function("sparse", |b| {
        b.iter(|| black_box(negate.execute(black_box(&sparse), ROWS).unwrap()))
    });
    group.bench_function("full", |b| {
        b.iter(|| black_box(negate.execute(black_box(&full), ROWS).unwrap()))
    });
    group.finish();
}

fn bench_dictionary_upper(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1337);
    let words: Vec<String> = (0..64).map(|i| format!("word-{i}")).collect();
    let indexes: Vec<u32> = (0..ROWS).map(|_| rng.random_range(0..64)).collect();
    let dictionary: ArrayRef = Arc::new(StringArray::from(words.clone()));
    let encoded = LowCardinalityColumn::from_parts(dictionary, indexes.clone()).unwrap();
    let expanded: ArrayRef = Arc::new(StringArray::from_iter_values(
        indexes.iter().map(|ix| words[*ix as usize].as_str()),
    ));

    let dictionary_args = vec![Argument::new(
        Column::LowCardinality(encoded),
        DataType::low_cardinality(utf8_type()),
        "s",
    )];
    let full_args = vec![Argument::new(Column::Full(expanded), utf8_type(), "s")];
    let on_dictionary = bind(Arc::new(Upper::default()), &dictionary_args);
    let on_full = bind(Arc::new(Upper::default()), &full_args);

    let mut group = c.benchmark_group("upper_64k");
    group.bench_function("dictionary", |b| {
        b.iter(|| black_box(on_dictionary.execute(black_box(&dictionary_args), ROWS).unwrap()))
    });
    group.bench_function("full", |b| {
        b.iter(|| black_box(on_full.execute(black_box(&full_args), ROWS).unwrap()))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_nullable_plus_constant,
    bench_sparse_negate,
    bench_dictionary_upper
);
criterion_main!(benches);
