//! Randomised checks of the executor against direct evaluation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fexec_column::{Argument, Column, ColumnKind, null_map_from_bools};
use fexec_function::{
    ArgumentSignature, FunctionCapabilities, FunctionExecutor, ScalarFunction, resolver,
};
use fexec_test_utils::columns::{
    const_int64, int64, int64_type, int64_values, low_cardinality_strings, null_flags,
    sparse_int64,
};
use fexec_test_utils::functions::{Add, Negate, Probe};
use fexec_types::DataType;

const SEEDS: [u64; 4] = [1, 7, 42, 1337];

fn random_values(rng: &mut StdRng, rows: usize) -> Vec<i64> {
    (0..rows).map(|_| rng.random_range(-1000..1000)).collect()
}

fn random_nullable(rng: &mut StdRng, rows: usize) -> (Column, Vec<bool>) {
    let values = random_values(rng, rows);
    let nulls: Vec<bool> = (0..rows).map(|_| rng.random_bool(0.3)).collect();
    let column = Column::nullable(int64(&values), null_map_from_bools(&nulls)).unwrap();
    (column, nulls)
}

fn resolve(function: &dyn ScalarFunction, arguments: &[Argument]) -> DataType {
    let signatures: Vec<ArgumentSignature> = arguments.iter().map(ArgumentSignature::of).collect();
    resolver::return_type(function, &signatures).unwrap()
}

#[test]
fn disabled_layers_pass_arguments_through_untouched() {
    let probe = Probe::new(FunctionCapabilities::none(), 4);
    let arguments = vec![
        Argument::new(const_int64(3, 4).unwrap(), int64_type(), "c"),
        Argument::new(sparse_int64(&[0, 2, 0, 0]).unwrap(), int64_type(), "s"),
        Argument::new(
            low_cardinality_strings(&["a", "b"], &[0, 1, 1, 0]).unwrap(),
            DataType::low_cardinality(DataType::plain(arrow::datatypes::DataType::Utf8)),
            "d",
        ),
        Argument::new(
            Column::nullable(int64(&[1, 2, 3, 4]), null_map_from_bools(&[true, false, false, true]))
                .unwrap(),
            DataType::nullable(int64_type()),
            "n",
        ),
    ];
    let result_type = int64_type();

    let via_executor = FunctionExecutor::new(&probe)
        .execute(&arguments, &result_type, 4)
        .unwrap();
    let direct = probe
        .execute_impl(&arguments, &result_type, 4)
        .unwrap()
        .unwrap();

    let calls = probe.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].kinds, calls[1].kinds);
    assert_eq!(
        calls[0].kinds,
        vec![
            ColumnKind::Const,
            ColumnKind::Sparse,
            ColumnKind::LowCardinality,
            ColumnKind::Nullable
        ]
    );
    assert_eq!(calls[0].types, calls[1].types);
    assert_eq!(calls[0].rows, 4);
    assert_eq!(via_executor.kind(), direct.kind());
    assert_eq!(
        int64_values(&via_executor).unwrap(),
        int64_values(&direct).unwrap()
    );
}

#[test]
fn constant_arguments_match_single_row_evaluation() {
    let plus = Add::default();
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let a = rng.random_range(-1000..1000);
        let b = rng.random_range(-1000..1000);
        let rows = rng.random_range(1..500);

        let arguments = vec![
            Argument::new(const_int64(a, rows).unwrap(), int64_type(), "a"),
            Argument::new(const_int64(b, rows).unwrap(), int64_type(), "b"),
        ];
        let result = FunctionExecutor::new(&plus)
            .execute(&arguments, &int64_type(), rows)
            .unwrap();

        let single = vec![
            Argument::new(int64(&[a]), int64_type(), "a"),
            Argument::new(int64(&[b]), int64_type(), "b"),
        ];
        let expected = plus
            .execute_impl(&single, &int64_type(), 1)
            .unwrap()
            .unwrap();

        assert!(result.is_const());
        assert_eq!(result.len(), rows);
        assert_eq!(
            int64_values(result.as_const().unwrap().data()).unwrap(),
            int64_values(&expected).unwrap()
        );
    }
}

#[test]
fn null_maps_are_combined_row_by_row() {
    let probe = Probe::new(FunctionCapabilities::default(), 2);
    let arguments = vec![
        Argument::new(
            Column::nullable(int64(&[1, 2, 3]), null_map_from_bools(&[false, true, false]))
                .unwrap(),
            DataType::nullable(int64_type()),
            "a",
        ),
        Argument::new(
            Column::nullable(int64(&[4, 5, 6]), null_map_from_bools(&[false, false, true]))
                .unwrap(),
            DataType::nullable(int64_type()),
            "b",
        ),
    ];
    let result_type = resolve(&probe, &arguments);
    let result = FunctionExecutor::new(&probe)
        .execute(&arguments, &result_type, 3)
        .unwrap();
    assert_eq!(null_flags(&result), vec![false, true, true]);
    assert_eq!(probe.calls()[0].kinds, vec![ColumnKind::Full, ColumnKind::Full]);
}

#[test]
fn nullable_addition_matches_rowwise_evaluation() {
    let plus = Add::new(FunctionCapabilities::default());
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let rows = rng.random_range(0..300);
        let (lhs, lhs_nulls) = random_nullable(&mut rng, rows);
        let (rhs, rhs_nulls) = random_nullable(&mut rng, rows);

        let expected: Vec<Option<i64>> = int64_values(&lhs)
            .unwrap()
            .into_iter()
            .zip(int64_values(&rhs).unwrap())
            .map(|(a, b)| Some(a? + b?))
            .collect();

        let arguments = vec![
            Argument::new(lhs, DataType::nullable(int64_type()), "a"),
            Argument::new(rhs, DataType::nullable(int64_type()), "b"),
        ];
        let result_type = resolve(&plus, &arguments);
        let result = FunctionExecutor::new(&plus)
            .execute(&arguments, &result_type, rows)
            .unwrap();

        let expected_nulls: Vec<bool> = lhs_nulls
            .iter()
            .zip(&rhs_nulls)
            .map(|(a, b)| *a || *b)
            .collect();
        assert_eq!(null_flags(&result), expected_nulls);
        assert_eq!(int64_values(&result).unwrap(), expected);
    }
}

#[test]
fn sparse_negation_matches_dense_negation() {
    let negate = Negate::default();
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let rows = rng.random_range(1..400);
        let dense: Vec<i64> = (0..rows)
            .map(|_| {
                if rng.random_bool(0.2) {
                    rng.random_range(1..100)
                } else {
                    0
                }
            })
            .collect();
        let arguments = vec![Argument::new(sparse_int64(&dense).unwrap(), int64_type(), "x")];
        let result = FunctionExecutor::new(&negate)
            .execute(&arguments, &int64_type(), rows)
            .unwrap();

        let expected: Vec<Option<i64>> = dense.iter().map(|v| Some(-v)).collect();
        assert_eq!(int64_values(&result).unwrap(), expected);
        if dense.contains(&0) {
            assert!(result.is_sparse());
        }
    }
}

#[test]
fn dictionary_execution_matches_expanded_execution() {
    let negate = Negate::default();
    for seed in SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let dictionary: Vec<i64> = vec![0, 3, -8, 21];
        let rows = rng.random_range(0..200);
        let indexes: Vec<u32> = (0..rows).map(|_| rng.random_range(0..4)).collect();
        let column = fexec_test_utils::columns::low_cardinality_int64(&dictionary, &indexes)
            .unwrap();
        let arguments = vec![Argument::new(
            column,
            DataType::low_cardinality(int64_type()),
            "x",
        )];
        let result_type = resolve(&negate, &arguments);
        assert!(result_type.is_low_cardinality());

        let result = FunctionExecutor::new(&negate)
            .execute(&arguments, &result_type, rows)
            .unwrap();
        assert!(result.is_low_cardinality());
        let expected: Vec<Option<i64>> = indexes
            .iter()
            .map(|ix| Some(-dictionary[*ix as usize]))
            .collect();
        assert_eq!(int64_values(&result).unwrap(), expected);
    }
}
