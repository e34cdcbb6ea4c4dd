//! Behaviour of each executor stage, driven through `FunctionExecutor`.

use fexec_column::{Argument, Column, ColumnKind};
use fexec_function::{FunctionCapabilities, FunctionExecutor, ScalarFunction, resolver};
use fexec_function::ArgumentSignature;
use fexec_result::Error;
use fexec_test_utils::columns::{
    const_int64, const_null_int64, int64, int64_type, int64_values, low_cardinality_int64,
    low_cardinality_strings, null_flags, nullable_int64, sparse_int64, string_values, strings,
    utf8_type,
};
use fexec_test_utils::functions::{
    Add, AlwaysNone, Modulo, NullIfZero, Probe, Series, Upper,
};
use fexec_types::DataType;

fn resolve(function: &dyn ScalarFunction, arguments: &[Argument]) -> DataType {
    let signatures: Vec<ArgumentSignature> = arguments.iter().map(ArgumentSignature::of).collect();
    resolver::return_type(function, &signatures).unwrap()
}

fn execute(function: &dyn ScalarFunction, arguments: &[Argument], rows: usize) -> Column {
    let result_type = resolve(function, arguments);
    FunctionExecutor::new(function)
        .execute(arguments, &result_type, rows)
        .unwrap()
}

#[test]
fn sparse_result_with_changed_default_is_materialized() {
    let plus = Add::default();
    let arguments = vec![
        Argument::new(sparse_int64(&[0, 0, 5, 0]).unwrap(), int64_type(), "x"),
        Argument::new(const_int64(1, 4).unwrap(), int64_type(), "one"),
    ];
    let result = execute(&plus, &arguments, 4);
    assert_eq!(result.kind(), ColumnKind::Full);
    assert_eq!(
        int64_values(&result).unwrap(),
        vec![Some(1), Some(1), Some(6), Some(1)]
    );
}

#[test]
fn sparse_result_with_extra_defaults_is_materialized() {
    let modulo = Modulo::default();
    let arguments = vec![
        Argument::new(sparse_int64(&[0, 5, 0, 7]).unwrap(), int64_type(), "x"),
        Argument::new(const_int64(5, 4).unwrap(), int64_type(), "five"),
    ];
    let result = execute(&modulo, &arguments, 4);
    assert_eq!(result.kind(), ColumnKind::Full);
    assert_eq!(
        int64_values(&result).unwrap(),
        vec![Some(0), Some(0), Some(0), Some(2)]
    );
}

#[test]
fn sparse_input_with_nullable_result_is_materialized() {
    let function = NullIfZero::default();
    let arguments = vec![Argument::new(
        sparse_int64(&[0, 0, 5, 0]).unwrap(),
        int64_type(),
        "x",
    )];
    let result = execute(&function, &arguments, 4);
    assert!(!result.is_sparse());
    assert_eq!(
        int64_values(&result).unwrap(),
        vec![None, None, Some(5), None]
    );
}

#[test]
fn sparse_without_default_rows_is_expanded() {
    let probe = Probe::new(FunctionCapabilities::default(), 1);
    let arguments = vec![Argument::new(sparse_int64(&[1, 2, 3]).unwrap(), int64_type(), "x")];
    execute(&probe, &arguments, 3);
    let calls = probe.calls();
    assert_eq!(calls[0].kinds, vec![ColumnKind::Full]);
    assert_eq!(calls[0].rows, 3);
}

#[test]
fn function_typed_result_never_runs_on_sparse_values() {
    let function_type = DataType::function(vec![int64_type()], int64_type());
    let probe = Probe::new(FunctionCapabilities::default(), 1).returning(function_type.clone());
    let arguments = vec![Argument::new(
        sparse_int64(&[0, 0, 9, 0]).unwrap(),
        int64_type(),
        "x",
    )];
    FunctionExecutor::new(&probe)
        .execute(&arguments, &function_type, 4)
        .unwrap();
    let calls = probe.calls();
    assert_eq!(calls[0].kinds, vec![ColumnKind::Full]);
    assert_eq!(calls[0].rows, 4);
}

#[test]
fn two_sparse_arguments_are_expanded() {
    let plus = Add::default();
    let arguments = vec![
        Argument::new(sparse_int64(&[0, 3, 0]).unwrap(), int64_type(), "a"),
        Argument::new(sparse_int64(&[0, 0, 4]).unwrap(), int64_type(), "b"),
    ];
    let result = execute(&plus, &arguments, 3);
    assert_eq!(result.kind(), ColumnKind::Full);
    assert_eq!(int64_values(&result).unwrap(), vec![Some(0), Some(3), Some(4)]);
}

#[test]
fn unsafe_function_sees_only_referenced_dictionary_values() {
    let arguments = vec![
        Argument::new(const_int64(100, 3).unwrap(), int64_type(), "hundred"),
        Argument::new(
            low_cardinality_int64(&[0, 7, 9], &[1, 2, 1]).unwrap(),
            DataType::low_cardinality(int64_type()),
            "divisor",
        ),
    ];

    let modulo = Modulo::default();
    let result_type = resolve(&modulo, &arguments);
    assert_eq!(result_type, DataType::low_cardinality(int64_type()));
    let result = FunctionExecutor::new(&modulo)
        .execute(&arguments, &result_type, 3)
        .unwrap();
    let encoded = result.as_low_cardinality().expect("dictionary-encoded result");
    assert_eq!(encoded.dictionary().len(), 2);
    assert_eq!(int64_values(&result).unwrap(), vec![Some(2), Some(1), Some(2)]);

    // Evaluating on every dictionary value divides by the default zero.
    let careless = Modulo::new(FunctionCapabilities::default());
    assert!(matches!(
        FunctionExecutor::new(&careless).execute(&arguments, &result_type, 3),
        Err(Error::Arrow(_))
    ));
}

#[test]
fn constant_dictionary_argument_yields_constant_dictionary_result() {
    let upper = Upper::new(FunctionCapabilities::default().with_constants(true));
    let column = Column::constant(low_cardinality_strings(&["x"], &[0]).unwrap(), 5).unwrap();
    let arguments = vec![Argument::new(
        column,
        DataType::low_cardinality(utf8_type()),
        "s",
    )];
    let result = execute(&upper, &arguments, 5);
    let constant = result.as_const().expect("constant result");
    assert_eq!(constant.len(), 5);
    assert!(constant.data().is_low_cardinality());
    assert_eq!(
        string_values(&result).unwrap(),
        vec![Some("X".to_string()); 5]
    );
}

#[test]
fn dictionary_result_with_two_dictionary_columns_falls_back() {
    let probe = Probe::new(FunctionCapabilities::default(), 2);
    let lc_utf8 = DataType::low_cardinality(utf8_type());
    let arguments = vec![
        Argument::new(
            low_cardinality_strings(&["p", "q"], &[0, 1]).unwrap(),
            lc_utf8.clone(),
            "a",
        ),
        Argument::new(
            low_cardinality_strings(&["r"], &[0, 0]).unwrap(),
            lc_utf8.clone(),
            "b",
        ),
    ];
    let result = FunctionExecutor::new(&probe)
        .execute(&arguments, &lc_utf8, 2)
        .unwrap();
    assert!(result.is_low_cardinality());
    assert_eq!(
        string_values(&result).unwrap(),
        vec![Some("p".to_string()), Some("q".to_string())]
    );
    let calls = probe.calls();
    assert_eq!(calls[0].kinds, vec![ColumnKind::Full, ColumnKind::Full]);
    assert_eq!(calls[0].types, vec![utf8_type(), utf8_type()]);
}

#[test]
fn plain_result_expands_dictionary_arguments() {
    let probe = Probe::new(FunctionCapabilities::default(), 2);
    let arguments = vec![
        Argument::new(
            low_cardinality_strings(&["p", "q"], &[1, 1, 0]).unwrap(),
            DataType::low_cardinality(utf8_type()),
            "a",
        ),
        Argument::new(strings(&["u", "v", "w"]), utf8_type(), "b"),
    ];
    let result = execute(&probe, &arguments, 3);
    assert_eq!(result.kind(), ColumnKind::Full);
    assert_eq!(probe.calls()[0].kinds, vec![ColumnKind::Full, ColumnKind::Full]);
    assert_eq!(probe.calls()[0].rows, 3);
}

#[test]
fn nullable_dictionary_runs_on_dictionary_values() {
    let upper = Upper::default();
    let nested = low_cardinality_strings(&["a", "b"], &[0, 1, 1]).unwrap();
    let column = Column::nullable(
        nested,
        fexec_column::null_map_from_bools(&[false, true, false]),
    )
    .unwrap();
    let arguments = vec![Argument::new(
        column,
        DataType::nullable(DataType::low_cardinality(utf8_type())),
        "s",
    )];
    assert_eq!(
        resolve(&upper, &arguments),
        DataType::nullable(DataType::low_cardinality(utf8_type()))
    );

    let result = execute(&upper, &arguments, 3);
    let nullable = result.as_nullable().expect("nullable result");
    let encoded = nullable
        .nested()
        .as_low_cardinality()
        .expect("dictionary-encoded values");
    assert_eq!(encoded.dictionary().len(), 2);
    assert_eq!(encoded.indexes().values().as_ref(), &[0, 1, 1]);
    assert_eq!(null_flags(&result), vec![false, true, false]);
    assert_eq!(
        string_values(&result).unwrap(),
        vec![Some("A".to_string()), None, Some("B".to_string())]
    );
}

#[test]
fn nullable_dictionary_body_sees_only_dictionary_rows() {
    let probe = Probe::new(FunctionCapabilities::default(), 1);
    let column = Column::nullable(
        low_cardinality_strings(&["x", "y"], &[1, 1, 0, 1]).unwrap(),
        fexec_column::null_map_from_bools(&[true, false, false, false]),
    )
    .unwrap();
    let arguments = vec![Argument::new(
        column,
        DataType::nullable(DataType::low_cardinality(utf8_type())),
        "s",
    )];
    let result = execute(&probe, &arguments, 4);
    assert_eq!(result.len(), 4);
    assert_eq!(null_flags(&result), vec![true, false, false, false]);

    let call = &probe.calls()[0];
    assert_eq!(call.kinds, vec![ColumnKind::Full]);
    assert_eq!(call.types, vec![utf8_type()]);
    assert_eq!(call.rows, 2);
}

#[test]
fn constants_run_once_and_broadcast() {
    let plus = Add::default();
    let arguments = vec![
        Argument::new(const_int64(4, 7).unwrap(), int64_type(), "a"),
        Argument::new(const_int64(5, 7).unwrap(), int64_type(), "b"),
    ];
    let result = execute(&plus, &arguments, 7);
    let constant = result.as_const().expect("constant result");
    assert_eq!(constant.len(), 7);
    assert_eq!(int64_values(constant.data()).unwrap(), vec![Some(9)]);
}

#[test]
fn extra_rows_from_constant_arguments_are_dropped() {
    let series = Series::default();
    let arguments = vec![Argument::new(const_int64(10, 5).unwrap(), int64_type(), "start")];
    let result = execute(&series, &arguments, 5);
    assert!(result.is_const());
    assert_eq!(int64_values(&result).unwrap(), vec![Some(10); 5]);
}

#[test]
fn pinned_constant_arguments_stay_constant() {
    let caps = FunctionCapabilities::default()
        .with_constants(true)
        .with_always_constant_arguments(vec![1]);
    let probe = Probe::new(caps, 2);
    let arguments = vec![
        Argument::new(const_int64(1, 4).unwrap(), int64_type(), "a"),
        Argument::new(const_int64(2, 4).unwrap(), int64_type(), "b"),
    ];
    let result = execute(&probe, &arguments, 4);
    assert!(result.is_const());
    let call = &probe.calls()[0];
    assert_eq!(call.kinds, vec![ColumnKind::Full, ColumnKind::Const]);
    assert_eq!(call.rows, 1);
}

#[test]
fn pinned_position_rejects_full_column_even_with_constants_off() {
    let caps = FunctionCapabilities::default().with_always_constant_arguments(vec![1]);
    let probe = Probe::new(caps, 2);
    let arguments = vec![
        Argument::new(int64(&[1, 2]), int64_type(), "a"),
        Argument::new(int64(&[3, 4]), int64_type(), "b"),
    ];
    let err = FunctionExecutor::new(&probe)
        .execute(&arguments, &int64_type(), 2)
        .unwrap_err();
    assert!(matches!(err, Error::IllegalColumn(msg) if msg.contains("index 1")));
}

#[test]
fn all_arguments_pinned_is_an_arity_error() {
    let caps = FunctionCapabilities::default()
        .with_constants(true)
        .with_always_constant_arguments(vec![0]);
    let probe = Probe::new(caps, 1);
    let arguments = vec![Argument::new(const_int64(1, 3).unwrap(), int64_type(), "a")];
    let err = FunctionExecutor::new(&probe)
        .execute(&arguments, &int64_type(), 3)
        .unwrap_err();
    match err {
        Error::ArgumentCountMismatch {
            passed, expected, ..
        } => {
            assert_eq!(passed, 1);
            assert_eq!(expected, "at least 2");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn constant_null_short_circuits() {
    let probe = Probe::new(FunctionCapabilities::default(), 2);
    let arguments = vec![
        Argument::new(int64(&[1, 2, 3]), int64_type(), "a"),
        Argument::new(
            Column::const_default_for_type(&DataType::null(), 3).unwrap(),
            DataType::null(),
            "null",
        ),
    ];
    let nullable_int64_type = DataType::nullable(int64_type());
    let result = FunctionExecutor::new(&probe)
        .execute(&arguments, &nullable_int64_type, 3)
        .unwrap();
    assert!(result.is_const());
    assert!(result.only_null());
    assert_eq!(result.len(), 3);
    assert!(probe.calls().is_empty());

    assert!(matches!(
        FunctionExecutor::new(&probe).execute(&arguments, &int64_type(), 3),
        Err(Error::InvariantViolation(_))
    ));
}

#[test]
fn constant_null_of_nullable_type_nulls_every_row() {
    let plus = Add::new(FunctionCapabilities::default());
    let arguments = vec![
        Argument::new(
            nullable_int64(&[Some(1), Some(2)]).unwrap(),
            DataType::nullable(int64_type()),
            "a",
        ),
        Argument::new(const_null_int64(2).unwrap(), DataType::nullable(int64_type()), "b"),
    ];
    let result = execute(&plus, &arguments, 2);
    assert_eq!(null_flags(&result), vec![true, true]);
}

#[test]
fn nested_result_null_map_is_combined() {
    let function = NullIfZero::default();
    let arguments = vec![Argument::new(
        nullable_int64(&[Some(0), None, Some(3)]).unwrap(),
        DataType::nullable(int64_type()),
        "x",
    )];
    let result = execute(&function, &arguments, 3);
    assert_eq!(null_flags(&result), vec![true, true, false]);
}

#[test]
fn nothing_requires_nothing_result_type() {
    let probe = Probe::new(FunctionCapabilities::default(), 1);
    let arguments = vec![Argument::new(Column::nothing(0), DataType::Nothing, "n")];
    assert!(matches!(
        FunctionExecutor::new(&probe).execute(&arguments, &int64_type(), 0),
        Err(Error::InvariantViolation(_))
    ));
}

#[test]
fn missing_result_column_is_an_invariant_violation() {
    let function = AlwaysNone::default();
    let arguments = vec![Argument::new(int64(&[1, 2]), int64_type(), "x")];
    let err = FunctionExecutor::new(&function)
        .execute(&arguments, &int64_type(), 2)
        .unwrap_err();
    assert!(matches!(err, Error::InvariantViolation(msg) if msg.contains("always_none")));
}

#[test]
fn argument_rows_must_match_requested_rows() {
    let probe = Probe::new(FunctionCapabilities::default(), 1);
    let arguments = vec![Argument::new(int64(&[1, 2]), int64_type(), "x")];
    assert!(matches!(
        FunctionExecutor::new(&probe).execute(&arguments, &int64_type(), 3),
        Err(Error::SizeMismatch {
            expected: 3,
            actual: 2,
            ..
        })
    ));
}

#[test]
fn null_rows_require_a_nullable_result_type() {
    let plus = Add::default();
    let arguments = vec![
        Argument::new(
            nullable_int64(&[Some(1), None, Some(3)]).unwrap(),
            DataType::nullable(int64_type()),
            "x",
        ),
        Argument::new(const_int64(10, 3).unwrap(), int64_type(), "ten"),
    ];
    let err = FunctionExecutor::new(&plus)
        .execute(&arguments, &int64_type(), 3)
        .unwrap_err();
    assert!(matches!(err, Error::InvariantViolation(msg) if msg.contains("argument x")));

    let no_nulls = vec![
        Argument::new(
            nullable_int64(&[Some(1), Some(2)]).unwrap(),
            DataType::nullable(int64_type()),
            "x",
        ),
        Argument::new(const_int64(10, 2).unwrap(), int64_type(), "ten"),
    ];
    let result = FunctionExecutor::new(&plus)
        .execute(&no_nulls, &int64_type(), 2)
        .unwrap();
    assert_eq!(result.kind(), ColumnKind::Full);
    assert_eq!(int64_values(&result).unwrap(), vec![Some(11), Some(12)]);
}

#[test]
fn constant_null_of_nullable_type_requires_a_nullable_result_type() {
    let plus = Add::new(FunctionCapabilities::default());
    let arguments = vec![
        Argument::new(int64(&[1, 2]), int64_type(), "a"),
        Argument::new(const_null_int64(2).unwrap(), DataType::nullable(int64_type()), "b"),
    ];
    assert!(matches!(
        FunctionExecutor::new(&plus).execute(&arguments, &int64_type(), 2),
        Err(Error::InvariantViolation(_))
    ));
}

#[test]
fn result_with_wrong_row_count_is_rejected() {
    let series = Series::new(FunctionCapabilities::default());
    let arguments = vec![Argument::new(int64(&[1, 2, 3, 4, 5]), int64_type(), "start")];
    assert!(matches!(
        FunctionExecutor::new(&series).execute(&arguments, &int64_type(), 5),
        Err(Error::SizeMismatch {
            expected: 5,
            actual: 3,
            ..
        })
    ));
}

#[test]
fn sparse_sub_result_with_wrong_row_count_is_rejected() {
    let series = Series::new(FunctionCapabilities::default());
    let arguments = vec![Argument::new(
        sparse_int64(&[0, 0, 5, 0]).unwrap(),
        int64_type(),
        "start",
    )];
    assert!(matches!(
        FunctionExecutor::new(&series).execute(&arguments, &int64_type(), 4),
        Err(Error::SizeMismatch {
            expected: 2,
            actual: 3,
            ..
        })
    ));
}
