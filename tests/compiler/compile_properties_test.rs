//! Properties that hold for every compilation.

#[path = "../common/mod.rs"]
mod common;

use mssql_compiler::compiler::{compile, CompileError, MsSqlDialect, Params, MSSQL_UNSUPPORTED};
use mssql_compiler::ir::{param, LogicalType, OpKind, SortKey, Value, ValueExpr};

use common::{alltypes, assert_parses};

#[test]
fn test_compilation_is_deterministic() {
    let t = alltypes();
    let rel = t
        .relation()
        .filter(vec![t.col("int_col").between(1, 5), t.col("string_col").not_null()])
        .select(vec![
            t.col("string_col").length().name("len"),
            t.col("double_col").if_null(0.0).name("d"),
        ])
        .order_by(vec![SortKey::asc(t.col("id"))]);

    let first = compile(rel.clone(), &Params::new()).unwrap();
    let second = compile(rel, &Params::new()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_sql(), second.to_sql());
    assert_parses(&first.to_sql());
}

#[test]
fn test_every_unrepresentable_kind_is_rejected() {
    let t = alltypes();
    for &kind in MSSQL_UNSUPPORTED.iter().chain([OpKind::Hash].iter()) {
        let err = compile(ValueExpr::op(kind, vec![t.col("string_col")]), &Params::new())
            .unwrap_err();
        match &err {
            CompileError::UnsupportedOperation(e) => assert_eq!(e.op, kind),
            other => panic!("{:?} failed with {:?}", kind, other),
        }
        assert!(
            err.to_string().contains(kind.name()),
            "{} missing from: {}",
            kind.name(),
            err
        );
    }
}

#[test]
fn test_unsupported_nested_inside_supported_is_rejected() {
    let t = alltypes();
    let expr = (t.col("double_col").ln() + 1).abs();
    let err = compile(expr, &Params::new()).unwrap_err();
    assert_eq!(err.op_kind(), Some(OpKind::Ln));
}

#[test]
fn test_params_render_as_named_placeholders() {
    let t = alltypes();
    let rel = t
        .relation()
        .filter(vec![t.col("int_col").gt(param("lo", LogicalType::Int32))]);

    let mut params = Params::new();
    params.insert("lo".into(), Value::Int(3));
    params.insert("unused".into(), Value::Int(9));

    let compiled = compile(rel, &params).unwrap();
    let sql = compiled.to_sql();
    assert!(sql.ends_with("WHERE [t0].[int_col] > @lo"));
    assert_parses(&sql);

    assert_eq!(compiled.params().len(), 1);
    assert_eq!(
        compiled.positional_args().unwrap(),
        vec![("lo".to_string(), Value::Int(3))]
    );
}

#[test]
fn test_unbound_param_reported_at_execution() {
    let t = alltypes();
    let compiled = compile(
        t.col("id") + param("delta", LogicalType::Int32),
        &Params::new(),
    )
    .unwrap();

    assert_eq!(compiled.unbound_params(), vec!["delta"]);
    assert_eq!(
        compiled.positional_args(),
        Err(CompileError::UnboundParameter("delta".into()))
    );
}

#[test]
fn test_with_limit_adds_deterministic_fetch() {
    let t = alltypes();
    let compiled = compile(
        t.relation().order_by(vec![SortKey::desc(t.col("id"))]),
        &Params::new(),
    )
    .unwrap()
    .with_limit(100);

    let sql = compiled.to_sql();
    assert!(sql.ends_with("ORDER BY [t0].[id] DESC\nOFFSET 0 ROWS FETCH NEXT 100 ROWS ONLY"));
    assert_parses(&sql);
}

#[test]
fn test_unknown_column_names_table_and_column() {
    let t = alltypes();
    let err = compile(t.col("no_such_col"), &Params::new()).unwrap_err();
    assert_eq!(
        err,
        CompileError::UnknownColumn {
            table: "functional_alltypes".into(),
            column: "no_such_col".into(),
        }
    );
    assert_eq!(
        err.to_string(),
        "table 'functional_alltypes' has no column 'no_such_col'"
    );
}

#[test]
fn test_param_names_must_be_identifiers() {
    let t = alltypes();
    for name in ["x; DROP TABLE t; --", "two words", "1st", "", "a-b"] {
        let err = compile(t.col("id") + param(name, LogicalType::Int32), &Params::new())
            .unwrap_err();
        assert!(
            matches!(err, CompileError::InvalidExpression(_)),
            "{:?} compiled to {:?}",
            name,
            err
        );
    }

    let mut compiled = compile(
        t.col("id") + param("delta", LogicalType::Int32),
        &Params::new(),
    )
    .unwrap();
    assert!(matches!(
        compiled.bind("delta; --", 1),
        Err(CompileError::InvalidExpression(_))
    ));
    compiled.bind("delta", 1).unwrap();
    assert_parses(&compiled.to_sql());
}

#[test]
fn test_concurrent_compiles_agree() {
    let t = alltypes();
    let rel = t
        .relation()
        .filter(vec![t.col("int_col").between(1, 5)])
        .group_by(vec![t.col("string_col").name("string_col")])
        .aggregate(vec![t.col("bool_col").sum().name("n")]);
    let dialect = MsSqlDialect::get();
    let expected = dialect.compile(rel.clone(), &Params::new()).unwrap().to_sql();

    let results: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let rel = rel.clone();
                scope.spawn(move || {
                    MsSqlDialect::get()
                        .compile(rel, &Params::new())
                        .unwrap()
                        .to_sql()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.len(), 8);
    assert!(results.iter().all(|sql| *sql == expected));
}
