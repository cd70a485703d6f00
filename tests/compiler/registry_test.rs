//! The SQL Server operation registry as a contract: what compiles, what is
//! rejected up front, and what only exists through rewrites.

#[path = "../common/mod.rs"]
mod common;

use mssql_compiler::compiler::{
    compile, CompileError, MsSqlDialect, OperationRegistry, Params, Translator,
    MSSQL_OVERRIDES, MSSQL_UNSUPPORTED,
};
use mssql_compiler::ir::{OpKind, ValueExpr};

use common::alltypes;

#[test]
fn test_unsupported_kinds_are_registered() {
    let registry = MsSqlDialect::get().registry();
    let mut expected: Vec<OpKind> = MSSQL_UNSUPPORTED.to_vec();
    expected.sort();
    assert_eq!(registry.unsupported(), expected);
    assert_eq!(expected.len(), 26);
}

#[test]
fn test_every_kind_is_accounted_for() {
    let dialect = MsSqlDialect::get();
    for &kind in OpKind::ALL {
        let registry = dialect.registry();
        let rewritten = dialect.rewrite_rules().rewrites(kind);
        let known = registry.get(kind).is_some();
        assert!(
            known || rewritten || kind == OpKind::Hash,
            "{} has neither a translator nor a rewrite",
            kind
        );
    }
}

#[test]
fn test_overrides_rename_functions() {
    let registry = OperationRegistry::mssql();
    let names: Vec<(OpKind, &str)> = [
        OpKind::Ceil,
        OpKind::Repeat,
        OpKind::StringLength,
        OpKind::Strip,
        OpKind::Atan2,
        OpKind::TimestampNow,
    ]
    .into_iter()
    .map(|kind| {
        let name = match registry.get(kind) {
            Some(Translator::Unary(name)) | Some(Translator::FixedArity(name, _)) => *name,
            other => panic!("unexpected translator for {}: {:?}", kind, other),
        };
        (kind, name)
    })
    .collect();

    assert_eq!(
        names,
        vec![
            (OpKind::Ceil, "ceiling"),
            (OpKind::Repeat, "replicate"),
            (OpKind::StringLength, "len"),
            (OpKind::Strip, "trim"),
            (OpKind::Atan2, "atn2"),
            (OpKind::TimestampNow, "getdate"),
        ]
    );
}

#[test]
fn test_unsupported_wins_over_overrides() {
    let registry = OperationRegistry::build(
        &[(OpKind::Modulus, Translator::FixedArity("mod", 2))],
        &[OpKind::Modulus],
    );
    assert!(!registry.supports(OpKind::Modulus));
    assert!(registry.get(OpKind::Modulus).is_some_and(Translator::is_unsupported));
}

#[test]
fn test_overrides_cover_a_subset_of_kinds() {
    for (kind, _) in MSSQL_OVERRIDES {
        assert!(
            !MSSQL_UNSUPPORTED.contains(kind),
            "{} is both overridden and unsupported",
            kind
        );
    }
}

#[test]
fn test_unsupported_error_names_kind() {
    let t = alltypes();
    let expr = ValueExpr::op(OpKind::RegexSearch, vec![t.col("string_col"), "a+".into()]);
    let err = compile(expr, &Params::new()).unwrap_err();
    assert_eq!(err.op_kind(), Some(OpKind::RegexSearch));
    assert_eq!(
        err.to_string(),
        r#"SQL Server backend doesn't support the regex_search operation: regex_search(functional_alltypes.string_col, "a+")"#
    );
    assert!(matches!(err, CompileError::UnsupportedOperation(_)));
}
