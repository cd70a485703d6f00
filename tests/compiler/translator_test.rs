//! Per-operation translation into T-SQL fragments.

#[path = "../common/mod.rs"]
mod common;

use chrono::NaiveDate;
use mssql_compiler::compiler::{compile, CompileError, Params};
use mssql_compiler::ir::{lit, now, param, LogicalType, OpKind, ValueExpr};
use mssql_compiler::sql::TSql;

use common::{alltypes, assert_parses};

/// Compile `expr` as a scalar and return its select item.
fn item(expr: ValueExpr) -> String {
    let compiled = compile(expr, &Params::new()).unwrap();
    assert_parses(&compiled.to_sql());
    compiled.query().select[0].expr.to_sql(&TSql)
}

fn unsupported(expr: ValueExpr) -> OpKind {
    match compile(expr, &Params::new()) {
        Err(CompileError::UnsupportedOperation(e)) => e.op,
        other => panic!("expected UnsupportedOperationError, got {:?}", other),
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_arithmetic() {
    let t = alltypes();
    assert_eq!(item(t.col("double_col") + 1), "[t0].[double_col] + 1");
    assert_eq!(
        item((t.col("int_col") + 1) * 2),
        "([t0].[int_col] + 1) * 2"
    );
    assert_eq!(item(lit(7).floor_div(2)), "FLOOR(7 / 2)");
    assert_eq!(item(t.col("double_col").pow(2)), "POWER([t0].[double_col], 2)");
    assert_eq!(item(-t.col("bigint_col")), "-[t0].[bigint_col]");
}

#[test]
fn test_math_renames() {
    let t = alltypes();
    assert_eq!(item(t.col("double_col").ceil()), "CEILING([t0].[double_col])");
    assert_eq!(
        item(t.col("double_col").atan2(t.col("float_col"))),
        "ATN2([t0].[double_col], [t0].[float_col])"
    );
    assert_eq!(item(t.col("double_col").sqrt()), "SQRT([t0].[double_col])");
}

#[test]
fn test_unsupported_math() {
    let t = alltypes();
    assert_eq!(unsupported(t.col("double_col").round()), OpKind::Round);
    assert_eq!(unsupported(t.col("double_col").ln()), OpKind::Ln);
    assert_eq!(unsupported(t.col("double_col").log(2)), OpKind::Log);
    assert_eq!(unsupported(t.col("int_col") % 2), OpKind::Modulus);
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_string_find_is_zero_based() {
    assert_eq!(
        item(lit("hello world").find("wor")),
        "CHARINDEX('wor', 'hello world') - 1"
    );
    let t = alltypes();
    assert_eq!(
        item(t.col("string_col").find_from("o", 2)),
        "CHARINDEX('o', [t0].[string_col], 2) - 1"
    );
}

#[test]
fn test_substring_shifts_start() {
    let t = alltypes();
    assert_eq!(
        item(t.col("string_col").substr(2)),
        "SUBSTRING([t0].[string_col], 3)"
    );
    assert_eq!(
        item(t.col("string_col").substr_len(2, 5)),
        "SUBSTRING([t0].[string_col], 3, 5)"
    );
    assert_eq!(
        item(t.col("string_col").substr(t.col("int_col"))),
        "SUBSTRING([t0].[string_col], [t0].[int_col] + 1)"
    );
}

#[test]
fn test_string_renames() {
    let t = alltypes();
    let s = || t.col("string_col");
    assert_eq!(item(s().length()), "LEN([t0].[string_col])");
    assert_eq!(item(s().repeat(3)), "REPLICATE([t0].[string_col], 3)");
    assert_eq!(item(s().strip()), "TRIM([t0].[string_col])");
    assert_eq!(item(s().lstrip()), "LTRIM([t0].[string_col])");
    assert_eq!(item(s().upper()), "UPPER([t0].[string_col])");
    assert_eq!(
        item(s().replace("a", "b")),
        "REPLACE([t0].[string_col], 'a', 'b')"
    );
    assert_eq!(item(s().concat("!")), "[t0].[string_col] + '!'");
}

#[test]
fn test_unsupported_strings() {
    let t = alltypes();
    let s = || t.col("string_col");
    assert_eq!(unsupported(s().contains("a")), OpKind::Contains);
    assert_eq!(unsupported(s().not_contains("a")), OpKind::NotContains);
    assert_eq!(unsupported(s().lpad(5, "-")), OpKind::LPad);
    assert_eq!(unsupported(s().capitalize()), OpKind::Capitalize);
    assert_eq!(unsupported(s().re_replace("a+", "b")), OpKind::RegexReplace);
    assert_eq!(unsupported(s().ascii()), OpKind::StringAscii);
    assert_eq!(unsupported(s().like("a%")), OpKind::StringSqlLike);
}

// ============================================================================
// Reductions
// ============================================================================

#[test]
fn test_boolean_reductions_cast() {
    let t = alltypes();
    assert_eq!(
        item(t.col("bool_col").sum()),
        "SUM(CAST([t0].[bool_col] AS INT))"
    );
    assert_eq!(
        item(t.col("bool_col").mean()),
        "AVG(CAST([t0].[bool_col] AS REAL))"
    );
    assert_eq!(
        item(t.col("int_col").gt(0).sum()),
        "SUM(CAST(CASE WHEN [t0].[int_col] > 0 THEN 1 ELSE 0 END AS INT))"
    );
}

#[test]
fn test_numeric_reductions_uncast() {
    let t = alltypes();
    assert_eq!(item(t.col("int_col").sum()), "SUM([t0].[int_col])");
    assert_eq!(item(t.col("double_col").mean()), "AVG([t0].[double_col])");
    assert_eq!(item(t.col("double_col").max()), "MAX([t0].[double_col])");
}

#[test]
fn test_filtered_reduction() {
    let t = alltypes();
    assert_eq!(
        item(t.col("id").count().filter(t.col("int_col").gt(5))),
        "COUNT(CASE WHEN [t0].[int_col] > 5 THEN [t0].[id] ELSE NULL END)"
    );
}

#[test]
fn test_unsupported_reductions() {
    let t = alltypes();
    assert_eq!(unsupported(t.col("bool_col").notany()), OpKind::NotAny);
    assert_eq!(unsupported(t.col("int_col").cumsum()), OpKind::CumulativeSum);
    assert_eq!(unsupported(t.col("int_col").cummean()), OpKind::CumulativeMean);
}

// ============================================================================
// Temporal
// ============================================================================

#[test]
fn test_extract_casts_to_smallint() {
    let t = alltypes();
    assert_eq!(
        item(t.col("timestamp_col").year()),
        "CAST(DATEPART(year, [t0].[timestamp_col]) AS SMALLINT)"
    );
    assert_eq!(
        item(t.col("timestamp_col").millisecond()),
        "CAST(DATEPART(millisecond, [t0].[timestamp_col]) AS SMALLINT)"
    );
}

#[test]
fn test_now_and_truncate() {
    assert_eq!(item(now()), "GETDATE()");
    let t = alltypes();
    assert_eq!(
        unsupported(t.col("timestamp_col").truncate("day")),
        OpKind::TimestampTruncate
    );
}

// ============================================================================
// Predicates, nulls and literals
// ============================================================================

#[test]
fn test_predicates_in_value_context() {
    let t = alltypes();
    assert_eq!(
        item(t.col("int_col").isin(vec![1.into(), 2.into()])),
        "CASE WHEN [t0].[int_col] IN (1, 2) THEN 1 ELSE 0 END"
    );
    assert_eq!(
        item(t.col("int_col").between(0, 10)),
        "CASE WHEN ([t0].[int_col] >= 0) AND ([t0].[int_col] <= 10) THEN 1 ELSE 0 END"
    );
    assert_eq!(
        item(t.col("string_col").not_null()),
        "CASE WHEN NOT ([t0].[string_col] IS NULL) THEN 1 ELSE 0 END"
    );
}

#[test]
fn test_null_handling() {
    let t = alltypes();
    assert_eq!(
        item(t.col("string_col").if_null("n/a")),
        "COALESCE([t0].[string_col], 'n/a')"
    );
    assert_eq!(unsupported(t.col("int_col").nullif(0)), OpKind::NullIf);
}

#[test]
fn test_literals() {
    assert_eq!(item(lit(1.5)), "1.5");
    assert_eq!(item(lit(true)), "1");
    assert_eq!(item(lit("it's")), "'it''s'");
    assert_eq!(item(lit("héllo")), "N'héllo'");

    let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    assert_eq!(item(lit(date)), "'2024-01-31'");
    let ts = date.and_hms_opt(12, 30, 0).unwrap();
    assert_eq!(item(lit(ts)), "CAST('2024-01-31T12:30:00' AS DATETIME2)");
}

#[test]
fn test_params_render_named() {
    let t = alltypes();
    assert_eq!(
        item(t.col("int_col") + param("step", LogicalType::Int32)),
        "[t0].[int_col] + @step"
    );
}
