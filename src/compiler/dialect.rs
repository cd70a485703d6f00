//! The SQL Server dialect descriptor.

use once_cell::sync::Lazy;

use crate::sql::dialect::{SqlDialect, TSql};

use super::context::{CompileContext, Params};
use super::error::CompileResult;
use super::registry::OperationRegistry;
use super::relation;
use super::rules::RewriteRules;
use super::translator::ExprTranslator;
use super::type_map::TypeMapper;
use super::{CompiledQuery, Expression};

static MSSQL: Lazy<MsSqlDialect> = Lazy::new(MsSqlDialect::new);

/// Everything needed to compile for SQL Server: rendering rules, type map,
/// rewrite rules and the operation registry.
///
/// Immutable once built; one process-wide instance is shared by every
/// compilation and every client.
#[derive(Debug)]
pub struct MsSqlDialect {
    name: &'static str,
    sql: TSql,
    types: TypeMapper,
    rules: RewriteRules,
    registry: OperationRegistry,
}

impl MsSqlDialect {
    fn new() -> Self {
        Self {
            name: "mssql",
            sql: TSql,
            types: TypeMapper,
            rules: RewriteRules::base(),
            registry: OperationRegistry::mssql(),
        }
    }

    /// The shared instance.
    pub fn get() -> &'static MsSqlDialect {
        &MSSQL
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Native rendering rules.
    pub fn sql_dialect(&self) -> &dyn SqlDialect {
        &self.sql
    }

    pub fn type_mapper(&self) -> &TypeMapper {
        &self.types
    }

    pub fn rewrite_rules(&self) -> &RewriteRules {
        &self.rules
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Compile `expr` with `params` bound.
    ///
    /// Pure: the same tree and parameters always produce the same query.
    pub fn compile(
        &self,
        expr: impl Into<Expression>,
        params: &Params,
    ) -> CompileResult<CompiledQuery> {
        let expr = expr.into().rewrite(&self.rules);

        let mut translator = ExprTranslator::new(self, CompileContext::new(params));
        let query = relation::compile_expression(&mut translator, &expr)?;
        let params = translator.into_context().into_params();

        let compiled = CompiledQuery::new(query, params);
        tracing::debug!(
            dialect = self.name,
            params = compiled.params().len(),
            sql = %compiled.to_sql(),
            "compiled expression"
        );
        Ok(compiled)
    }
}
