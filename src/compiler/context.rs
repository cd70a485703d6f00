//! Per-call compilation state.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ir::{TableName, Value};

use super::error::{CompileError, CompileResult};

/// Named scalar parameter values supplied at compile time.
pub type Params = BTreeMap<String, Value>;

static PARAM_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Fails unless `name` can follow `@` as a T-SQL variable name.
pub fn check_param_name(name: &str) -> CompileResult<()> {
    if PARAM_NAME.is_match(name) {
        Ok(())
    } else {
        Err(CompileError::InvalidExpression(format!(
            "parameter name {:?} is not a valid identifier",
            name
        )))
    }
}

/// State scoped to one `compile` call: table aliases assigned so far and
/// the parameters the tree referenced.
#[derive(Debug)]
pub struct CompileContext<'p> {
    params: &'p Params,
    aliases: Vec<(TableName, String)>,
    used_params: BTreeMap<String, Option<Value>>,
}

impl<'p> CompileContext<'p> {
    pub fn new(params: &'p Params) -> Self {
        Self {
            params,
            aliases: Vec::new(),
            used_params: BTreeMap::new(),
        }
    }

    /// Assign the next alias (`t0`, `t1`, ...) to `table`.
    ///
    /// A table can appear once per query; joining a table with itself needs
    /// distinct names to tell the sides apart.
    pub fn register_table(&mut self, table: &TableName) -> CompileResult<String> {
        if self.aliases.iter().any(|(t, _)| t == table) {
            return Err(CompileError::InvalidExpression(format!(
                "table '{}' appears more than once; self-joins are not supported",
                table
            )));
        }
        let alias = format!("t{}", self.aliases.len());
        self.aliases.push((table.clone(), alias.clone()));
        Ok(alias)
    }

    /// Alias previously assigned to `table`.
    pub fn alias_for(&self, table: &TableName) -> CompileResult<&str> {
        self.aliases
            .iter()
            .find(|(t, _)| t == table)
            .map(|(_, alias)| alias.as_str())
            .ok_or_else(|| CompileError::UnknownTable(table.to_string()))
    }

    /// Aliases in assignment order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases.iter().map(|(_, alias)| alias.as_str())
    }

    /// Note a parameter reference, capturing its bound value if supplied.
    pub fn record_param(&mut self, name: &str) -> CompileResult<()> {
        check_param_name(name)?;
        let bound = self.params.get(name).cloned();
        self.used_params.insert(name.to_string(), bound);
        Ok(())
    }

    /// Parameters referenced by the tree; `None` means not yet bound.
    pub fn into_params(self) -> BTreeMap<String, Option<Value>> {
        self.used_params
    }
}
