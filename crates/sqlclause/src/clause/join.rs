//! Outer-join registration info and fixed-condition resolution.

use crate::fragment::QueryClause;

/// Variable in a fixed condition standing for the base-point alias.
pub const LOCAL_ALIAS_VARIABLE: &str = "$$localAlias$$";
/// Variable in a fixed condition standing for the joined table's alias.
pub const FOREIGN_ALIAS_VARIABLE: &str = "$$foreignAlias$$";

/// Resolves alias variables inside a fixed join condition.
pub trait FixedConditionResolver {
    fn resolve(&self, fixed_condition: &str, local_alias: &str, foreign_alias: &str) -> String;
}

/// Plain variable substitution.
#[derive(Debug, Default)]
pub struct VariableFixedConditionResolver;

impl FixedConditionResolver for VariableFixedConditionResolver {
    fn resolve(&self, fixed_condition: &str, local_alias: &str, foreign_alias: &str) -> String {
        fixed_condition
            .replace(LOCAL_ALIAS_VARIABLE, local_alias)
            .replace(FOREIGN_ALIAS_VARIABLE, foreign_alias)
    }
}

/// One registered join. Joins always render in registration order.
#[derive(Debug)]
pub struct JoinInfo {
    pub(crate) alias_name: String,
    pub(crate) table_name: String,
    /// Local/foreign real-name pairs, already alias-qualified.
    pub(crate) join_on: Vec<(String, String)>,
    pub(crate) inner_join: bool,
    pub(crate) inline_where_list: Vec<QueryClause>,
    pub(crate) additional_on_clause_list: Vec<QueryClause>,
    /// Extra on-clause condition with alias variables already resolved.
    pub(crate) fixed_condition: Option<String>,
}

impl JoinInfo {
    pub(crate) fn new(
        table_name: impl Into<String>,
        alias_name: impl Into<String>,
        join_on: Vec<(String, String)>,
    ) -> Self {
        Self {
            alias_name: alias_name.into(),
            table_name: table_name.into(),
            join_on,
            inner_join: false,
            inline_where_list: Vec::new(),
            additional_on_clause_list: Vec::new(),
            fixed_condition: None,
        }
    }

    pub fn alias_name(&self) -> &str {
        &self.alias_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn is_inner_join(&self) -> bool {
        self.inner_join
    }
}
