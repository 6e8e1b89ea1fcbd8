//! Query-insert, query-update and query-delete rendering.
//!
//! These statements reuse the registered query state: the from-where template
//! supplies the row-narrowing part and the template marks are substituted for
//! the statement kind at hand.

use tracing::debug;

use crate::error::{ClauseError, ClauseResult};
use crate::indent::SubQueryIndentProcessor;

use super::{
    LOCAL_ALIAS_NAME, RESOURCE_VIEW_ALIAS_NAME, SqlClause, UNION_SELECT_CLAUSE_MARK,
    UNION_WHERE_CLAUSE_MARK, UNION_WHERE_FIRST_CONDITION_MARK,
};

impl SqlClause {
    // ==================== Query Insert ====================

    /// Render `insert into ... select ...` from a resource query. Target
    /// columns are fed by the resource's specified select columns first, then
    /// by the fixed value expressions; unmatched columns are omitted.
    pub fn get_clause_query_insert(
        &self,
        fixed_value_map: &[(String, String)],
        resource: &mut SqlClause,
    ) -> ClauseResult<String> {
        let schema = std::sync::Arc::clone(&self.schema);
        let table = schema.find_table(&self.table_name).ok_or_else(|| {
            ClauseError::precondition(format!("unknown table: {}", self.table_name))
        })?;
        let specified: Vec<String> = resource
            .specified_columns_of(LOCAL_ALIAS_NAME)
            .cloned()
            .ok_or_else(|| {
                ClauseError::precondition(
                    "queryInsert() needs at least one specified select column on the resource",
                )
            })?;
        let resource_clause = resource.get_clause()?;

        let mut column_names = Vec::new();
        let mut value_expressions = Vec::new();
        for column in &table.columns {
            if specified.iter().any(|name| name == &column.name) {
                let real_column_name = format!("{LOCAL_ALIAS_NAME}.{}", column.name);
                let on_query_name = resource
                    .real_column_alias_map
                    .get(&real_column_name)
                    .ok_or_else(|| {
                        ClauseError::precondition(format!(
                            "the specified column was not found in the resource select clause: {}",
                            column.name
                        ))
                    })?;
                value_expressions.push(format!("{RESOURCE_VIEW_ALIAS_NAME}.{on_query_name}"));
            } else if let Some((_, expression)) = fixed_value_map
                .iter()
                .find(|(name, _)| name == &column.name)
            {
                value_expressions.push(expression.clone());
            } else {
                continue;
            }
            column_names.push(column.name.clone());
        }
        if column_names.is_empty() {
            return Err(ClauseError::precondition(
                "queryInsert() resolved no target columns",
            ));
        }

        let begin_mark = SubQueryIndentProcessor::resolve_begin_mark(RESOURCE_VIEW_ALIAS_NAME);
        let end_mark = SubQueryIndentProcessor::resolve_end_mark(RESOURCE_VIEW_ALIAS_NAME);
        let sql = format!(
            "insert into {} ({})\nselect {}\n  from ({begin_mark}\n{resource_clause}\n     ) {RESOURCE_VIEW_ALIAS_NAME}{end_mark}",
            self.table_name,
            column_names.join(", "),
            value_expressions.join(", "),
        );
        let sql = SubQueryIndentProcessor::new().process(&sql)?;
        debug!(table = %self.table_name, "built query-insert clause");
        Ok(sql)
    }

    // ==================== Query Update ====================

    /// Render a set-based update narrowed by the registered conditions.
    /// Returns `None` when no column is assigned.
    pub fn get_clause_query_update(
        &self,
        column_parameter_map: &[(String, String)],
    ) -> ClauseResult<Option<String>> {
        if column_parameter_map.is_empty() {
            return Ok(None);
        }
        let schema = std::sync::Arc::clone(&self.schema);
        let table = schema.find_table(&self.table_name).ok_or_else(|| {
            ClauseError::precondition(format!("unknown table: {}", self.table_name))
        })?;
        let primary_key_name = table
            .primary_keys()
            .first()
            .map(|column| column.name.clone())
            .ok_or_else(|| {
                ClauseError::precondition(format!(
                    "queryUpdate() needs a primary key: tableName={}",
                    self.table_name
                ))
            })?;
        let from_where_clause = self.build_query_dml_from_where(&primary_key_name);

        let mut sb = String::with_capacity(256);
        sb.push_str("update ");
        sb.push_str(&self.table_name);
        sb.push('\n');
        for (index, (column_name, parameter)) in column_parameter_map.iter().enumerate() {
            if index == 0 {
                sb.push_str("   set ");
            } else {
                sb.push_str("     , ");
            }
            sb.push_str(column_name);
            sb.push_str(" = ");
            sb.push_str(parameter);
            sb.push('\n');
        }

        if self.dialect.is_query_update_subquery_supported() && !table.has_compound_primary_key() {
            let select_clause = format!("select {LOCAL_ALIAS_NAME}.{primary_key_name}");
            let sub_query = SubQueryIndentProcessor::new()
                .process(&format!("{select_clause} {from_where_clause}"))?;
            sb.push_str(" where ");
            sb.push_str(&primary_key_name);
            sb.push_str(" in (\n");
            sb.push_str(&sub_query);
            sb.push_str("\n)");
            debug!(table = %self.table_name, "built query-update clause (sub-query)");
            return Ok(Some(sb));
        }

        self.assert_query_dml_fallback_available("queryUpdate()")?;
        let sub_query = SubQueryIndentProcessor::new().process(&from_where_clause)?;
        let sub_query = strip_local_alias(&sub_query);
        let Some(where_index) = sub_query.find("where ") else {
            // no conditions: the statement updates all rows
            return Ok(Some(sb));
        };
        sb.push(' ');
        sb.push_str(&sub_query[where_index..]);
        debug!(table = %self.table_name, "built query-update clause (direct)");
        Ok(Some(sb))
    }

    // ==================== Query Delete ====================

    /// Render a set-based delete narrowed by the registered conditions.
    pub fn get_clause_query_delete(&self) -> ClauseResult<String> {
        let schema = std::sync::Arc::clone(&self.schema);
        let table = schema.find_table(&self.table_name).ok_or_else(|| {
            ClauseError::precondition(format!("unknown table: {}", self.table_name))
        })?;
        let primary_key_name = table
            .primary_keys()
            .first()
            .map(|column| column.name.clone())
            .ok_or_else(|| {
                ClauseError::precondition(format!(
                    "queryDelete() needs a primary key: tableName={}",
                    self.table_name
                ))
            })?;
        let from_where_clause = self.build_query_dml_from_where(&primary_key_name);

        if self.dialect.is_query_update_subquery_supported() && !table.has_compound_primary_key() {
            let select_clause = format!("select {LOCAL_ALIAS_NAME}.{primary_key_name}");
            let sub_query = SubQueryIndentProcessor::new()
                .process(&format!("{select_clause} {from_where_clause}"))?;
            let mut sb = String::with_capacity(256);
            sb.push_str("delete from ");
            sb.push_str(&self.table_name);
            sb.push('\n');
            sb.push_str(" where ");
            sb.push_str(&primary_key_name);
            sb.push_str(" in (\n");
            sb.push_str(&sub_query);
            sb.push_str("\n)");
            debug!(table = %self.table_name, "built query-delete clause (sub-query)");
            return Ok(sb);
        }

        self.assert_query_dml_fallback_available("queryDelete()")?;
        let sub_query = SubQueryIndentProcessor::new().process(&from_where_clause)?;
        let sub_query = strip_local_alias(&sub_query);
        let from_index = sub_query.find("from ").ok_or_else(|| {
            ClauseError::precondition("the from-where clause should contain a from clause")
        })?;
        debug!(table = %self.table_name, "built query-delete clause (direct)");
        Ok(format!("delete {}", &sub_query[from_index..]))
    }

    // ==================== Assist Helper ====================

    /// From-where template with the union marks substituted for set-based DML:
    /// each union branch selects the primary key, condition marks vanish.
    fn build_query_dml_from_where(&self, primary_key_name: &str) -> String {
        let select_clause = format!("select {LOCAL_ALIAS_NAME}.{primary_key_name}");
        self.get_clause_from_where_with_union_template()
            .replace(UNION_SELECT_CLAUSE_MARK, &select_clause)
            .replace(UNION_WHERE_CLAUSE_MARK, "")
            .replace(UNION_WHERE_FIRST_CONDITION_MARK, "")
    }

    fn assert_query_dml_fallback_available(&self, operation: &str) -> ClauseResult<()> {
        if self.has_outer_join() {
            return Err(ClauseError::incompatibility(format!(
                "{operation} with outer join is unavailable because the database does not \
                 support the sub-query or the table has a compound primary key: tableName={}",
                self.table_name
            )));
        }
        if self.has_union_query() {
            return Err(ClauseError::incompatibility(format!(
                "{operation} with union is unavailable because the database does not \
                 support the sub-query or the table has a compound primary key: tableName={}",
                self.table_name
            )));
        }
        Ok(())
    }
}

/// Strip the base-point alias from a from-where fragment so it can follow a
/// plain `update`/`delete` statement. Purely textual, which is why the
/// fallback refuses outer joins and unions beforehand.
fn strip_local_alias(sql: &str) -> String {
    let mut stripped = sql
        .replace(&format!("{LOCAL_ALIAS_NAME}."), "")
        .replace(&format!(" {LOCAL_ALIAS_NAME} "), " ")
        .replace(&format!(" {LOCAL_ALIAS_NAME}\n"), "\n");
    if let Some(rest) = stripped.strip_suffix(&format!(" {LOCAL_ALIAS_NAME}")) {
        stripped = rest.to_string();
    }
    stripped
}
