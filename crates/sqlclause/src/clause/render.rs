//! Rendering of the accumulated state into SQL text.

use std::sync::Arc;

use tracing::debug;

use crate::error::{ClauseError, ClauseResult};
use crate::fragment::QueryClause;
use crate::indent::SubQueryIndentProcessor;

use super::{
    LOCAL_ALIAS_NAME, SCALAR_VIEW_ALIAS_NAME, SelectClauseType, SelectedColumn, SqlClause,
    UNION_SELECT_CLAUSE_MARK, UNION_VIEW_ALIAS_NAME, UNION_WHERE_CLAUSE_MARK,
    UNION_WHERE_FIRST_CONDITION_MARK, WHERE_CLAUSE_MARK, WHERE_FIRST_CONDITION_MARK,
};

impl SqlClause {
    // ==================== Complete Clause ====================

    /// Render the full select statement: select, from with joins, where,
    /// union branches, order-by and paging, enclosing views when the dialect
    /// or a scalar select under union requires one, then sub-query
    /// indentation.
    pub fn get_clause(&mut self) -> ClauseResult<String> {
        let select_clause = self.get_select_clause()?;
        let mut sb = String::with_capacity(512);
        sb.push_str(&select_clause);
        sb.push(' ');
        sb.push_str(&self.get_from_clause());
        sb.push_str(&self.dialect.from_hint());
        sb.push(' ');
        sb.push_str(&self.build_where_clause(false));
        let union_clause = self
            .build_union_clause(&select_clause)
            .replace(UNION_WHERE_CLAUSE_MARK, "")
            .replace(UNION_WHERE_FIRST_CONDITION_MARK, "");
        sb.push_str(&union_clause);

        let scalar_union = self.is_select_clause_type_count_or_scalar() && self.has_union_query();
        let union_normal_enclosing = !scalar_union
            && self.has_union_query()
            && self.dialect.is_union_normal_select_enclosing_required();
        let sql = if union_normal_enclosing {
            // order-by and paging must see the unified result
            let enclosed = enclose_as_view(&sb, UNION_VIEW_ALIAS_NAME);
            self.append_order_by_and_suffix(enclosed)?
        } else if scalar_union {
            let inner = self.append_order_by_and_suffix(sb)?;
            let scalar_select = self.build_select_clause_count_or_scalar(SCALAR_VIEW_ALIAS_NAME)?;
            enclose_as_scalar_view(&scalar_select, &inner)
        } else {
            self.append_order_by_and_suffix(sb)?
        };
        let sql = SubQueryIndentProcessor::new().process(&sql)?;
        debug!(
            dialect = self.dialect.name(),
            table = %self.table_name,
            "built select clause"
        );
        Ok(sql)
    }

    fn append_order_by_and_suffix(&self, mut sql: String) -> ClauseResult<String> {
        let order_by_clause = self.get_order_by_clause()?;
        if !order_by_clause.is_empty() {
            sql.push(' ');
            sql.push_str(&order_by_clause);
        }
        let mut sql = self.dialect.wrap_paging(sql, &self.paging);
        sql.push(' ');
        sql.push_str(&self.get_sql_suffix());
        Ok(sql)
    }

    // ==================== Fragment Clause ====================

    /// The from-where part with union marks, for union branch registration.
    pub fn get_clause_from_where_with_union_template(&self) -> String {
        self.build_clause_from_where_as_template(false)
    }

    /// Same as the union template but carrying where marks too, for
    /// statements that substitute their own conditions.
    pub fn get_clause_from_where_with_where_union_template(&self) -> String {
        self.build_clause_from_where_as_template(true)
    }

    fn build_clause_from_where_as_template(&self, template: bool) -> String {
        let mut sb = String::with_capacity(512);
        sb.push_str(&self.get_from_clause());
        sb.push_str(&self.dialect.from_hint());
        sb.push(' ');
        sb.push_str(&self.build_where_clause(template));
        sb.push_str(&self.build_union_clause(UNION_SELECT_CLAUSE_MARK));
        sb
    }

    pub(crate) fn build_union_clause(&self, select_clause: &str) -> String {
        let mut sb = String::new();
        for union_query in &self.union_queries {
            sb.push('\n');
            sb.push_str(if union_query.union_all {
                " union all "
            } else {
                " union "
            });
            sb.push('\n');
            sb.push_str(select_clause);
            sb.push(' ');
            sb.push_str(&union_query.union_query_clause);
        }
        sb
    }

    // ==================== Select Clause ====================

    /// Render the select clause, also populating the select-index map and the
    /// real-column-to-alias map that union order-by resolves through.
    pub fn get_select_clause(&mut self) -> ClauseResult<String> {
        if self.is_select_clause_type_count_or_scalar() && !self.has_union_query() {
            return self.build_select_clause_count_or_scalar(LOCAL_ALIAS_NAME);
        }
        let schema = Arc::clone(&self.schema);
        let table = schema.find_table(&self.table_name).ok_or_else(|| {
            ClauseError::precondition(format!("unknown table: {}", self.table_name))
        })?;
        let scalar_union = self.is_select_clause_type_count_or_scalar();
        // select index aliases would hide the real names the enclosing
        // scalar select refers to
        let indexing = self.use_select_index && !scalar_union;
        let local_specified = self.specified_columns_of(LOCAL_ALIAS_NAME).cloned();
        let selected: Vec<(Vec<SelectedColumn>, Option<Vec<String>>)> = self
            .selected_select_columns
            .iter()
            .map(|(alias_name, columns)| {
                (columns.clone(), self.specified_columns_of(alias_name).cloned())
            })
            .collect();
        let derived = self.specified_derived_subqueries.clone();

        self.select_index_map.clear();
        self.real_column_alias_map.clear();
        let mut sb = String::new();
        let mut select_index = 0;

        for column in &table.columns {
            if let Some(specified) = &local_specified
                && !specified.iter().any(|name| name == &column.name)
            {
                if scalar_union {
                    // with union the primary keys stay selected to keep rows
                    // unique; a table without primary keys keeps all columns
                    if table.has_primary_key() && !column.primary {
                        continue;
                    }
                } else {
                    continue;
                }
            }
            if sb.is_empty() {
                sb.push_str("select");
                sb.push_str(&self.dialect.select_hint(&self.paging));
                sb.push(' ');
            } else {
                sb.push_str(", ");
            }
            let real_column_name = format!("{LOCAL_ALIAS_NAME}.{}", column.name);
            select_index += 1;
            let on_query_name = if indexing {
                self.select_index_map.insert(column.name.clone(), select_index);
                format!("c{select_index}")
            } else {
                column.name.clone()
            };
            sb.push_str(&real_column_name);
            sb.push_str(" as ");
            sb.push_str(&on_query_name);
            self.real_column_alias_map.insert(real_column_name, on_query_name);
        }

        for (columns, foreign_specified) in &selected {
            let mut finished_foreign_indent = false;
            for column in columns {
                if let Some(specified) = foreign_specified
                    && !specified.iter().any(|name| name == &column.column_name)
                {
                    continue;
                }
                let real_column_name = column.real_column_name();
                select_index += 1;
                let on_query_name = if indexing {
                    self.select_index_map
                        .insert(column.column_alias_name.clone(), select_index);
                    format!("c{select_index}")
                } else {
                    column.column_alias_name.clone()
                };
                if !finished_foreign_indent {
                    sb.push_str("\n     ");
                    finished_foreign_indent = true;
                }
                sb.push_str(", ");
                sb.push_str(&real_column_name);
                sb.push_str(" as ");
                sb.push_str(&on_query_name);
                self.real_column_alias_map.insert(real_column_name, on_query_name);
            }
        }

        for (alias_name, derived_expression) in &derived {
            sb.push_str("\n     , ");
            sb.push_str(derived_expression);
            sb.push_str(" as ");
            sb.push_str(alias_name);
            self.real_column_alias_map
                .insert(alias_name.clone(), alias_name.clone());
        }

        Ok(sb)
    }

    pub(crate) fn build_select_clause_count_or_scalar(
        &self,
        alias_name: &str,
    ) -> ClauseResult<String> {
        let function = match self.select_clause_type {
            SelectClauseType::UniqueCount | SelectClauseType::PlainCount => {
                return Ok("select count(*)".to_string());
            }
            SelectClauseType::Max => "max",
            SelectClauseType::Min => "min",
            SelectClauseType::Sum => "sum",
            SelectClauseType::Avg => "avg",
            SelectClauseType::Columns => {
                return Err(ClauseError::precondition(
                    "the select clause type is not for count or scalar",
                ));
            }
        };
        if let Some(column_name) = self.specified_column_name_as_one() {
            return Ok(format!("select {function}({alias_name}.{column_name})"));
        }
        if let [(derived_alias, derived_expression)] =
            self.specified_derived_subqueries.as_slice()
        {
            let target = if alias_name == LOCAL_ALIAS_NAME {
                derived_expression.clone()
            } else {
                format!("{alias_name}.{derived_alias}")
            };
            return Ok(format!("select {function}({target})"));
        }
        Err(ClauseError::precondition(
            "a scalar select needs exactly one specified column or derived sub-query",
        ))
    }

    // ==================== From Clause ====================

    pub fn get_from_clause(&self) -> String {
        let mut sb = String::new();
        sb.push_str("\n  from ");
        if self.base_table_inline_where_list.is_empty() {
            sb.push_str(&self.table_name);
        } else {
            sb.push_str(&self.inline_view_clause(&self.table_name, &self.base_table_inline_where_list));
        }
        sb.push(' ');
        sb.push_str(LOCAL_ALIAS_NAME);
        sb.push_str(&self.get_from_base_table_hint());
        sb.push_str(&self.left_outer_join_clause());
        sb
    }

    fn get_from_base_table_hint(&self) -> String {
        let mut hint = self.dialect.from_base_table_hint();
        if let Some(crate::dialect::LockHint::FromBaseTable(lock)) = &self.lock_hint {
            hint.push_str(lock);
        }
        hint
    }

    fn left_outer_join_clause(&self) -> String {
        let mut sb = String::new();
        for join_info in &self.outer_joins {
            sb.push_str("\n   ");
            sb.push_str(if join_info.inner_join {
                " inner join "
            } else {
                " left outer join "
            });
            if join_info.inline_where_list.is_empty() {
                sb.push_str(&join_info.table_name);
            } else {
                sb.push_str(
                    &self.inline_view_clause(&join_info.table_name, &join_info.inline_where_list),
                );
            }
            sb.push(' ');
            sb.push_str(&join_info.alias_name);
            sb.push_str(" on ");
            for (index, (local_column, foreign_column)) in join_info.join_on.iter().enumerate() {
                if index > 0 {
                    sb.push_str(" and ");
                }
                sb.push_str(local_column);
                sb.push_str(" = ");
                sb.push_str(foreign_column);
            }
            if let Some(fixed_condition) = &join_info.fixed_condition {
                sb.push_str(" and ");
                sb.push_str(fixed_condition);
            }
            for additional in &join_info.additional_on_clause_list {
                sb.push_str(" and ");
                sb.push_str(&self.filter_where_clause_simply(additional.render()));
            }
        }
        sb
    }

    fn inline_view_clause(&self, table_name: &str, where_list: &[QueryClause]) -> String {
        let mut sb = String::new();
        sb.push_str("(select * from ");
        sb.push_str(table_name);
        sb.push_str(" where ");
        for (index, clause) in where_list.iter().enumerate() {
            if index > 0 {
                sb.push_str(" and ");
            }
            sb.push_str(&self.filter_where_clause_simply(clause.render()));
        }
        sb.push(')');
        sb
    }

    // ==================== Where Clause ====================

    pub fn get_where_clause(&self) -> String {
        self.build_where_clause(false)
    }

    pub(crate) fn build_where_clause(&self, template: bool) -> String {
        let mut sb = String::new();
        for (index, clause) in self.where_list.iter().enumerate() {
            let clause = self.filter_where_clause_simply(clause.render());
            if index == 0 {
                sb.push_str("\n where ");
                if template {
                    sb.push_str(WHERE_FIRST_CONDITION_MARK);
                }
            } else {
                sb.push_str("\n   and ");
            }
            sb.push_str(&clause);
        }
        if template && sb.is_empty() {
            sb.push_str(WHERE_CLAUSE_MARK);
        }
        sb
    }

    // ==================== Order-By Clause ====================

    pub fn get_order_by_clause(&self) -> ClauseResult<String> {
        if !self.order_by_effective || self.order_by_clause.is_empty() {
            return Ok(String::new());
        }
        let order_by_clause = if self.has_union_query() {
            if self.real_column_alias_map.is_empty() {
                return Err(ClauseError::incompatibility(
                    "the real-column-to-alias map should not be empty when union query exists",
                ));
            }
            self.order_by_clause
                .render(Some(&self.real_column_alias_map), self.dialect.as_ref())?
        } else {
            self.order_by_clause.render(None, self.dialect.as_ref())?
        };
        if order_by_clause.trim().is_empty() {
            Ok(String::new())
        } else {
            Ok(format!("\n {order_by_clause}"))
        }
    }

    // ==================== Sql Suffix ====================

    pub fn get_sql_suffix(&self) -> String {
        let mut suffix = self.dialect.paging_suffix(&self.paging);
        if let Some(crate::dialect::LockHint::Suffix(lock)) = &self.lock_hint {
            suffix.push_str(lock);
        }
        if suffix.trim().is_empty() {
            String::new()
        } else {
            format!("\n{suffix}")
        }
    }
}

// ==================== Enclosing ====================

fn enclose_as_view(sql: &str, alias_name: &str) -> String {
    let begin_mark = SubQueryIndentProcessor::resolve_begin_mark(alias_name);
    let end_mark = SubQueryIndentProcessor::resolve_end_mark(alias_name);
    format!("select * from ({begin_mark}\n{sql}\n) {alias_name}{end_mark}")
}

fn enclose_as_scalar_view(select_clause: &str, sql: &str) -> String {
    let begin_mark = SubQueryIndentProcessor::resolve_begin_mark(SCALAR_VIEW_ALIAS_NAME);
    let end_mark = SubQueryIndentProcessor::resolve_end_mark(SCALAR_VIEW_ALIAS_NAME);
    format!(
        "{select_clause}\n  from ({begin_mark}\n{sql}\n       ) {SCALAR_VIEW_ALIAS_NAME}{end_mark}"
    )
}
