//! The clause assembler.
//!
//! [`SqlClause`] accumulates select, join, where, union, order-by and paging
//! registrations for one base-point table and renders them into SQL text.
//! Values never pass through here; conditions arrive as query expressions with
//! bind markers already embedded.

pub mod join;
mod or_scope;

mod dml;
mod render;


use std::collections::HashMap;
use std::sync::Arc;

use crate::dialect::{Dialect, LockHint};
use crate::error::{ClauseError, ClauseResult};
use crate::fragment::{QueryClause, WhereClauseFilter};
use crate::orderby::{OrderByClause, OrderByElement, OrderValue};
use crate::paging::PagingState;
use crate::schema::Schema;

use join::{FixedConditionResolver, JoinInfo, VariableFixedConditionResolver};
use or_scope::OrScopeState;

// ==================== Alias Names ====================

/// Alias of the base-point table.
pub const LOCAL_ALIAS_NAME: &str = "dfloc";
/// Prefix of relation aliases, completed by the relation path.
pub const FOREIGN_ALIAS_PREFIX: &str = "dfrel";
/// Alias of the enclosing view around a union select.
pub const UNION_VIEW_ALIAS_NAME: &str = "dfunionview";
/// Alias of the enclosing view around a count or scalar select with union.
pub const SCALAR_VIEW_ALIAS_NAME: &str = "dfmain";
/// Alias of the resource view of a query-insert.
pub const RESOURCE_VIEW_ALIAS_NAME: &str = "dfres";

// ==================== Template Marks ====================

pub const WHERE_CLAUSE_MARK: &str = "#df:whereClause#";
pub const WHERE_FIRST_CONDITION_MARK: &str = "#df:whereFirstCondition#";
pub const UNION_SELECT_CLAUSE_MARK: &str = "#df:unionSelectClause#";
pub const UNION_WHERE_CLAUSE_MARK: &str = "#df:unionWhereClause#";
pub const UNION_WHERE_FIRST_CONDITION_MARK: &str = "#df:unionWhereFirstCondition#";

// ==================== Select Clause Type ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectClauseType {
    #[default]
    Columns,
    UniqueCount,
    PlainCount,
    Max,
    Min,
    Sum,
    Avg,
}

impl SelectClauseType {
    pub fn is_count(&self) -> bool {
        matches!(self, Self::UniqueCount | Self::PlainCount)
    }

    pub fn is_count_or_scalar(&self) -> bool {
        !matches!(self, Self::Columns)
    }
}

/// One selected column of a joined table.
#[derive(Debug, Clone)]
pub struct SelectedColumn {
    pub(crate) table_alias_name: String,
    pub(crate) column_name: String,
    pub(crate) column_alias_name: String,
}

impl SelectedColumn {
    pub(crate) fn real_column_name(&self) -> String {
        format!("{}.{}", self.table_alias_name, self.column_name)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct UnionQueryInfo {
    pub(crate) union_query_clause: String,
    pub(crate) union_all: bool,
}

// ==================== SqlClause ====================

/// Stateful clause assembler for one base-point table.
pub struct SqlClause {
    table_name: String,
    schema: Arc<Schema>,
    dialect: Box<dyn Dialect>,
    // select
    selected_select_columns: Vec<(String, Vec<SelectedColumn>)>,
    selected_foreign_info: HashMap<String, String>,
    specified_select_columns: Option<HashMap<String, Vec<String>>>,
    backup_specified_select_columns: Option<HashMap<String, Vec<String>>>,
    specified_derived_subqueries: Vec<(String, String)>,
    select_clause_type: SelectClauseType,
    previous_select_clause_type: Option<SelectClauseType>,
    use_select_index: bool,
    select_index_map: HashMap<String, usize>,
    real_column_alias_map: HashMap<String, String>,
    // from
    outer_joins: Vec<JoinInfo>,
    inner_join_effective: bool,
    // where
    where_list: Vec<QueryClause>,
    base_table_inline_where_list: Vec<QueryClause>,
    where_clause_filters: Vec<Box<dyn WhereClauseFilter>>,
    // order by
    order_by_clause: OrderByClause,
    order_by_effective: bool,
    // union
    union_queries: Vec<UnionQueryInfo>,
    // paging and lock
    paging: PagingState,
    lock_hint: Option<LockHint>,
    // or-scope
    or_scope: OrScopeState,
}

impl SqlClause {
    pub fn new(
        table_name: impl Into<String>,
        dialect: impl Dialect + 'static,
        schema: Arc<Schema>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            schema,
            dialect: Box::new(dialect),
            selected_select_columns: Vec::new(),
            selected_foreign_info: HashMap::new(),
            specified_select_columns: None,
            backup_specified_select_columns: None,
            specified_derived_subqueries: Vec::new(),
            select_clause_type: SelectClauseType::default(),
            previous_select_clause_type: None,
            use_select_index: true,
            select_index_map: HashMap::new(),
            real_column_alias_map: HashMap::new(),
            outer_joins: Vec::new(),
            inner_join_effective: false,
            where_list: Vec::new(),
            base_table_inline_where_list: Vec::new(),
            where_clause_filters: Vec::new(),
            order_by_clause: OrderByClause::new(),
            order_by_effective: false,
            union_queries: Vec::new(),
            paging: PagingState::new(),
            lock_hint: None,
            or_scope: OrScopeState::default(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn local_alias_name(&self) -> &'static str {
        LOCAL_ALIAS_NAME
    }

    /// Alias of a joined table, derived from its relation path (e.g. `_1_3`).
    pub fn resolve_join_alias_name(relation_path: &str) -> String {
        format!("{FOREIGN_ALIAS_PREFIX}{relation_path}")
    }

    pub fn resolve_relation_no(
        &self,
        local_table_name: &str,
        foreign_property_name: &str,
    ) -> ClauseResult<usize> {
        let table = self.schema.find_table(local_table_name).ok_or_else(|| {
            ClauseError::precondition(format!("unknown table: {local_table_name}"))
        })?;
        let relation = table.find_relation(foreign_property_name).ok_or_else(|| {
            ClauseError::precondition(format!(
                "unknown relation '{foreign_property_name}' on table '{local_table_name}'"
            ))
        })?;
        Ok(relation.relation_no)
    }

    // ==================== Selected Select Column ====================

    /// Register all columns of a joined table for the select clause. Columns
    /// are aliased with the relation path so names stay unique per relation.
    /// Re-registering an alias replaces its column set.
    pub fn register_selected_select_column(
        &mut self,
        foreign_table_alias_name: &str,
        local_table_name: &str,
        foreign_property_name: &str,
        local_relation_path: Option<&str>,
    ) -> ClauseResult<()> {
        let local_table = self.schema.find_table(local_table_name).ok_or_else(|| {
            ClauseError::precondition(format!("unknown table: {local_table_name}"))
        })?;
        let relation = local_table
            .find_relation(foreign_property_name)
            .ok_or_else(|| {
                ClauseError::precondition(format!(
                    "unknown relation '{foreign_property_name}' on table '{local_table_name}'"
                ))
            })?;
        let foreign_table = self
            .schema
            .find_table(&relation.foreign_table)
            .ok_or_else(|| {
                ClauseError::precondition(format!("unknown table: {}", relation.foreign_table))
            })?;
        let mut relation_path = format!("_{}", relation.relation_no);
        if let Some(local_path) = local_relation_path {
            relation_path = format!("{local_path}{relation_path}");
        }
        let columns: Vec<SelectedColumn> = foreign_table
            .columns
            .iter()
            .map(|column| SelectedColumn {
                table_alias_name: foreign_table_alias_name.to_string(),
                column_name: column.name.clone(),
                column_alias_name: format!("{}{relation_path}", column.name),
            })
            .collect();
        if let Some(entry) = self
            .selected_select_columns
            .iter_mut()
            .find(|(alias, _)| alias == foreign_table_alias_name)
        {
            entry.1 = columns;
        } else {
            self.selected_select_columns
                .push((foreign_table_alias_name.to_string(), columns));
        }
        Ok(())
    }

    pub fn register_selected_foreign_info(
        &mut self,
        relation_path: &str,
        foreign_property_name: &str,
    ) {
        self.selected_foreign_info
            .insert(relation_path.to_string(), foreign_property_name.to_string());
    }

    pub fn has_selected_foreign_info(&self, relation_path: &str) -> bool {
        self.selected_foreign_info.contains_key(relation_path)
    }

    pub fn is_selected_foreign_info_empty(&self) -> bool {
        self.selected_foreign_info.is_empty()
    }

    // ==================== Outer Join ====================

    pub fn register_outer_join(
        &mut self,
        join_table_name: &str,
        alias_name: &str,
        join_on: Vec<(String, String)>,
    ) -> ClauseResult<()> {
        self.do_register_outer_join(join_table_name, alias_name, join_on, None, None)
    }

    /// Register a join carrying a fixed condition. Alias variables in the
    /// condition are resolved before storing, by `resolver` when given.
    pub fn register_outer_join_fixed(
        &mut self,
        join_table_name: &str,
        alias_name: &str,
        join_on: Vec<(String, String)>,
        fixed_condition: &str,
        resolver: Option<&dyn FixedConditionResolver>,
    ) -> ClauseResult<()> {
        self.do_register_outer_join(
            join_table_name,
            alias_name,
            join_on,
            Some(fixed_condition),
            resolver,
        )
    }

    fn do_register_outer_join(
        &mut self,
        join_table_name: &str,
        alias_name: &str,
        join_on: Vec<(String, String)>,
        fixed_condition: Option<&str>,
        resolver: Option<&dyn FixedConditionResolver>,
    ) -> ClauseResult<()> {
        if self.find_join(alias_name).is_some() {
            return Err(ClauseError::precondition(format!(
                "the alias name is already registered in outer join: {alias_name}"
            )));
        }
        if join_on.is_empty() {
            return Err(ClauseError::precondition(format!(
                "the join-on map should not be empty: aliasName={alias_name}"
            )));
        }
        let mut join_info = JoinInfo::new(join_table_name, alias_name, join_on);
        if let Some(condition) = fixed_condition {
            let default_resolver = VariableFixedConditionResolver;
            let resolver = resolver.unwrap_or(&default_resolver);
            join_info.fixed_condition =
                Some(resolver.resolve(condition, LOCAL_ALIAS_NAME, alias_name));
        }
        if self.inner_join_effective {
            join_info.inner_join = true;
        }
        self.outer_joins.push(join_info);
        Ok(())
    }

    pub fn change_to_inner_join(&mut self, alias_name: &str) -> ClauseResult<()> {
        self.find_join_mut(alias_name)?.inner_join = true;
        Ok(())
    }

    pub fn make_inner_join_effective(&mut self) {
        self.inner_join_effective = true;
    }

    pub fn back_to_outer_join(&mut self) {
        self.inner_join_effective = false;
    }

    pub fn has_outer_join(&self) -> bool {
        !self.outer_joins.is_empty()
    }

    pub fn outer_joins(&self) -> &[JoinInfo] {
        &self.outer_joins
    }

    fn find_join(&self, alias_name: &str) -> Option<&JoinInfo> {
        self.outer_joins
            .iter()
            .find(|join| join.alias_name == alias_name)
    }

    fn find_join_mut(&mut self, alias_name: &str) -> ClauseResult<&mut JoinInfo> {
        self.outer_joins
            .iter_mut()
            .find(|join| join.alias_name == alias_name)
            .ok_or_else(|| {
                ClauseError::precondition(format!(
                    "the alias name is not registered in outer join yet: {alias_name}"
                ))
            })
    }

    // ==================== Where ====================

    /// Register a top-level condition as `column operator value`, where the
    /// value is a ready-made query expression.
    pub fn register_where_clause(
        &mut self,
        column_full_name: &str,
        operator: &str,
        value_expression: &str,
    ) -> ClauseResult<()> {
        if column_full_name.trim().is_empty() {
            return Err(ClauseError::precondition(
                "the column for a where clause should not be empty",
            ));
        }
        self.add_where_clause(QueryClause::compare(
            column_full_name,
            operator,
            value_expression,
        ));
        Ok(())
    }

    /// Register a free-form top-level condition.
    pub fn register_where_clause_text(&mut self, clause: &str) -> ClauseResult<()> {
        if clause.trim().is_empty() {
            return Err(ClauseError::precondition(
                "a where clause should not be empty",
            ));
        }
        self.add_where_clause(QueryClause::raw(clause));
        Ok(())
    }

    fn add_where_clause(&mut self, clause: QueryClause) {
        if self.or_scope.is_active() {
            self.or_scope.push_where(clause);
        } else {
            self.where_list.push(clause);
        }
    }

    pub fn exchange_first_where_clause_for_last_one(&mut self) {
        let len = self.where_list.len();
        if len > 1 {
            self.where_list.swap(0, len - 1);
        }
    }

    pub fn has_where_clause(&self) -> bool {
        !self.where_list.is_empty()
    }

    // ==================== Inline Where ====================

    /// Condition inside the base-table inline view. Columns are unqualified
    /// because the view selects from the plain table.
    pub fn register_base_table_inline_where_clause(
        &mut self,
        column_name: &str,
        operator: &str,
        value_expression: &str,
    ) -> ClauseResult<()> {
        if column_name.trim().is_empty() {
            return Err(ClauseError::precondition(
                "the column for an inline where clause should not be empty",
            ));
        }
        self.add_base_table_inline_where_clause(QueryClause::compare(
            column_name,
            operator,
            value_expression,
        ));
        Ok(())
    }

    pub fn register_base_table_inline_where_clause_text(
        &mut self,
        clause: &str,
    ) -> ClauseResult<()> {
        if clause.trim().is_empty() {
            return Err(ClauseError::precondition(
                "an inline where clause should not be empty",
            ));
        }
        self.add_base_table_inline_where_clause(QueryClause::raw(clause));
        Ok(())
    }

    fn add_base_table_inline_where_clause(&mut self, clause: QueryClause) {
        if self.or_scope.is_active() {
            self.or_scope.push_base_inline(clause);
        } else {
            self.base_table_inline_where_list.push(clause);
        }
    }

    /// Condition on a joined table, either inside its inline view or appended
    /// to the on clause. On-clause conditions are alias-qualified, inline-view
    /// conditions are not.
    pub fn register_outer_join_inline_where_clause(
        &mut self,
        alias_name: &str,
        column_name: &str,
        operator: &str,
        value_expression: &str,
        on_clause_inline: bool,
    ) -> ClauseResult<()> {
        if column_name.trim().is_empty() {
            return Err(ClauseError::precondition(
                "the column for a join inline where clause should not be empty",
            ));
        }
        let clause = if on_clause_inline {
            QueryClause::compare(
                format!("{alias_name}.{column_name}"),
                operator,
                value_expression,
            )
        } else {
            QueryClause::compare(column_name, operator, value_expression)
        };
        self.add_outer_join_inline_where_clause(alias_name, clause, on_clause_inline)
    }

    pub fn register_outer_join_inline_where_clause_text(
        &mut self,
        alias_name: &str,
        clause: &str,
        on_clause_inline: bool,
    ) -> ClauseResult<()> {
        if clause.trim().is_empty() {
            return Err(ClauseError::precondition(
                "a join inline where clause should not be empty",
            ));
        }
        self.add_outer_join_inline_where_clause(
            alias_name,
            QueryClause::raw(clause),
            on_clause_inline,
        )
    }

    fn add_outer_join_inline_where_clause(
        &mut self,
        alias_name: &str,
        clause: QueryClause,
        on_clause_inline: bool,
    ) -> ClauseResult<()> {
        // the join must exist even when the condition is routed to an or-scope
        self.find_join_mut(alias_name)?;
        if self.or_scope.is_active() {
            if on_clause_inline {
                self.or_scope.push_join_on(alias_name, clause);
            } else {
                self.or_scope.push_join_inline(alias_name, clause);
            }
            return Ok(());
        }
        let join_info = self.find_join_mut(alias_name)?;
        if on_clause_inline {
            join_info.additional_on_clause_list.push(clause);
        } else {
            join_info.inline_where_list.push(clause);
        }
        Ok(())
    }

    pub fn add_where_clause_filter(&mut self, filter: Box<dyn WhereClauseFilter>) {
        self.where_clause_filters.push(filter);
    }

    pub(crate) fn filter_where_clause_simply(&self, clause: String) -> String {
        self.where_clause_filters
            .iter()
            .fold(clause, |clause, filter| filter.filter(&clause))
    }

    // ==================== Or-Scope ====================

    pub fn begin_or_scope_query(&mut self) {
        self.or_scope.begin();
    }

    /// Close the current or-scope frame; closing the outermost frame reflects
    /// the collected conditions into their target lists.
    pub fn end_or_scope_query(&mut self) -> ClauseResult<()> {
        let Some(reflection) = self.or_scope.end()? else {
            return Ok(());
        };
        if let Some(clause) = reflection.where_clause {
            self.where_list.push(clause);
        }
        if let Some(clause) = reflection.base_inline {
            self.base_table_inline_where_list.push(clause);
        }
        for (alias_name, clause) in reflection.join_inline {
            self.find_join_mut(&alias_name)?.inline_where_list.push(clause);
        }
        for (alias_name, clause) in reflection.join_on {
            self.find_join_mut(&alias_name)?
                .additional_on_clause_list
                .push(clause);
        }
        Ok(())
    }

    pub fn begin_or_scope_query_and_part(&mut self) -> ClauseResult<()> {
        self.or_scope.begin_and_part()
    }

    pub fn end_or_scope_query_and_part(&mut self) -> ClauseResult<()> {
        self.or_scope.end_and_part()
    }

    pub fn is_or_scope_query_effective(&self) -> bool {
        self.or_scope.is_active()
    }

    pub fn is_or_scope_query_and_part_effective(&self) -> bool {
        self.or_scope.is_and_part_active()
    }

    // ==================== Order By ====================

    /// Register ordering columns. `order_by_property` is a slash-separated
    /// list of `[alias.]column` names sharing one direction.
    pub fn register_order_by(&mut self, order_by_property: &str, asc: bool) -> ClauseResult<()> {
        if order_by_property.trim().is_empty() {
            return Err(ClauseError::precondition(
                "the order-by property should not be empty",
            ));
        }
        self.order_by_effective = true;
        for token in order_by_property.split('/') {
            let (alias_name, column_name) = match token.rsplit_once('.') {
                Some((alias, column)) => (Some(alias.to_string()), column),
                None => (None, token),
            };
            self.order_by_clause
                .add_element(OrderByElement::new(alias_name, column_name, asc));
        }
        Ok(())
    }

    /// Reverse the whole ordering when the same columns are already
    /// registered, otherwise replace the ordering.
    pub fn reverse_order_by_or_override_order_by(
        &mut self,
        order_by_property: &str,
        asc: bool,
    ) -> ClauseResult<()> {
        self.order_by_effective = true;
        if self.order_by_clause.is_same_order_by_column(order_by_property) {
            self.order_by_clause.reverse_all();
            Ok(())
        } else {
            self.clear_order_by();
            self.register_order_by(order_by_property, asc)
        }
    }

    pub fn add_nulls_first_to_previous_order_by(&mut self) {
        self.order_by_clause.add_nulls_first_to_previous();
    }

    pub fn add_nulls_last_to_previous_order_by(&mut self) {
        self.order_by_clause.add_nulls_last_to_previous();
    }

    /// Manual (case-when) ordering for the previous element. Unavailable with
    /// union because the case expression cannot go through the alias map.
    pub fn add_manual_order_to_previous_order_by(
        &mut self,
        values: Vec<OrderValue>,
    ) -> ClauseResult<()> {
        if self.has_union_query() {
            return Err(ClauseError::incompatibility(
                "manual order with union is unavailable",
            ));
        }
        self.order_by_clause.add_manual_order_to_previous(values);
        Ok(())
    }

    pub fn clear_order_by(&mut self) {
        self.order_by_effective = false;
        self.order_by_clause.clear();
    }

    pub fn make_order_by_effective(&mut self) {
        if !self.order_by_clause.is_empty() {
            self.order_by_effective = true;
        }
    }

    pub fn ignore_order_by(&mut self) {
        self.order_by_effective = false;
    }

    pub fn has_order_by_clause(&self) -> bool {
        !self.order_by_clause.is_empty()
    }

    pub fn order_by_clause(&self) -> &OrderByClause {
        &self.order_by_clause
    }

    // ==================== Union Query ====================

    /// Register a union branch built by another assembler's from-where
    /// template. Plain where marks are converted to the union-scoped marks so
    /// later rendering can substitute or discard them per statement kind.
    pub fn register_union_query(
        &mut self,
        union_query_clause: &str,
        union_all: bool,
    ) -> ClauseResult<()> {
        if union_query_clause.trim().is_empty() {
            return Err(ClauseError::precondition(
                "the union query clause should not be empty",
            ));
        }
        let union_query_clause = union_query_clause
            .replace(WHERE_CLAUSE_MARK, UNION_WHERE_CLAUSE_MARK)
            .replace(WHERE_FIRST_CONDITION_MARK, UNION_WHERE_FIRST_CONDITION_MARK);
        self.union_queries.push(UnionQueryInfo {
            union_query_clause,
            union_all,
        });
        Ok(())
    }

    pub fn has_union_query(&self) -> bool {
        !self.union_queries.is_empty()
    }

    // ==================== Fetch Scope ====================

    pub fn fetch_first(&mut self, fetch_size: usize) -> ClauseResult<()> {
        self.paging.fetch_first(fetch_size)
    }

    pub fn fetch_scope(&mut self, fetch_start_index: usize, fetch_size: usize) -> ClauseResult<()> {
        self.paging.fetch_scope(fetch_start_index, fetch_size)
    }

    pub fn fetch_page(&mut self, fetch_page_number: usize) -> ClauseResult<()> {
        self.paging.fetch_page(fetch_page_number)
    }

    pub fn ignore_fetch_scope(&mut self) {
        self.paging.ignore_fetch_scope();
    }

    pub fn make_fetch_scope_effective(&mut self) {
        self.paging.make_fetch_scope_effective();
    }

    pub fn paging(&self) -> &PagingState {
        &self.paging
    }

    // ==================== Lock ====================

    pub fn lock_for_update(&mut self) -> ClauseResult<()> {
        self.lock_hint = Some(self.dialect.lock_for_update()?);
        Ok(())
    }

    // ==================== Specification ====================

    pub fn specify_select_column(&mut self, table_alias_name: &str, column_name: &str) {
        let map = self.specified_select_columns.get_or_insert_with(HashMap::new);
        let columns = map.entry(table_alias_name.to_string()).or_default();
        if !columns.iter().any(|column| column == column_name) {
            columns.push(column_name.to_string());
        }
    }

    /// Register a derived sub-query column expression, selected as
    /// `expression as alias`. Re-registering an alias replaces the expression.
    pub fn specify_derived_sub_query(&mut self, alias_name: &str, derived_expression: &str) {
        if let Some(entry) = self
            .specified_derived_subqueries
            .iter_mut()
            .find(|(alias, _)| alias == alias_name)
        {
            entry.1 = derived_expression.to_string();
        } else {
            self.specified_derived_subqueries
                .push((alias_name.to_string(), derived_expression.to_string()));
        }
    }

    pub fn has_specified_derived_sub_query(&self, alias_name: &str) -> bool {
        self.specified_derived_subqueries
            .iter()
            .any(|(alias, _)| alias == alias_name)
    }

    /// The single specified column name, when exactly one column on exactly
    /// one alias is specified.
    pub fn specified_column_name_as_one(&self) -> Option<&str> {
        let map = self.specified_select_columns.as_ref()?;
        if map.len() != 1 {
            return None;
        }
        let columns = map.values().next()?;
        if columns.len() == 1 {
            columns.first().map(String::as_str)
        } else {
            None
        }
    }

    pub fn specified_column_real_name_as_one(&self) -> Option<String> {
        let map = self.specified_select_columns.as_ref()?;
        if map.len() != 1 {
            return None;
        }
        let (alias_name, columns) = map.iter().next()?;
        if columns.len() == 1 {
            Some(format!("{alias_name}.{}", columns[0]))
        } else {
            None
        }
    }

    pub fn remove_specified_column_real_name_as_one(&mut self) -> Option<String> {
        let real_name = self.specified_column_real_name_as_one()?;
        if let Some(map) = self.specified_select_columns.as_mut()
            && let Some(columns) = map.values_mut().next()
        {
            columns.clear();
        }
        Some(real_name)
    }

    pub fn backup_specified_select_column(&mut self) {
        self.backup_specified_select_columns = self.specified_select_columns.clone();
    }

    pub fn restore_specified_select_column(&mut self) {
        self.specified_select_columns = self.backup_specified_select_columns.take();
    }

    pub fn clear_specified_select_column(&mut self) {
        self.specified_select_columns = None;
    }

    pub(crate) fn specified_columns_of(&self, table_alias_name: &str) -> Option<&Vec<String>> {
        self.specified_select_columns
            .as_ref()
            .and_then(|map| map.get(table_alias_name))
            .filter(|columns| !columns.is_empty())
    }

    // ==================== Select Clause Type ====================

    /// Switch the select clause type, remembering the previous one so a
    /// single-step rollback can undo the change.
    pub fn classify_select_clause_type(&mut self, select_clause_type: SelectClauseType) {
        self.previous_select_clause_type = Some(self.select_clause_type);
        self.select_clause_type = select_clause_type;
    }

    pub fn rollback_select_clause_type(&mut self) {
        self.select_clause_type = self
            .previous_select_clause_type
            .take()
            .unwrap_or_default();
    }

    pub fn select_clause_type(&self) -> SelectClauseType {
        self.select_clause_type
    }

    pub(crate) fn is_select_clause_type_count_or_scalar(&self) -> bool {
        self.select_clause_type.is_count_or_scalar()
    }

    // ==================== Select Index ====================

    pub fn disable_select_index(&mut self) {
        self.use_select_index = false;
    }

    /// Column alias name to select index, populated by select-clause
    /// rendering.
    pub fn select_index_map(&self) -> &HashMap<String, usize> {
        &self.select_index_map
    }

    pub fn select_index_reverse_map(&self) -> HashMap<String, String> {
        self.select_index_map
            .iter()
            .map(|(column, index)| (format!("c{index}"), column.clone()))
            .collect()
    }
}
