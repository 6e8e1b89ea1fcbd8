//! Database dialects.
//!
//! All dialect-specific rendering goes through the [`Dialect`] trait: hint slots
//! around the select and from clauses, the paging strategy (suffix or whole-SQL
//! wrap), row locking, nulls ordering and a few capability switches. The
//! assembler itself stays dialect-free.

use crate::error::{ClauseError, ClauseResult};
use crate::paging::PagingState;
use crate::schema::TableMeta;

/// Where a row-lock hint lands in the rendered statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockHint {
    /// Appended after the whole statement, e.g. ` for update`.
    Suffix(String),
    /// Appended right after the base-table alias, e.g. ` with (updlock)`.
    FromBaseTable(String),
}

pub trait Dialect {
    fn name(&self) -> &'static str;

    /// Hint between `select` and the column list, e.g. ` top 20`.
    fn select_hint(&self, _paging: &PagingState) -> String {
        String::new()
    }

    /// Hint right after the base-table alias in the from clause.
    fn from_base_table_hint(&self) -> String {
        String::new()
    }

    /// Hint after the whole from clause.
    fn from_hint(&self) -> String {
        String::new()
    }

    /// Paging rendered as a statement suffix, e.g. ` limit 0, 20`.
    fn paging_suffix(&self, _paging: &PagingState) -> String {
        String::new()
    }

    /// Paging rendered by wrapping the whole statement, e.g. a row-number view.
    fn wrap_paging(&self, sql: String, _paging: &PagingState) -> String {
        sql
    }

    fn lock_for_update(&self) -> ClauseResult<LockHint>;

    /// Nulls-first/last rendering for one order-by element.
    fn nulls_ordering(&self, _column: &str, element_clause: &str, nulls_first: bool) -> String {
        let position = if nulls_first { "first" } else { "last" };
        format!("{element_clause} nulls {position}")
    }

    /// Whether a plain select with union branches must be wrapped in an
    /// enclosing view before order-by and paging apply.
    fn is_union_normal_select_enclosing_required(&self) -> bool {
        false
    }

    /// Whether query-update/delete may reference the target table in an
    /// `in (select ...)` sub-query.
    fn is_query_update_subquery_supported(&self) -> bool {
        true
    }

    /// Whether paging can skip leading rows.
    fn is_fetch_start_index_supported(&self) -> bool {
        true
    }

    /// Whether paging can bound the row count at all.
    fn is_fetch_size_supported(&self) -> bool {
        true
    }
}

/// Case-when emulation for databases without native `nulls first/last`.
fn case_when_nulls(column: &str, element_clause: &str, nulls_first: bool) -> String {
    let then_number = if nulls_first { "1" } else { "0" };
    let else_number = if nulls_first { "0" } else { "1" };
    format!("case when {column} is not null then {then_number} else {else_number} end asc, {element_clause}")
}

fn row_number_wrap(sql: &str, row_expression: &str, paging: &PagingState) -> String {
    let start = paging.page_start_index();
    let end = paging.page_end_index();
    format!(
        "select * from (select dfbase.*, {row_expression} as rn from (\n{sql}\n) dfbase) where rn > {start} and rn <= {end}"
    )
}

// ==================== MySQL ====================

/// Modifier of a MySQL full-text `match ... against` condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchModifier {
    InBooleanMode,
    InNaturalLanguageMode,
    InNaturalLanguageModeWithQueryExpansion,
    WithQueryExpansion,
}

impl MatchModifier {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::InBooleanMode => "in boolean mode",
            Self::InNaturalLanguageMode => "in natural language mode",
            Self::InNaturalLanguageModeWithQueryExpansion => {
                "in natural language mode with query expansion"
            }
            Self::WithQueryExpansion => "with query expansion",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl MySql {
    /// Build a `match(...) against (...)` condition for full-text search.
    /// The condition value is embedded as a literal because MySQL does not
    /// take a bind variable there.
    pub fn build_match_condition(
        &self,
        table: &TableMeta,
        text_columns: &[&str],
        condition_value: &str,
        modifier: Option<MatchModifier>,
        alias_name: &str,
    ) -> ClauseResult<String> {
        if text_columns.is_empty() {
            return Err(ClauseError::precondition(
                "buildMatchCondition() needs at least one text column",
            ));
        }
        if condition_value.is_empty() {
            return Err(ClauseError::precondition(
                "buildMatchCondition() needs a condition value",
            ));
        }
        if alias_name.trim().is_empty() {
            return Err(ClauseError::precondition(
                "buildMatchCondition() needs a table alias name",
            ));
        }
        let mut column_list = String::new();
        for (index, column) in text_columns.iter().enumerate() {
            if table.find_column(column).is_none() {
                return Err(ClauseError::precondition(format!(
                    "the text column '{column}' is not in the table '{}'",
                    table.name
                )));
            }
            if index > 0 {
                column_list.push(',');
            }
            column_list.push_str(alias_name);
            column_list.push('.');
            column_list.push_str(column);
        }
        let mut condition = format!("match({column_list}) against ('{condition_value}'");
        if let Some(modifier) = modifier {
            condition.push(' ');
            condition.push_str(modifier.as_sql());
        }
        condition.push(')');
        Ok(condition)
    }
}

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn paging_suffix(&self, paging: &PagingState) -> String {
        if !paging.is_fetch_scope_effective() {
            return String::new();
        }
        format!(" limit {}, {}", paging.page_start_index(), paging.fetch_size())
    }

    fn lock_for_update(&self) -> ClauseResult<LockHint> {
        Ok(LockHint::Suffix(" for update".to_string()))
    }

    fn nulls_ordering(&self, column: &str, element_clause: &str, nulls_first: bool) -> String {
        case_when_nulls(column, element_clause, nulls_first)
    }

    fn is_query_update_subquery_supported(&self) -> bool {
        false
    }
}

// ==================== Oracle ====================

#[derive(Debug, Clone, Copy, Default)]
pub struct Oracle;

impl Dialect for Oracle {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn wrap_paging(&self, sql: String, paging: &PagingState) -> String {
        if !paging.is_fetch_scope_effective() {
            return sql;
        }
        row_number_wrap(&sql, "rownum", paging)
    }

    fn lock_for_update(&self) -> ClauseResult<LockHint> {
        Ok(LockHint::Suffix(" for update".to_string()))
    }

    fn is_union_normal_select_enclosing_required(&self) -> bool {
        true
    }
}

// ==================== DB2 ====================

#[derive(Debug, Clone, Copy, Default)]
pub struct Db2;

impl Dialect for Db2 {
    fn name(&self) -> &'static str {
        "db2"
    }

    fn wrap_paging(&self, sql: String, paging: &PagingState) -> String {
        if !paging.is_fetch_scope_effective() {
            return sql;
        }
        row_number_wrap(&sql, "row_number() over()", paging)
    }

    fn lock_for_update(&self) -> ClauseResult<LockHint> {
        Ok(LockHint::Suffix(" for update with rs".to_string()))
    }

    fn nulls_ordering(&self, column: &str, element_clause: &str, nulls_first: bool) -> String {
        case_when_nulls(column, element_clause, nulls_first)
    }

    fn is_union_normal_select_enclosing_required(&self) -> bool {
        true
    }
}

// ==================== SQL Server ====================

#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServer;

impl Dialect for SqlServer {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn select_hint(&self, paging: &PagingState) -> String {
        if !paging.is_fetch_scope_effective() {
            return String::new();
        }
        // no start-index support, so narrow to the cumulative row count
        format!(" top {}", paging.page_end_index())
    }

    fn lock_for_update(&self) -> ClauseResult<LockHint> {
        Ok(LockHint::FromBaseTable(" with (updlock)".to_string()))
    }

    fn nulls_ordering(&self, column: &str, element_clause: &str, nulls_first: bool) -> String {
        case_when_nulls(column, element_clause, nulls_first)
    }

    fn is_union_normal_select_enclosing_required(&self) -> bool {
        true
    }

    fn is_fetch_start_index_supported(&self) -> bool {
        false
    }
}

// ==================== Derby ====================

#[derive(Debug, Clone, Copy, Default)]
pub struct Derby;

impl Dialect for Derby {
    fn name(&self) -> &'static str {
        "derby"
    }

    fn paging_suffix(&self, paging: &PagingState) -> String {
        if !paging.is_fetch_scope_effective() {
            return String::new();
        }
        format!(
            " offset {} rows fetch next {} rows only",
            paging.page_start_index(),
            paging.fetch_size()
        )
    }

    fn lock_for_update(&self) -> ClauseResult<LockHint> {
        Ok(LockHint::Suffix(" for update".to_string()))
    }

    fn is_query_update_subquery_supported(&self) -> bool {
        false
    }
}

// ==================== Default ====================

/// Fallback dialect: no paging rendering, no locking.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDialect;

impl Dialect for DefaultDialect {
    fn name(&self) -> &'static str {
        "default"
    }

    fn lock_for_update(&self) -> ClauseResult<LockHint> {
        Err(ClauseError::unsupported(
            "lockForUpdate() is unavailable in this database",
        ))
    }

    fn is_fetch_start_index_supported(&self) -> bool {
        false
    }

    fn is_fetch_size_supported(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paging_first(size: usize) -> PagingState {
        let mut paging = PagingState::new();
        paging.fetch_first(size).unwrap();
        paging
    }

    #[test]
    fn test_mysql_limit_suffix() {
        let mut paging = paging_first(20);
        assert_eq!(MySql.paging_suffix(&paging), " limit 0, 20");
        paging.fetch_page(3).unwrap();
        assert_eq!(MySql.paging_suffix(&paging), " limit 40, 20");
        assert_eq!(MySql.paging_suffix(&PagingState::new()), "");
    }

    #[test]
    fn test_derby_offset_fetch_suffix() {
        let paging = paging_first(10);
        assert_eq!(
            Derby.paging_suffix(&paging),
            " offset 0 rows fetch next 10 rows only"
        );
    }

    #[test]
    fn test_oracle_rownum_wrap() {
        let mut paging = paging_first(10);
        paging.fetch_page(2).unwrap();
        let wrapped = Oracle.wrap_paging("select ...".to_string(), &paging);
        assert!(wrapped.starts_with("select * from (select dfbase.*, rownum as rn from ("));
        assert!(wrapped.ends_with("where rn > 10 and rn <= 20"));
        let untouched = Oracle.wrap_paging("select ...".to_string(), &PagingState::new());
        assert_eq!(untouched, "select ...");
    }

    #[test]
    fn test_db2_row_number_wrap() {
        let paging = paging_first(5);
        let wrapped = Db2.wrap_paging("select ...".to_string(), &paging);
        assert!(wrapped.contains("row_number() over() as rn"));
        assert!(wrapped.ends_with("where rn > 0 and rn <= 5"));
    }

    #[test]
    fn test_sqlserver_top_hint() {
        let mut paging = paging_first(20);
        paging.fetch_page(2).unwrap();
        assert_eq!(SqlServer.select_hint(&paging), " top 40");
        assert_eq!(SqlServer.paging_suffix(&paging), "");
        assert!(!SqlServer.is_fetch_start_index_supported());
    }

    #[test]
    fn test_lock_hints() {
        assert_eq!(
            MySql.lock_for_update().unwrap(),
            LockHint::Suffix(" for update".to_string())
        );
        assert_eq!(
            Db2.lock_for_update().unwrap(),
            LockHint::Suffix(" for update with rs".to_string())
        );
        assert_eq!(
            SqlServer.lock_for_update().unwrap(),
            LockHint::FromBaseTable(" with (updlock)".to_string())
        );
        assert!(DefaultDialect.lock_for_update().unwrap_err().is_unsupported());
    }

    #[test]
    fn test_nulls_ordering() {
        let native = Oracle.nulls_ordering("dfloc.URL", "dfloc.URL asc", false);
        assert_eq!(native, "dfloc.URL asc nulls last");
        let emulated = MySql.nulls_ordering("dfloc.URL", "dfloc.URL asc", true);
        assert_eq!(
            emulated,
            "case when dfloc.URL is not null then 1 else 0 end asc, dfloc.URL asc"
        );
    }

    #[test]
    fn test_mysql_match_condition() {
        let table = TableMeta::new("ACCESS_RESULT_DATA")
            .column("ID", true)
            .column("DATA", false)
            .column("ENCODING", false);
        let condition = MySql
            .build_match_condition(
                &table,
                &["DATA", "ENCODING"],
                "crawler",
                Some(MatchModifier::InBooleanMode),
                "dfloc",
            )
            .unwrap();
        assert_eq!(
            condition,
            "match(dfloc.DATA,dfloc.ENCODING) against ('crawler' in boolean mode)"
        );
    }

    #[test]
    fn test_mysql_match_condition_preconditions() {
        let table = TableMeta::new("T").column("A", false);
        assert!(
            MySql
                .build_match_condition(&table, &[], "v", None, "dfloc")
                .unwrap_err()
                .is_precondition()
        );
        assert!(
            MySql
                .build_match_condition(&table, &["MISSING"], "v", None, "dfloc")
                .unwrap_err()
                .is_precondition()
        );
    }
}
