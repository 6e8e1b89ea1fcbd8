//! # sqlclause
//!
//! A dialect-aware SQL clause construction engine.
//!
//! A [`SqlClause`] incrementally accumulates select columns, joins, where
//! predicates, order-by directives, union branches, paging and locking, and
//! renders them into one dialect-correct SQL string. Condition values never
//! pass through the assembler; conditions arrive as expressions with bind
//! markers already embedded.
//!
//! ## Features
//!
//! - **Stateful assembly**: register clauses in any order, render at the end
//! - **Dialect strategies**: paging, locking and nulls ordering vary per
//!   database behind the [`Dialect`] trait
//! - **Inline views**: conditions can move inside the base table or a joined
//!   table's derived view
//! - **Or-scopes**: bracketed registration windows that reflect into
//!   or-connected clauses per target list
//! - **Template marks**: rendered fragments carry marks so set-based DML can
//!   rewrite them later
//! - **Sub-query indentation**: nested selects are re-indented for readable
//!   SQL logging
//!
//! ```
//! use std::sync::Arc;
//! use sqlclause::{MySql, Schema, SqlClause, TableMeta};
//!
//! let schema = Arc::new(Schema::new().table(
//!     TableMeta::new("URL_QUEUE")
//!         .column("ID", true)
//!         .column("SESSION_ID", false)
//!         .column("URL", false),
//! ));
//! let mut clause = SqlClause::new("URL_QUEUE", MySql, schema);
//! clause.register_where_clause("dfloc.SESSION_ID", "=", "?")?;
//! clause.register_order_by("dfloc.ID", true)?;
//! clause.fetch_first(20)?;
//! let sql = clause.get_clause()?;
//! assert!(sql.contains("limit 0, 20"));
//! # Ok::<(), sqlclause::ClauseError>(())
//! ```

pub mod clause;
pub mod dialect;
pub mod error;
pub mod fragment;
pub mod indent;
pub mod orderby;
pub mod paging;
pub mod schema;

pub use clause::{
    FOREIGN_ALIAS_PREFIX, LOCAL_ALIAS_NAME, RESOURCE_VIEW_ALIAS_NAME, SCALAR_VIEW_ALIAS_NAME,
    SelectClauseType, SqlClause, UNION_VIEW_ALIAS_NAME,
};
pub use clause::join::{FixedConditionResolver, JoinInfo, VariableFixedConditionResolver};
pub use dialect::{
    Db2, DefaultDialect, Derby, Dialect, LockHint, MatchModifier, MySql, Oracle, SqlServer,
};
pub use error::{ClauseError, ClauseResult};
pub use fragment::{QueryClause, WhereClauseFilter};
pub use indent::SubQueryIndentProcessor;
pub use orderby::{OrderByClause, OrderByElement, OrderValue};
pub use paging::PagingState;
pub use schema::{ColumnMeta, RelationMeta, Schema, TableMeta};
