//! Where-clause fragments.
//!
//! A fragment is a rendered-on-demand piece of a where clause. Values arrive
//! already embedded as query expressions (bind markers or literals), so a
//! fragment never touches parameter binding itself.

/// One registered where-clause condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryClause {
    /// `column operator value`, e.g. `dfloc.SESSION_ID = ?`
    Compare {
        column: String,
        operator: String,
        value: String,
    },
    /// A free-form clause used as-is.
    Raw(String),
    /// A clause that belongs to an and-part group inside an or-scope.
    /// Members sharing a group id are joined with `and` on reflection.
    AndPart { group: usize, inner: Box<QueryClause> },
}

impl QueryClause {
    pub fn compare(
        column: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Compare {
            column: column.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    pub fn raw(clause: impl Into<String>) -> Self {
        Self::Raw(clause.into())
    }

    /// Render the fragment to SQL text.
    pub fn render(&self) -> String {
        match self {
            Self::Compare {
                column,
                operator,
                value,
            } => format!("{column} {operator} {value}"),
            Self::Raw(clause) => clause.clone(),
            Self::AndPart { inner, .. } => inner.render(),
        }
    }

    /// The and-part group id, when this fragment was registered inside one.
    pub fn and_part_group(&self) -> Option<usize> {
        match self {
            Self::AndPart { group, .. } => Some(*group),
            _ => None,
        }
    }
}

/// Hook applied to every rendered top-level and inline where condition.
pub trait WhereClauseFilter {
    fn filter(&self, clause: &str) -> String;
}

impl<F> WhereClauseFilter for F
where
    F: Fn(&str) -> String,
{
    fn filter(&self, clause: &str) -> String {
        self(clause)
    }
}
