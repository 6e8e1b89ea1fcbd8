//! Sub-query indent processing.
//!
//! Nested select fragments are embedded into the outer SQL wrapped in line-comment
//! marks carrying an identity. After assembly the marks are stripped and every
//! marked region is re-indented relative to where its begin mark sat, recursively
//! for nested regions. SQL without marks passes through untouched, so the filter
//! is idempotent.

use crate::error::{ClauseError, ClauseResult};

pub const BEGIN_MARK_PREFIX: &str = "--#df:sqbegin#";
pub const END_MARK_PREFIX: &str = "--#df:sqend#";
pub const IDENTITY_TERMINAL: &str = "#df:idterm#";

const LN: &str = "\n";

/// Strips sub-query marks and re-indents the marked regions.
#[derive(Debug, Default)]
pub struct SubQueryIndentProcessor;

impl SubQueryIndentProcessor {
    pub fn new() -> Self {
        Self
    }

    // ==================== Resolve Identity ====================

    pub fn resolve_begin_mark(identity: &str) -> String {
        format!("{BEGIN_MARK_PREFIX}{identity}{IDENTITY_TERMINAL}")
    }

    pub fn resolve_end_mark(identity: &str) -> String {
        format!("{END_MARK_PREFIX}{identity}{IDENTITY_TERMINAL}")
    }

    // ==================== Process Indent ====================

    /// Entry point for a fully assembled statement.
    pub fn process(&self, sql: &str) -> ClauseResult<String> {
        self.process_with_indent(sql, "", sql)
    }

    fn process_with_indent(
        &self,
        sql: &str,
        pre_indent: &str,
        original_sql: &str,
    ) -> ClauseResult<String> {
        if !sql.contains(BEGIN_MARK_PREFIX) {
            return Ok(sql.to_string());
        }
        let terminal_len = IDENTITY_TERMINAL.len();
        let mut main_sb = String::new();
        let mut sub_sb = String::new();
        let mut through_begin = false;
        let mut through_begin_first = false;
        let mut identity: Option<String> = None;
        let mut indent = String::new();
        let mut pre_remainder: Option<String> = None;
        for raw_line in sql.split(LN) {
            let line = match pre_remainder.take() {
                Some(rem) if !rem.trim().is_empty() => {
                    format!("{rem}{LN}{indent}{raw_line}")
                }
                _ => raw_line.to_string(),
            };
            let had_remainder = line.contains(LN);
            if !through_begin {
                if let Some(mark_index) = line.find(BEGIN_MARK_PREFIX) {
                    through_begin = true;
                    sub_sb.clear();
                    let terminal_index = line.find(IDENTITY_TERMINAL).ok_or_else(|| {
                        ClauseError::SubQueryIndent(format!(
                            "identity terminal not found at the begin line: [{line}]"
                        ))
                    })?;
                    sub_sb.push_str(&line[..mark_index]);
                    sub_sb.push_str(&line[terminal_index + terminal_len..]);
                    identity =
                        Some(line[mark_index + BEGIN_MARK_PREFIX.len()..terminal_index].to_string());
                    if had_remainder {
                        sub_sb.push_str(LN);
                        through_begin_first = true;
                        indent = " ".repeat(indent.len().saturating_sub(pre_indent.len()));
                    } else {
                        indent = " ".repeat(mark_index.saturating_sub(pre_indent.len()));
                    }
                } else {
                    main_sb.push_str(&line);
                    main_sb.push_str(LN);
                }
            } else {
                let current_identity = identity.as_deref().unwrap_or_default();
                let end_mark = format!("{END_MARK_PREFIX}{current_identity}");
                if line.contains(&end_mark) {
                    let mark_index = line.find(END_MARK_PREFIX).unwrap_or(0);
                    let terminal_index = line.find(IDENTITY_TERMINAL).ok_or_else(|| {
                        ClauseError::SubQueryIndent(format!(
                            "identity terminal not found at the end line: [{line}]"
                        ))
                    })?;
                    let remainder = line[terminal_index + terminal_len..].to_string();
                    sub_sb.push_str(&line[..mark_index]);
                    if remainder.trim().is_empty() {
                        sub_sb.push_str(LN);
                    }
                    let nested_pre_indent = format!("{pre_indent}{indent}");
                    let current_sql =
                        self.process_with_indent(&sub_sb, &nested_pre_indent, original_sql)?;
                    main_sb.push_str(&current_sql);
                    pre_remainder = Some(remainder);
                    through_begin = false;
                    through_begin_first = false;
                } else if !through_begin_first {
                    sub_sb.push_str(line.trim());
                    sub_sb.push_str(LN);
                    through_begin_first = true;
                } else {
                    sub_sb.push_str(&indent);
                    sub_sb.push_str(&line);
                    sub_sb.push_str(LN);
                }
            }
        }
        if let Some(rem) = pre_remainder
            && !rem.trim().is_empty()
        {
            main_sb.push_str(&rem);
        }
        let filtered = main_sb.trim_end().to_string();
        if through_begin {
            return Err(ClauseError::SubQueryIndent(format!(
                "end mark not found for sub-query '{}': [{original_sql}]",
                identity.unwrap_or_default()
            )));
        }
        if filtered.contains(BEGIN_MARK_PREFIX) {
            return Err(ClauseError::SubQueryIndent(format!(
                "unhandled begin mark remains: [{original_sql}]"
            )));
        }
        Ok(filtered)
    }

    // ==================== Determination ====================

    pub fn has_sub_query_begin_on_first_line(exp: &str) -> bool {
        match exp.split_once(LN) {
            Some((first_line, _)) => first_line.contains(BEGIN_MARK_PREFIX),
            None => false,
        }
    }

    pub fn has_sub_query_end_on_last_line(exp: &str) -> bool {
        match exp.rsplit_once(LN) {
            Some((_, last_line)) => last_line.contains(END_MARK_PREFIX),
            None => false,
        }
    }

    /// Injects `inserted` just before the last end mark, keeping the mark on the
    /// last line so outer processing still recognizes it.
    pub fn insert_sub_query_end_on_last_line(exp: &str, inserted: &str) -> String {
        match exp.rfind(END_MARK_PREFIX) {
            Some(index) => {
                let (front, rear) = exp.split_at(index);
                format!("{front}{inserted}{rear}")
            }
            None => format!("{exp}{inserted}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn begin(id: &str) -> String {
        SubQueryIndentProcessor::resolve_begin_mark(id)
    }

    fn end(id: &str) -> String {
        SubQueryIndentProcessor::resolve_end_mark(id)
    }

    #[test]
    fn test_process_without_marks_is_identity() {
        let sql = "select * from URL_QUEUE dfloc\n where dfloc.ID = ?";
        let processed = SubQueryIndentProcessor::new().process(sql).unwrap();
        assert_eq!(processed, sql);
    }

    #[test]
    fn test_process_strips_marks_and_indents() {
        let sql = format!(
            "select * from ({}\nselect dfloc.ID\n  from URL_QUEUE dfloc\n) dfunionview{}",
            begin("dfunionview"),
            end("dfunionview"),
        );
        let processed = SubQueryIndentProcessor::new().process(&sql).unwrap();
        assert!(!processed.contains("#df:"));
        let lines: Vec<&str> = processed.split('\n').collect();
        assert_eq!(lines[0], "select * from (select dfloc.ID");
        // region lines re-indented to the begin-mark column
        assert_eq!(lines[1], format!("{}  from URL_QUEUE dfloc", " ".repeat(15)));
        assert_eq!(lines[2], ") dfunionview");
    }

    #[test]
    fn test_process_is_idempotent() {
        let sql = format!(
            "select * from ({}\nselect dfloc.ID\n  from URL_QUEUE dfloc\n) dfunionview{}",
            begin("dfunionview"),
            end("dfunionview"),
        );
        let once = SubQueryIndentProcessor::new().process(&sql).unwrap();
        let twice = SubQueryIndentProcessor::new().process(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_end_mark_is_an_error() {
        let sql = format!("select * from ({}\nselect 1\n) v", begin("v"));
        let err = SubQueryIndentProcessor::new().process(&sql).unwrap_err();
        assert!(matches!(err, ClauseError::SubQueryIndent(_)));
    }

    #[test]
    fn test_determination_helpers() {
        let exp = format!("x ({}\nselect 1\n) y{}", begin("a"), end("a"));
        assert!(SubQueryIndentProcessor::has_sub_query_begin_on_first_line(
            &exp
        ));
        assert!(SubQueryIndentProcessor::has_sub_query_end_on_last_line(&exp));
        assert!(!SubQueryIndentProcessor::has_sub_query_begin_on_first_line(
            "plain"
        ));
    }

    #[test]
    fn test_insert_end_on_last_line() {
        let exp = format!("(select 1) v{}", end("v"));
        let inserted = SubQueryIndentProcessor::insert_sub_query_end_on_last_line(&exp, " desc");
        assert_eq!(inserted, format!("(select 1) v desc{}", end("v")));
    }
}
