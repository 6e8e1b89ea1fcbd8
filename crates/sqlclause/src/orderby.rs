//! Order-by clause with manual ordering and nulls first/last support.

use std::collections::HashMap;

use crate::dialect::Dialect;
use crate::error::{ClauseError, ClauseResult};

/// A value of manual (case-when) ordering. Numbers are embedded as-is, text is
/// quoted as a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderValue {
    Int(i64),
    Text(String),
}

impl OrderValue {
    fn to_condition_value(&self) -> String {
        match self {
            Self::Int(value) => value.to_string(),
            Self::Text(value) => format!("'{value}'"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderByElement {
    alias_name: Option<String>,
    column_name: String,
    asc: bool,
    nulls_first: Option<bool>,
    manual_values: Vec<OrderValue>,
}

impl OrderByElement {
    pub fn new(alias_name: Option<String>, column_name: impl Into<String>, asc: bool) -> Self {
        Self {
            alias_name,
            column_name: column_name.into(),
            asc,
            nulls_first: None,
            manual_values: Vec::new(),
        }
    }

    pub fn is_asc(&self) -> bool {
        self.asc
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias_name.as_deref()
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn reverse(&mut self) {
        self.asc = !self.asc;
    }

    pub fn column_full_name(&self) -> String {
        match &self.alias_name {
            Some(alias) => format!("{alias}.{}", self.column_name),
            None => self.column_name.clone(),
        }
    }

    fn asc_desc(&self) -> &'static str {
        if self.asc { "asc" } else { "desc" }
    }

    /// Render against the real column name.
    pub fn element_clause(&self, dialect: &dyn Dialect) -> String {
        self.build_clause(&self.column_full_name(), dialect)
    }

    /// Render against the on-query alias recorded for the select clause.
    /// With union branches only selected columns can be ordered by, so a
    /// missing alias is an error.
    pub fn element_clause_mapped(
        &self,
        real_column_alias_map: &HashMap<String, String>,
        dialect: &dyn Dialect,
    ) -> ClauseResult<String> {
        let full_name = self.column_full_name();
        let column_alias = real_column_alias_map
            .get(&full_name)
            .filter(|alias| !alias.trim().is_empty())
            .ok_or_else(|| {
                ClauseError::incompatibility(format!(
                    "the order-by column '{full_name}' was not found in the select clause; \
                     only selected columns can be ordered by when union is used"
                ))
            })?;
        Ok(self.build_clause(column_alias, dialect))
    }

    fn build_clause(&self, column_expression: &str, dialect: &dyn Dialect) -> String {
        if !self.manual_values.is_empty() {
            return self.manual_order_clause(column_expression);
        }
        let element_clause = format!("{column_expression} {}", self.asc_desc());
        match self.nulls_first {
            Some(nulls_first) => {
                dialect.nulls_ordering(column_expression, &element_clause, nulls_first)
            }
            None => element_clause,
        }
    }

    fn manual_order_clause(&self, column_expression: &str) -> String {
        let mut sb = String::from("\n   case\n");
        for (index, value) in self.manual_values.iter().enumerate() {
            sb.push_str("     when ");
            sb.push_str(column_expression);
            sb.push_str(" = ");
            sb.push_str(&value.to_condition_value());
            sb.push_str(&format!(" then {index}\n"));
        }
        sb.push_str(&format!("     else {}\n", self.manual_values.len()));
        sb.push_str(&format!("   end {}", self.asc_desc()));
        sb
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderByClause {
    elements: Vec<OrderByElement>,
}

impl OrderByClause {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Manipulation ====================

    pub fn add_element(&mut self, element: OrderByElement) {
        self.elements.push(element);
    }

    pub fn insert_first_element(&mut self, element: OrderByElement) {
        self.elements.insert(0, element);
    }

    pub fn reverse_all(&mut self) {
        for element in &mut self.elements {
            element.reverse();
        }
    }

    pub fn exchange_first_element_for_last_one(&mut self) {
        let len = self.elements.len();
        if len > 1 {
            self.elements.swap(0, len - 1);
        }
    }

    pub fn add_nulls_first_to_previous(&mut self) {
        if let Some(last) = self.elements.last_mut() {
            last.nulls_first = Some(true);
        }
    }

    pub fn add_nulls_last_to_previous(&mut self) {
        if let Some(last) = self.elements.last_mut() {
            last.nulls_first = Some(false);
        }
    }

    pub fn add_manual_order_to_previous(&mut self, values: Vec<OrderValue>) {
        if let Some(last) = self.elements.last_mut() {
            last.manual_values = values;
        }
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    // ==================== Rendering ====================

    /// Render the full `order by ...` clause. When `real_column_alias_map` is
    /// given, columns are resolved through it (the union case).
    pub fn render(
        &self,
        real_column_alias_map: Option<&HashMap<String, String>>,
        dialect: &dyn Dialect,
    ) -> ClauseResult<String> {
        if self.elements.is_empty() {
            return Ok(String::new());
        }
        let mut rendered = Vec::with_capacity(self.elements.len());
        for element in &self.elements {
            let clause = match real_column_alias_map {
                Some(map) => element.element_clause_mapped(map, dialect)?,
                None => element.element_clause(dialect),
            };
            rendered.push(clause);
        }
        Ok(format!("order by {}", rendered.join(", ")))
    }

    // ==================== Inspection ====================

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_first_element_asc(&self) -> bool {
        self.elements.first().map(OrderByElement::is_asc).unwrap_or(false)
    }

    pub fn is_same_as_first_element_column_name(&self, column_name: &str) -> bool {
        self.elements
            .first()
            .map(|element| element.column_name() == column_name)
            .unwrap_or(false)
    }

    pub fn is_same_as_first_element_alias_name(&self, alias_name: &str) -> bool {
        self.elements
            .first()
            .map(|element| element.alias_name() == Some(alias_name))
            .unwrap_or(false)
    }

    pub fn first_element(&self) -> Option<&OrderByElement> {
        self.elements.first()
    }

    pub fn elements(&self) -> &[OrderByElement] {
        &self.elements
    }

    /// Whether the registered ordering matches a slash-separated list of
    /// full column names, element by element.
    pub fn is_same_order_by_column(&self, order_by_property: &str) -> bool {
        let properties: Vec<&str> = order_by_property.split('/').collect();
        if self.elements.len() != properties.len() {
            return false;
        }
        self.elements
            .iter()
            .zip(properties)
            .all(|(element, property)| element.column_full_name() == property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{DefaultDialect, MySql, Oracle};

    fn element(alias: &str, column: &str, asc: bool) -> OrderByElement {
        OrderByElement::new(Some(alias.to_string()), column, asc)
    }

    #[test]
    fn test_render_basic() {
        let mut clause = OrderByClause::new();
        clause.add_element(element("dfloc", "CREATE_TIME", false));
        clause.add_element(element("dfloc", "ID", true));
        let sql = clause.render(None, &DefaultDialect).unwrap();
        assert_eq!(sql, "order by dfloc.CREATE_TIME desc, dfloc.ID asc");
    }

    #[test]
    fn test_render_empty_is_empty_string() {
        let clause = OrderByClause::new();
        assert_eq!(clause.render(None, &DefaultDialect).unwrap(), "");
    }

    #[test]
    fn test_reverse_all_and_exchange() {
        let mut clause = OrderByClause::new();
        clause.add_element(element("dfloc", "A", true));
        clause.add_element(element("dfloc", "B", true));
        clause.reverse_all();
        assert_eq!(
            clause.render(None, &DefaultDialect).unwrap(),
            "order by dfloc.A desc, dfloc.B desc"
        );
        clause.exchange_first_element_for_last_one();
        assert_eq!(
            clause.render(None, &DefaultDialect).unwrap(),
            "order by dfloc.B desc, dfloc.A desc"
        );
    }

    #[test]
    fn test_nulls_ordering_native_and_emulated() {
        let mut clause = OrderByClause::new();
        clause.add_element(element("dfloc", "URL", true));
        clause.add_nulls_last_to_previous();
        assert_eq!(
            clause.render(None, &Oracle).unwrap(),
            "order by dfloc.URL asc nulls last"
        );
        assert_eq!(
            clause.render(None, &MySql).unwrap(),
            "order by case when dfloc.URL is not null then 0 else 1 end asc, dfloc.URL asc"
        );
    }

    #[test]
    fn test_manual_order_case_when() {
        let mut clause = OrderByClause::new();
        clause.add_element(element("dfloc", "STATUS", true));
        clause.add_manual_order_to_previous(vec![
            OrderValue::Text("NEW".to_string()),
            OrderValue::Int(2),
        ]);
        let sql = clause.render(None, &DefaultDialect).unwrap();
        let expected = "order by \n   case\n     when dfloc.STATUS = 'NEW' then 0\n     when dfloc.STATUS = 2 then 1\n     else 2\n   end asc";
        assert_eq!(sql, expected);
    }

    #[test]
    fn test_mapped_render_requires_selected_column() {
        let mut clause = OrderByClause::new();
        clause.add_element(element("dfloc", "CREATE_TIME", false));
        let mut map = HashMap::new();
        map.insert("dfloc.CREATE_TIME".to_string(), "c4".to_string());
        assert_eq!(
            clause.render(Some(&map), &DefaultDialect).unwrap(),
            "order by c4 desc"
        );
        let empty = HashMap::new();
        let err = clause.render(Some(&empty), &DefaultDialect).unwrap_err();
        assert!(err.is_incompatibility());
    }

    #[test]
    fn test_is_same_order_by_column() {
        let mut clause = OrderByClause::new();
        clause.add_element(element("dfloc", "A", true));
        clause.add_element(element("dfloc", "B", false));
        assert!(clause.is_same_order_by_column("dfloc.A/dfloc.B"));
        assert!(!clause.is_same_order_by_column("dfloc.A"));
        assert!(!clause.is_same_order_by_column("dfloc.B/dfloc.A"));
    }
}
