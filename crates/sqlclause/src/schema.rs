//! Static table metadata used to resolve columns and relations at assembly time.
//!
//! The metadata is provided up front by the caller (typically generated from the
//! database definition) rather than introspected at runtime. The assembler only
//! needs names, primary-key flags and foreign-key join pairs.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    pub primary: bool,
}

/// A foreign-key relation from one table to another, identified by a property
/// name and a relation number unique within the owning table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationMeta {
    pub property: String,
    pub foreign_table: String,
    pub relation_no: usize,
    /// Local/foreign column name pairs making up the join condition.
    pub join_on: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMeta {
    pub name: String,
    pub columns: Vec<ColumnMeta>,
    pub relations: Vec<RelationMeta>,
}

impl TableMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Add a column. `primary` marks it as part of the primary key.
    pub fn column(mut self, name: impl Into<String>, primary: bool) -> Self {
        self.columns.push(ColumnMeta {
            name: name.into(),
            primary,
        });
        self
    }

    /// Add a foreign-key relation to another table.
    pub fn relation(
        mut self,
        property: impl Into<String>,
        foreign_table: impl Into<String>,
        relation_no: usize,
        join_on: Vec<(String, String)>,
    ) -> Self {
        self.relations.push(RelationMeta {
            property: property.into(),
            foreign_table: foreign_table.into(),
            relation_no,
            join_on,
        });
        self
    }

    pub fn find_column(&self, name: &str) -> Option<&ColumnMeta> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn find_relation(&self, property: &str) -> Option<&RelationMeta> {
        self.relations.iter().find(|r| r.property == property)
    }

    pub fn primary_keys(&self) -> Vec<&ColumnMeta> {
        self.columns.iter().filter(|c| c.primary).collect()
    }

    pub fn has_primary_key(&self) -> bool {
        self.columns.iter().any(|c| c.primary)
    }

    pub fn has_compound_primary_key(&self) -> bool {
        self.columns.iter().filter(|c| c.primary).count() > 1
    }
}

/// The set of tables known to the assembler.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    tables: BTreeMap<String, TableMeta>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, table: TableMeta) -> Self {
        self.add_table(table);
        self
    }

    pub fn add_table(&mut self, table: TableMeta) {
        self.tables.insert(table.name.clone(), table);
    }

    pub fn find_table(&self, name: &str) -> Option<&TableMeta> {
        self.tables.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url_queue() -> TableMeta {
        TableMeta::new("URL_QUEUE")
            .column("ID", true)
            .column("SESSION_ID", false)
            .column("URL", false)
            .column("CREATE_TIME", false)
    }

    #[test]
    fn test_find_column_and_primary_keys() {
        let t = url_queue();
        assert!(t.find_column("URL").is_some());
        assert!(t.find_column("url").is_none());
        assert_eq!(t.primary_keys().len(), 1);
        assert!(t.has_primary_key());
        assert!(!t.has_compound_primary_key());
    }

    #[test]
    fn test_relation_lookup() {
        let t = TableMeta::new("ACCESS_RESULT")
            .column("ID", true)
            .relation(
                "accessResultData",
                "ACCESS_RESULT_DATA",
                0,
                vec![("ID".to_string(), "ID".to_string())],
            );
        let r = t.find_relation("accessResultData").unwrap();
        assert_eq!(r.foreign_table, "ACCESS_RESULT_DATA");
        assert_eq!(r.relation_no, 0);
        assert!(t.find_relation("missing").is_none());
    }

    #[test]
    fn test_schema_registry() {
        let schema = Schema::new().table(url_queue());
        assert!(schema.find_table("URL_QUEUE").is_some());
        assert!(schema.find_table("URL_FILTER").is_none());
    }
}
