use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backing engine of a registered connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbKind {
    Postgres,
    Mysql,
}

impl fmt::Display for DbKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbKind::Postgres => write!(f, "postgres"),
            DbKind::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TableType {
    Table,
    View,
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableType::Table => write!(f, "TABLE"),
            TableType::View => write!(f, "VIEW"),
        }
    }
}

/// A registered connection as it appears in the catalog listing.
///
/// `name` is the identity key: the server never holds two connections
/// with the same name, and neither may a client-side catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSummary {
    pub id: i64,
    pub name: String,
    #[serde(rename = "dbType")]
    pub kind: DbKind,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// A connection together with its introspected schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDetail {
    #[serde(flatten)]
    pub summary: ConnectionSummary,
    #[serde(default)]
    pub tables: Vec<TableMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    pub id: i64,
    pub table_name: String,
    pub table_type: TableType,
    #[serde(default)]
    pub chinese_name: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetadata {
    pub id: i64,
    pub field_name: String,
    pub data_type: String,
    #[serde(default = "default_nullable")]
    pub is_nullable: bool,
    #[serde(default)]
    pub column_default: Option<String>,
    #[serde(default)]
    pub max_length: Option<i64>,
    #[serde(default)]
    pub chinese_name: Option<String>,
}

fn default_nullable() -> bool {
    true
}

impl ConnectionDetail {
    pub fn name(&self) -> &str {
        &self.summary.name
    }

    pub fn table(&self, table_name: &str) -> Option<&TableMetadata> {
        self.tables.iter().find(|t| t.table_name == table_name)
    }

    /// Set the display annotation of one field in place.
    ///
    /// Returns `false` (and changes nothing) when the table or the field
    /// does not exist in this detail.
    pub fn annotate_field(&mut self, table_name: &str, field_name: &str, chinese_name: &str) -> bool {
        let Some(table) = self.tables.iter_mut().find(|t| t.table_name == table_name) else {
            return false;
        };
        match table.field_mut(field_name) {
            Some(field) => {
                field.chinese_name = Some(chinese_name.to_string());
                true
            }
            None => false,
        }
    }
}

impl TableMetadata {
    pub fn field(&self, field_name: &str) -> Option<&FieldMetadata> {
        self.fields.iter().find(|f| f.field_name == field_name)
    }

    fn field_mut(&mut self, field_name: &str) -> Option<&mut FieldMetadata> {
        self.fields.iter_mut().find(|f| f.field_name == field_name)
    }

    /// Display label: the annotation when present, the raw name otherwise.
    pub fn label(&self) -> &str {
        self.chinese_name.as_deref().unwrap_or(&self.table_name)
    }
}

/// Request body for `PUT /dbs/{name}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterConnectionRequest {
    pub url: String,
}

/// Request body for `PATCH /dbs/{db}/tables/{table}/fields/{field}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFieldRequest {
    pub chinese_name: String,
}
