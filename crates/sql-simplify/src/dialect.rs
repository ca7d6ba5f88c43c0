//! SQL dialect differences that affect rendered statements.

use crate::escape::{escape_char, escape_standard};
use crate::schema::ColumnType;
use crate::value::value_text;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which quote character a literal is wrapped in.
///
/// MySQL-style statements quote INSERT values with `'` and SET/WHERE values
/// with `"`. Postgres always uses `'`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Single,
    Double,
}

/// Target SQL dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// MySQL-compatible servers: backslash escaping, `AUTO_INCREMENT`,
    /// generated ids reported by the driver.
    #[default]
    #[serde(alias = "mariadb")]
    MySql,
    /// PostgreSQL: standard string literals, identity columns, `RETURNING`.
    #[serde(alias = "postgresql")]
    Postgres,
}

impl Dialect {
    /// Quote and escape a text fragment.
    pub fn quote_text(self, text: &str, quote: Quote) -> String {
        match self {
            Dialect::MySql => {
                let q = match quote {
                    Quote::Single => '\'',
                    Quote::Double => '"',
                };
                format!("{q}{}{q}", escape_char(text))
            }
            Dialect::Postgres => format!("'{}'", escape_standard(text)),
        }
    }

    /// Render a value as a literal. `null` becomes an unquoted `NULL`.
    pub fn literal(self, value: &Value, quote: Quote) -> String {
        match value_text(value) {
            Some(text) => self.quote_text(&text, quote),
            None => "NULL".to_string(),
        }
    }

    /// Render a column default. Numbers and booleans stay unquoted.
    pub fn default_literal(self, value: &Value) -> String {
        match value {
            Value::Bool(true) => "TRUE".to_string(),
            Value::Bool(false) => "FALSE".to_string(),
            Value::Number(n) => n.to_string(),
            other => self.literal(other, Quote::Double),
        }
    }

    /// Column type name for a schema type.
    pub fn column_type(self, column_type: ColumnType) -> &'static str {
        match (self, column_type) {
            (_, ColumnType::String) => "VARCHAR(255)",
            (Dialect::MySql, ColumnType::Integer) => "INT",
            (Dialect::MySql, ColumnType::Float) => "FLOAT",
            (Dialect::MySql, ColumnType::Boolean) => "BOOL",
            (Dialect::MySql, ColumnType::Object) => "LONGTEXT",
            (Dialect::Postgres, ColumnType::Integer) => "INTEGER",
            (Dialect::Postgres, ColumnType::Float) => "REAL",
            (Dialect::Postgres, ColumnType::Boolean) => "BOOLEAN",
            (Dialect::Postgres, ColumnType::Object) => "TEXT",
        }
    }

    /// Column attribute for auto-incrementing keys.
    pub fn auto_increment(self) -> &'static str {
        match self {
            Dialect::MySql => "AUTO_INCREMENT",
            Dialect::Postgres => "GENERATED BY DEFAULT AS IDENTITY",
        }
    }

    /// Whether generated keys are read back with `INSERT ... RETURNING`.
    pub fn supports_returning(self) -> bool {
        matches!(self, Dialect::Postgres)
    }
}
