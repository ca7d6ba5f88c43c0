//! Table schema: column names mapped to column definitions.

use crate::error::{OrmError, OrmResult};
use crate::ident::check_ident;
use crate::value::Record;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Logical column type, mapped to a SQL type by the dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Integer,
    Float,
    Boolean,
    Object,
}

impl ColumnType {
    /// Parse the text form of a cell of this type.
    ///
    /// `None` means the text is kept as a string: always for `String`, and for
    /// text that does not parse as the column's type.
    pub fn parse_text(self, text: &str) -> Option<Value> {
        match self {
            ColumnType::String => None,
            ColumnType::Integer => text.parse::<i64>().ok().map(Value::from),
            ColumnType::Float => text
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            ColumnType::Boolean => match text {
                "t" | "true" | "1" => Some(Value::Bool(true)),
                "f" | "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            ColumnType::Object => serde_json::from_str::<Value>(text)
                .ok()
                .filter(|v| v.is_object() || v.is_array()),
        }
    }
}

/// Definition of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, rename = "autoInc", alias = "auto_increment")]
    pub auto_increment: bool,
    #[serde(default)]
    pub primary_key: bool,
}

impl ColumnDef {
    pub fn new(column_type: ColumnType) -> Self {
        Self {
            column_type,
            default: None,
            auto_increment: false,
            primary_key: false,
        }
    }

    pub fn string() -> Self {
        Self::new(ColumnType::String)
    }

    pub fn integer() -> Self {
        Self::new(ColumnType::Integer)
    }

    pub fn float() -> Self {
        Self::new(ColumnType::Float)
    }

    pub fn boolean() -> Self {
        Self::new(ColumnType::Boolean)
    }

    pub fn object() -> Self {
        Self::new(ColumnType::Object)
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }
}

/// Ordered set of column definitions.
///
/// # Example
///
/// ```rust
/// use sql_simplify::{ColumnDef, Schema};
///
/// let schema = Schema::new()
///     .column("id", ColumnDef::integer().auto_increment().primary_key())
///     .column("name", ColumnDef::string().default_value(""));
/// assert_eq!(schema.primary_key(), Some("id"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    columns: Vec<(String, ColumnDef)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column, replacing an existing definition with the same name in place.
    pub fn column(mut self, name: impl Into<String>, def: ColumnDef) -> Self {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = def,
            None => self.columns.push((name, def)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnDef)> {
        self.columns.iter().map(|(n, d)| (n.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The column generated ids are written back to.
    ///
    /// When several columns are marked, the last one wins.
    pub fn primary_key(&self) -> Option<&str> {
        self.columns
            .iter()
            .rev()
            .find(|(_, d)| d.primary_key)
            .map(|(n, _)| n.as_str())
    }

    /// Every column marked as primary key, in schema order.
    pub fn primary_keys(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, d)| d.primary_key)
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// Convert text cells of schema columns back to their column types.
    ///
    /// Cells that are already typed, unknown columns and text that does not
    /// parse are left as they are.
    pub fn type_record(&self, record: &mut Record) {
        for (name, def) in &self.columns {
            let typed = match record.get(name) {
                Some(Value::String(text)) => def.column_type.parse_text(text),
                _ => None,
            };
            if let Some(value) = typed {
                record.set(name.as_str(), value);
            }
        }
    }

    /// Check that every column name is a plain identifier.
    pub fn validate(&self) -> OrmResult<()> {
        for (name, _) in &self.columns {
            check_ident(name)?;
            if name.contains('.') {
                return Err(OrmError::validation(format!(
                    "Schema column '{name}' must not be qualified"
                )));
            }
        }
        Ok(())
    }

    /// Parse a schema from a JSON object of column definitions.
    pub fn from_json(value: &Value) -> OrmResult<Self> {
        Ok(Self::deserialize(value)?)
    }

    /// Parse a schema from JSON text.
    pub fn from_json_str(text: &str) -> OrmResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl Serialize for Schema {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, def) in &self.columns {
            map.serialize_entry(name, def)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = Schema;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of column names to column definitions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Schema, A::Error> {
                let mut schema = Schema::new();
                while let Some((name, def)) = access.next_entry::<String, ColumnDef>()? {
                    schema = schema.column(name, def);
                }
                Ok(schema)
            }
        }

        deserializer.deserialize_map(SchemaVisitor)
    }
}
