//! The `Table` helper: CRUD, join and DDL statements for one table.

mod join;


pub use join::{Join, JoinType};

use crate::adapter::SqlAdapter;
use crate::client::{Connection, QueryOutput};
use crate::condition::Condition;
use crate::config::{DangerousDmlPolicy, TableConfig};
use crate::dialect::{Dialect, Quote};
use crate::error::{OrmError, OrmResult};
use crate::escape::escape_char;
use crate::ident::{check_ident, check_projection, is_qualified};
use crate::schema::Schema;
use crate::value::Record;
use serde::de::DeserializeOwned;

/// A database table described by a [`Schema`].
///
/// Every operation renders one statement and runs it through the table's
/// [`SqlAdapter`]: one round trip per call, no retries, no coordination between
/// concurrent calls. Failures are logged and returned as `Err`.
///
/// # Example
///
/// ```ignore
/// use sql_simplify::{ColumnDef, Condition, Record, Schema, Table};
///
/// let schema = Schema::new()
///     .column("id", ColumnDef::integer().auto_increment().primary_key())
///     .column("name", ColumnDef::string().default_value(""))
///     .column("email", ColumnDef::string().default_value(""));
/// let users = Table::new("users", schema, pool)?;
///
/// let created = users
///     .create(Record::new().with("name", "John Doe").with("email", "john@example.com"))
///     .await?;
/// let found = users.find_by(&Condition::eq("email", "john@example.com")).await?;
/// ```
#[derive(Debug)]
pub struct Table<C> {
    name: String,
    schema: Schema,
    db: SqlAdapter<C>,
    config: TableConfig,
}

impl<C: Connection> Table<C> {
    /// Create a table with the default configuration.
    pub fn new(name: impl Into<String>, schema: Schema, conn: C) -> OrmResult<Self> {
        Self::with_config(name, schema, conn, TableConfig::default())
    }

    /// Create a table with an explicit configuration.
    pub fn with_config(
        name: impl Into<String>,
        schema: Schema,
        conn: C,
        config: TableConfig,
    ) -> OrmResult<Self> {
        let name = name.into();
        check_ident(&name)?;
        schema.validate()?;
        if let Some(constraint) = &config.primary_key_constraint {
            check_ident(constraint)?;
        }

        let db = SqlAdapter::new(conn).with_log_config(config.sql_log.clone());
        Ok(Self {
            name,
            schema,
            db,
            config,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Column generated ids are written back to by [`Table::create`].
    pub fn primary_key(&self) -> Option<&str> {
        self.schema.primary_key()
    }

    /// Name of the primary key constraint emitted by [`Table::create_table_sql`].
    pub fn primary_key_constraint(&self) -> String {
        if let Some(name) = &self.config.primary_key_constraint {
            return name.clone();
        }
        match self.dialect() {
            Dialect::MySql => "PK_cons".to_string(),
            Dialect::Postgres => format!("{}_pk", self.name.replace('.', "_")),
        }
    }

    /// Dialect statements are rendered in.
    pub fn dialect(&self) -> Dialect {
        self.config.dialect.unwrap_or_else(|| self.db.dialect())
    }

    pub fn adapter(&self) -> &SqlAdapter<C> {
        &self.db
    }

    /// Start a join against `related` on `related.on = self.reference`.
    pub fn join_with<D: Connection>(
        &self,
        related: &Table<D>,
        on: impl Into<String>,
        reference: impl Into<String>,
    ) -> Join {
        Join::new(related.name(), on, reference)
    }

    // ==================== Statement rendering ====================

    /// `INSERT INTO t (cols) VALUES (vals)`.
    ///
    /// In the Postgres dialect the primary key is read back with `RETURNING`.
    pub fn insert_sql(&self, row: &Record) -> OrmResult<String> {
        if row.is_empty() {
            return Err(OrmError::validation(format!(
                "INSERT into '{}' requires at least one column",
                self.name
            )));
        }
        let dialect = self.dialect();

        let mut columns = Vec::with_capacity(row.len());
        let mut values = Vec::with_capacity(row.len());
        for (column, value) in row.iter() {
            check_ident(column)?;
            columns.push(column);
            values.push(dialect.literal(value, Quote::Single));
        }

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name,
            columns.join(","),
            values.join(",")
        );
        if let Some(pk) = self.primary_key()
            && dialect.supports_returning()
        {
            sql.push_str(" RETURNING ");
            sql.push_str(pk);
        }
        Ok(sql)
    }

    /// `SELECT * FROM t [WHERE ...]`. An empty condition adds no WHERE clause.
    pub fn select_sql(&self, condition: Option<&Condition>) -> OrmResult<String> {
        let mut sql = format!("SELECT * FROM {}", self.name);
        self.push_where(&mut sql, condition)?;
        Ok(sql)
    }

    /// `UPDATE t SET col="val",... [WHERE ...]`.
    pub fn update_sql(&self, values: &Record, condition: &Condition) -> OrmResult<String> {
        if values.is_empty() {
            return Err(OrmError::validation(format!(
                "UPDATE of '{}' requires at least one SET column",
                self.name
            )));
        }
        let dialect = self.dialect();

        let mut assignments = Vec::with_capacity(values.len());
        for (column, value) in values.iter() {
            check_ident(column)?;
            assignments.push(format!("{column}={}", dialect.literal(value, Quote::Double)));
        }

        let mut sql = format!("UPDATE {} SET {}", self.name, assignments.join(","));
        self.push_where(&mut sql, Some(condition))?;
        Ok(sql)
    }

    /// `DELETE FROM t [WHERE ...]`.
    pub fn delete_sql(&self, condition: &Condition) -> OrmResult<String> {
        let mut sql = format!("DELETE FROM {}", self.name);
        self.push_where(&mut sql, Some(condition))?;
        Ok(sql)
    }

    /// `SELECT cols FROM t <TYPE> JOIN related ON related.on=t.reference [WHERE ...]`.
    pub fn join_sql(&self, join: &Join) -> OrmResult<String> {
        check_ident(&join.related_table)?;
        check_ident(&join.on)?;
        check_ident(&join.reference)?;
        for column in &join.get {
            check_projection(column)?;
        }

        let projection = if join.get.is_empty() {
            "*".to_string()
        } else {
            join.get.join(", ")
        };
        let on = qualify(&join.related_table, &join.on);
        let reference = qualify(&self.name, &join.reference);

        let mut sql = format!(
            "SELECT {projection} FROM {} {} JOIN {} ON {on}={reference}",
            self.name,
            join.join_type.as_sql(),
            join.related_table
        );
        self.push_where(&mut sql, join.condition.as_ref())?;
        Ok(sql)
    }

    /// `CREATE TABLE t (col type [DEFAULT d] [AUTO_INCREMENT], ..., CONSTRAINT PK_cons PRIMARY KEY (pk))`.
    ///
    /// The constraint is left out when no column is marked primary key.
    pub fn create_table_sql(&self) -> OrmResult<String> {
        if self.schema.is_empty() {
            return Err(OrmError::validation(format!(
                "CREATE TABLE '{}' requires at least one column",
                self.name
            )));
        }
        let dialect = self.dialect();

        let mut parts = Vec::with_capacity(self.schema.len() + 1);
        for (column, def) in self.schema.iter() {
            let mut part = format!("{column} {}", dialect.column_type(def.column_type));
            if let Some(default) = &def.default {
                part.push_str(" DEFAULT ");
                part.push_str(&dialect.default_literal(default));
            }
            if def.auto_increment {
                part.push(' ');
                part.push_str(dialect.auto_increment());
            }
            parts.push(part);
        }

        let keys = self.schema.primary_keys();
        if !keys.is_empty() {
            parts.push(format!(
                "CONSTRAINT {} PRIMARY KEY ({})",
                self.primary_key_constraint(),
                keys.join(", ")
            ));
        }

        Ok(format!("CREATE TABLE {} ({})", self.name, parts.join(", ")))
    }

    fn push_where(&self, sql: &mut String, condition: Option<&Condition>) -> OrmResult<()> {
        let Some(condition) = condition.filter(|c| !c.is_empty()) else {
            return Ok(());
        };
        condition.validate()?;
        sql.push_str(" WHERE ");
        sql.push_str(&condition.render(self.dialect()));
        Ok(())
    }

    // ==================== Operations ====================

    /// Insert `row` and return it, with the generated id merged in under the
    /// primary key column when the database reports one.
    pub async fn create(&self, row: Record) -> OrmResult<Record> {
        let result = async {
            let sql = self.insert_sql(&row)?;
            let mut out = self.db.query(&sql).await?;
            out.rows = self.typed_rows(out.rows);
            Ok::<_, OrmError>(self.merge_generated_id(row, &out))
        }
        .await;
        self.logged("create", result)
    }

    /// `SELECT * FROM t`.
    ///
    /// Text cells of schema columns are converted to the column type; other
    /// columns come back as the driver returned them.
    pub async fn find_all(&self) -> OrmResult<Vec<Record>> {
        let result = async {
            let sql = self.select_sql(None)?;
            Ok::<_, OrmError>(self.typed_rows(self.db.query(&sql).await?.rows))
        }
        .await;
        self.logged("find_all", result)
    }

    /// [`Table::find_all`], deserialized into `T`.
    pub async fn find_all_as<T: DeserializeOwned>(&self) -> OrmResult<Vec<T>> {
        let rows = self.find_all().await?;
        self.logged("find_all", decode_rows(&rows))
    }

    /// `SELECT * FROM t WHERE <condition>`.
    pub async fn find_by(&self, condition: &Condition) -> OrmResult<Vec<Record>> {
        let result = async {
            let sql = self.select_sql(Some(condition))?;
            Ok::<_, OrmError>(self.typed_rows(self.db.query(&sql).await?.rows))
        }
        .await;
        self.logged("find_by", result)
    }

    /// [`Table::find_by`], deserialized into `T`.
    pub async fn find_by_as<T: DeserializeOwned>(&self, condition: &Condition) -> OrmResult<Vec<T>> {
        let rows = self.find_by(condition).await?;
        self.logged("find_by", decode_rows(&rows))
    }

    /// Update rows matching `condition`. An empty condition updates every row,
    /// subject to [`TableConfig::update_without_where`].
    pub async fn update(&self, values: &Record, condition: &Condition) -> OrmResult<QueryOutput> {
        let result = async {
            self.check_unfiltered("update", condition, self.config.update_without_where)?;
            let sql = self.update_sql(values, condition)?;
            self.db.query(&sql).await
        }
        .await;
        self.logged("update", result)
    }

    /// Delete rows matching `condition`. An empty condition deletes every row,
    /// subject to [`TableConfig::delete_without_where`].
    pub async fn delete(&self, condition: &Condition) -> OrmResult<QueryOutput> {
        let result = async {
            self.check_unfiltered("delete", condition, self.config.delete_without_where)?;
            let sql = self.delete_sql(condition)?;
            self.db.query(&sql).await
        }
        .await;
        self.logged("delete", result)
    }

    /// Run a single join and return the joined rows.
    pub async fn get_by_join(&self, join: &Join) -> OrmResult<Vec<Record>> {
        let result = async {
            let sql = self.join_sql(join)?;
            Ok::<_, OrmError>(self.typed_rows(self.db.query(&sql).await?.rows))
        }
        .await;
        self.logged("get_by_join", result)
    }

    /// Create the table from its schema.
    pub async fn create_table_in_db(&self) -> OrmResult<QueryOutput> {
        let result = async {
            let sql = self.create_table_sql()?;
            self.db.query(&sql).await
        }
        .await;
        self.logged("create_table_in_db", result)
    }

    /// Run caller-supplied SQL after passing the whole statement through
    /// [`escape_char`].
    ///
    /// Escaping applies to the entire statement, so quotes, `=`, `*`,
    /// parentheses and the like are altered too. Use [`SqlAdapter::query`]
    /// (via [`Table::adapter`]) to run a statement verbatim.
    pub async fn raw_sql(&self, sql: &str) -> OrmResult<QueryOutput> {
        let result = self.db.query(&escape_char(sql)).await;
        self.logged("raw_sql", result)
    }

    // ==================== Helpers ====================

    fn typed_rows(&self, mut rows: Vec<Record>) -> Vec<Record> {
        for row in &mut rows {
            self.schema.type_record(row);
        }
        rows
    }

    fn merge_generated_id(&self, mut row: Record, out: &QueryOutput) -> Record {
        let Some(pk) = self.primary_key() else {
            return row;
        };
        if let Some(id) = out.insert_id.filter(|id| *id != 0) {
            row.set(pk, id);
        } else if let Some(id) = out.rows.first().and_then(|r| r.get(pk)) {
            row.set(pk, id.clone());
        }
        row
    }

    fn check_unfiltered(
        &self,
        operation: &'static str,
        condition: &Condition,
        policy: DangerousDmlPolicy,
    ) -> OrmResult<()> {
        if !condition.is_empty() {
            return Ok(());
        }
        match policy {
            DangerousDmlPolicy::Allow => Ok(()),
            DangerousDmlPolicy::Warn => {
                tracing::warn!(
                    target: "sql_simplify",
                    table = %self.name,
                    operation,
                    "statement has no condition and affects every row"
                );
                Ok(())
            }
            DangerousDmlPolicy::Error => Err(OrmError::validation(format!(
                "{operation} on '{}' without a condition is not allowed",
                self.name
            ))),
        }
    }

    fn logged<T>(&self, operation: &'static str, result: OrmResult<T>) -> OrmResult<T> {
        if let Err(err) = &result {
            tracing::error!(
                target: "sql_simplify",
                table = %self.name,
                operation,
                error = %err,
                "table operation failed"
            );
        }
        result
    }
}

fn qualify(table: &str, column: &str) -> String {
    if is_qualified(column) {
        column.to_string()
    } else {
        format!("{table}.{column}")
    }
}

fn decode_rows<T: DeserializeOwned>(rows: &[Record]) -> OrmResult<Vec<T>> {
    rows.iter().map(Record::deserialize).collect()
}
