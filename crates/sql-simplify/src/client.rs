//! Connection trait: the seam between rendered SQL and a database driver.

use crate::dialect::Dialect;
use crate::error::{OrmError, OrmResult};
use crate::value::Record;
use serde_json::Value;
use tokio_postgres::{SimpleQueryMessage, SimpleQueryRow};

/// Result of executing one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    /// Rows returned by the statement (empty for writes without RETURNING).
    pub rows: Vec<Record>,
    /// Rows inserted, updated or deleted.
    pub affected_rows: u64,
    /// Generated key of an INSERT, for drivers that report one.
    pub insert_id: Option<u64>,
}

impl QueryOutput {
    /// Output of a statement that returned rows.
    pub fn rows(rows: Vec<Record>) -> Self {
        let affected_rows = rows.len() as u64;
        Self {
            rows,
            affected_rows,
            insert_id: None,
        }
    }

    /// Output of a write statement.
    pub fn affected(affected_rows: u64) -> Self {
        Self {
            rows: Vec::new(),
            affected_rows,
            insert_id: None,
        }
    }

    pub fn with_insert_id(mut self, id: u64) -> Self {
        self.insert_id = Some(id);
        self
    }
}

/// Something that can execute a SQL string.
///
/// Implemented for tokio-postgres clients and transactions, and (with the
/// `pool` feature) for deadpool-postgres pools and pooled clients. Implement it
/// for any other driver to use [`crate::Table`] with it.
///
/// The Postgres implementations use the simple query protocol: a string may
/// hold several statements, and every cell comes back as text (or `null`).
/// [`crate::Table`] reads convert cells of schema columns back to their types.
pub trait Connection: Send + Sync {
    /// Dialect statements for this connection are rendered in.
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    /// Execute `sql` and collect its rows.
    fn query(&self, sql: &str) -> impl std::future::Future<Output = OrmResult<QueryOutput>> + Send;
}

/// Fold the messages of one simple-protocol exchange into a [`QueryOutput`].
///
/// Rows of every statement are kept in order, each cell as its text form.
/// `affected_rows` is the count reported by the last statement.
pub(crate) fn collect_messages(messages: Vec<SimpleQueryMessage>) -> QueryOutput {
    let mut out = QueryOutput::default();
    for message in messages {
        match message {
            SimpleQueryMessage::Row(row) => out.rows.push(text_record(&row)),
            SimpleQueryMessage::CommandComplete(count) => out.affected_rows = count,
            _ => {}
        }
    }
    out
}

fn text_record(row: &SimpleQueryRow) -> Record {
    let mut record = Record::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let value = row.get(idx).map_or(Value::Null, Value::from);
        record.set(column.name(), value);
    }
    record
}

impl Connection for tokio_postgres::Client {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn query(&self, sql: &str) -> OrmResult<QueryOutput> {
        let messages = tokio_postgres::Client::simple_query(self, sql)
            .await
            .map_err(OrmError::from_db_error)?;
        Ok(collect_messages(messages))
    }
}

impl Connection for tokio_postgres::Transaction<'_> {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn query(&self, sql: &str) -> OrmResult<QueryOutput> {
        let messages = tokio_postgres::Transaction::simple_query(self, sql)
            .await
            .map_err(OrmError::from_db_error)?;
        Ok(collect_messages(messages))
    }
}

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
impl Connection for deadpool_postgres::Client {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn query(&self, sql: &str) -> OrmResult<QueryOutput> {
        // Delegate to the deref target (ClientWrapper -> tokio_postgres::Client).
        Connection::query(&***self, sql).await
    }
}

/// Each call checks a client out of the pool for the duration of one statement.
#[cfg(feature = "pool")]
impl Connection for deadpool_postgres::Pool {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn query(&self, sql: &str) -> OrmResult<QueryOutput> {
        let client = self.get().await?;
        Connection::query(&**client, sql).await
    }
}

impl<C: Connection> Connection for &C {
    fn dialect(&self) -> Dialect {
        (*self).dialect()
    }

    async fn query(&self, sql: &str) -> OrmResult<QueryOutput> {
        (*self).query(sql).await
    }
}

impl<C: Connection> Connection for std::sync::Arc<C> {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    async fn query(&self, sql: &str) -> OrmResult<QueryOutput> {
        (**self).query(sql).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn affected_rows_come_from_the_last_command() {
        let out = collect_messages(vec![
            SimpleQueryMessage::CommandComplete(3),
            SimpleQueryMessage::CommandComplete(1),
        ]);
        assert_eq!(out.affected_rows, 1);
        assert!(out.rows.is_empty());
        assert_eq!(out.insert_id, None);

        assert_eq!(collect_messages(Vec::new()), QueryOutput::default());
    }

    #[test]
    fn output_constructors() {
        let out = QueryOutput::rows(vec![Record::new().with("id", 1), Record::new().with("id", 2)]);
        assert_eq!(out.affected_rows, 2);
        assert_eq!(out.insert_id, None);

        let out = QueryOutput::affected(1).with_insert_id(42);
        assert!(out.rows.is_empty());
        assert_eq!(out.insert_id, Some(42));
        assert_eq!(out.affected_rows, 1);
    }

    struct Fixed;

    impl Connection for Fixed {
        async fn query(&self, sql: &str) -> OrmResult<QueryOutput> {
            Ok(QueryOutput::rows(vec![Record::new().with("sql", sql)]))
        }
    }

    #[tokio::test]
    async fn references_delegate() {
        let conn = Fixed;
        let by_ref = &conn;
        assert_eq!(Connection::dialect(&by_ref), Dialect::MySql);
        let out = Connection::query(&by_ref, "SELECT 1").await.unwrap();
        assert_eq!(out.rows[0].get("sql"), Some(&json!("SELECT 1")));

        let shared = std::sync::Arc::new(Fixed);
        let out = shared.query("SELECT 2").await.unwrap();
        assert_eq!(out.rows[0].get("sql"), Some(&json!("SELECT 2")));
    }
}
