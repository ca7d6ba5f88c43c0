//! Table and adapter configuration.

use crate::dialect::Dialect;
use tracing::Level;

/// How UPDATE/DELETE statements without a condition are handled.
///
/// Such statements touch every row of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DangerousDmlPolicy {
    /// Run silently.
    Allow,
    /// Run and emit a `tracing` warning.
    #[default]
    Warn,
    /// Refuse with a validation error.
    Error,
}

/// SQL logging options used by [`crate::SqlAdapter`].
#[derive(Debug, Clone)]
pub struct SqlLogConfig {
    /// Tracing event level for executed statements.
    pub level: Level,
    /// Truncate logged SQL (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for SqlLogConfig {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

impl SqlLogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }
}

/// Configuration for [`crate::Table`].
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Dialect override. `None` uses the connection's dialect.
    pub dialect: Option<Dialect>,
    /// Name of the primary key constraint emitted by CREATE TABLE.
    ///
    /// `None` picks a per-dialect default: `PK_cons` for MySQL, which ignores
    /// the name, and `<table>_pk` for Postgres, where it names a schema-wide index.
    pub primary_key_constraint: Option<String>,
    /// UPDATE without a condition.
    pub update_without_where: DangerousDmlPolicy,
    /// DELETE without a condition.
    pub delete_without_where: DangerousDmlPolicy,
    /// Statement logging.
    pub sql_log: SqlLogConfig,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            dialect: None,
            primary_key_constraint: None,
            update_without_where: DangerousDmlPolicy::default(),
            delete_without_where: DangerousDmlPolicy::default(),
            sql_log: SqlLogConfig::default(),
        }
    }
}

impl TableConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Render statements for `dialect` regardless of the connection.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Set the primary key constraint name.
    pub fn primary_key_constraint(mut self, name: impl Into<String>) -> Self {
        self.primary_key_constraint = Some(name.into());
        self
    }

    /// Configure how UPDATE without a condition is handled.
    pub fn update_without_where(mut self, policy: DangerousDmlPolicy) -> Self {
        self.update_without_where = policy;
        self
    }

    /// Configure how DELETE without a condition is handled.
    pub fn delete_without_where(mut self, policy: DangerousDmlPolicy) -> Self {
        self.delete_without_where = policy;
        self
    }

    /// Refuse UPDATE and DELETE without a condition.
    pub fn strict(mut self) -> Self {
        self.update_without_where = DangerousDmlPolicy::Error;
        self.delete_without_where = DangerousDmlPolicy::Error;
        self
    }

    /// Set statement logging options.
    pub fn sql_log(mut self, sql_log: SqlLogConfig) -> Self {
        self.sql_log = sql_log;
        self
    }
}
