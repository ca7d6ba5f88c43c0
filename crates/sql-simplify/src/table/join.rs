use crate::condition::Condition;

/// Join flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Right,
    /// Rendered as `FULL OUTER`.
    Outer,
}

impl JoinType {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
            JoinType::Outer => "FULL OUTER",
        }
    }
}

/// A single-table join: `related.on = this.reference`.
///
/// # Example
///
/// ```rust
/// use sql_simplify::{Condition, Join, JoinType};
///
/// let join = Join::new("orders", "user_id", "id")
///     .get(["users.name", "orders.total"])
///     .join_type(JoinType::Left)
///     .condition(Condition::eq("users.email", "john@example.com"));
/// assert_eq!(join.related_table(), "orders");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub(crate) related_table: String,
    pub(crate) get: Vec<String>,
    pub(crate) join_type: JoinType,
    pub(crate) on: String,
    pub(crate) reference: String,
    pub(crate) condition: Option<Condition>,
}

impl Join {
    /// `on` is a column of the related table, `reference` a column of the
    /// table the join is issued from. Unqualified names get their table prefix.
    pub fn new(
        related_table: impl Into<String>,
        on: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            related_table: related_table.into(),
            get: Vec::new(),
            join_type: JoinType::default(),
            on: on.into(),
            reference: reference.into(),
            condition: None,
        }
    }

    /// Columns to select. Empty means `*`.
    pub fn get<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.get = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn join_type(mut self, join_type: JoinType) -> Self {
        self.join_type = join_type;
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn related_table(&self) -> &str {
        &self.related_table
    }
}
