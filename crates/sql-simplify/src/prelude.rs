//! Convenience re-exports.
//!
//! ```ignore
//! use sql_simplify::prelude::*;
//! ```

pub use crate::{
    ColumnDef, ColumnType, Condition, Connection, Dialect, Join, JoinType, OrmError, OrmResult,
    QueryOutput, Record, Schema, SqlAdapter, Table, TableConfig,
};
