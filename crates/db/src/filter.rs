//! Bindable values and exact-match column filters.

use sqlx::{QueryBuilder, Sqlite};

use crate::entity::Entity;
use crate::error::{Result, StoreError};

/// A scalar that can be bound as a query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Text(String),
    Null,
}

impl Value {
    pub(crate) fn push_bind(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Value::Integer(v) => builder.push_bind(*v),
            Value::Real(v) => builder.push_bind(*v),
            Value::Text(v) => builder.push_bind(v.clone()),
            Value::Null => builder.push_bind(Option::<String>::None),
        };
    }

    pub(crate) fn bind_to<'q>(
        &self,
        query: sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    ) -> sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
        match self {
            Value::Integer(v) => query.bind(*v),
            Value::Real(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.clone()),
            Value::Null => query.bind(Option::<String>::None),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Ordered `column = value` pairs.
///
/// Used as a conjunction of exact matches when selecting rows, and as the
/// assignment list when patching them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pairs: Vec<(&'static str, Value)>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for the common `id = ?` lookup.
    pub fn by_id(id: i64) -> Self {
        Self::new().eq("id", id)
    }

    /// Add a `column = value` pair.
    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.pairs.push((column, value.into()));
        self
    }

    /// Add a pair only when `value` is present. Handy for partial patches.
    pub fn eq_some<T: Into<Value>>(self, column: &'static str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.eq(column, value),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, Value)> {
        self.pairs.iter()
    }

    /// Reject any column the entity does not declare.
    pub(crate) fn check<E: Entity>(&self) -> Result<()> {
        for (column, _) in &self.pairs {
            if !E::COLUMNS.contains(column) {
                return Err(StoreError::UnknownColumn {
                    table: E::TABLE,
                    column: (*column).to_string(),
                });
            }
        }
        Ok(())
    }

    /// Append ` WHERE a = ? AND b IS NULL` (nothing when empty).
    ///
    /// `Value::Null` matches missing values; `= NULL` is never true in SQL.
    pub(crate) fn push_where(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        for (i, (column, value)) in self.pairs.iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            builder.push(*column);
            if let Value::Null = value {
                builder.push(" IS NULL");
            } else {
                builder.push(" = ");
                value.push_bind(builder);
            }
        }
    }

    /// Append `(a, b) VALUES (?, ?)` for an INSERT, or `DEFAULT VALUES` when empty.
    pub(crate) fn push_insert(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        if self.pairs.is_empty() {
            builder.push(" DEFAULT VALUES");
            return;
        }
        builder.push(" (");
        for (i, (column, _)) in self.pairs.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(*column);
        }
        builder.push(") VALUES (");
        for (i, (_, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            value.push_bind(builder);
        }
        builder.push(")");
    }

    /// Append `a = ?, b = ?` for an UPDATE.
    pub(crate) fn push_assignments(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        for (i, (column, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(*column).push(" = ");
            value.push_bind(builder);
        }
    }
}

/// Column assignments for an INSERT or UPDATE.
pub type Patch = Filters;
