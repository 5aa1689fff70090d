//! Dynamic values for positional query arguments.
//!
//! A streaming request carries its arguments as [`SqlValue`]s so the cursor
//! declaration can be bound without knowing the argument types up front.

use sqlx::Postgres;
use sqlx::postgres::PgArguments;
use uuid::Uuid;

/// Dynamic value type for positional argument bindings.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL NULL. Bound as a text-typed null; a parameter position that is
    /// not text-compatible needs an explicit cast in the query, e.g.
    /// `$1::BIGINT`.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
}

impl SqlValue {
    /// Bind this value to a query, preserving its SQL type.
    pub(crate) fn bind_to<'q>(
        &self,
        query: sqlx::query::Query<'q, Postgres, PgArguments>,
    ) -> sqlx::query::Query<'q, Postgres, PgArguments> {
        match self {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Bool(v) => query.bind(*v),
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Float(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.clone()),
            SqlValue::Uuid(v) => query.bind(*v),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v as i64)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        SqlValue::Uuid(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => SqlValue::Null,
        }
    }
}

/// Rewrite `?` placeholders into PostgreSQL `$1..$n` placeholders.
///
/// Question marks inside single-quoted string literals are left alone.
/// Queries already written with `$n` placeholders pass through unchanged.
pub fn rebind(query: &str) -> String {
    let mut out = String::with_capacity(query.len() + 8);
    let mut next = 0usize;
    let mut in_string = false;
    for c in query.chars() {
        match c {
            '\'' => {
                in_string = !in_string;
                out.push(c);
            }
            '?' if !in_string => {
                next += 1;
                out.push('$');
                out.push_str(&next.to_string());
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rebind_rewrites_question_marks() {
        assert_eq!(
            rebind("SELECT id FROM users WHERE active = ? AND org = ?"),
            "SELECT id FROM users WHERE active = $1 AND org = $2"
        );
    }

    #[test]
    fn rebind_skips_string_literals() {
        assert_eq!(
            rebind("SELECT '?' AS q FROM t WHERE n = ?"),
            "SELECT '?' AS q FROM t WHERE n = $1"
        );
    }

    #[test]
    fn rebind_leaves_dollar_placeholders_untouched() {
        let query = "SELECT id FROM users WHERE active = $1";
        assert_eq!(rebind(query), query);
    }

    #[test]
    fn value_conversions() {
        assert_eq!(SqlValue::from(true), SqlValue::Bool(true));
        assert_eq!(SqlValue::from(42i32), SqlValue::Int(42));
        assert_eq!(SqlValue::from("hello"), SqlValue::Text("hello".into()));
        assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(7i64)), SqlValue::Int(7));
    }
}
