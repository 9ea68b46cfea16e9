//! Portable predicate and ordering representation
//!
//! Filters are a small data AST over `(field, scalar)` leaves. They are
//! store-neutral: the SQLite adapter renders them as parameterized SQL,
//! the document adapter as filter documents. An adapter that cannot
//! evaluate a construct server-side rejects it with
//! `ERR_INVALID_ARGUMENT` instead of evaluating client-side.

/// Scalar comparison operand
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

/// Predicate over entity fields, evaluated by the store
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every entity
    All,
    Eq(String, Scalar),
    Ne(String, Scalar),
    Gt(String, Scalar),
    Gte(String, Scalar),
    Lt(String, Scalar),
    Lte(String, Scalar),
    /// SQL LIKE-style pattern over a text field. Not every store can
    /// evaluate this server-side; adapters without an equivalent reject
    /// it.
    Like(String, String),
    /// Conjunction; an empty list matches everything
    And(Vec<Filter>),
    /// Disjunction; an empty list matches nothing
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Filter::Ne(field.into(), value.into())
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Filter::Gt(field.into(), value.into())
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Filter::Gte(field.into(), value.into())
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Filter::Lt(field.into(), value.into())
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Filter::Lte(field.into(), value.into())
    }

    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Filter::Like(field.into(), pattern.into())
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::And(filters)
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Or(filters)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(filter: Filter) -> Self {
        Filter::Not(Box::new(filter))
    }
}

/// Ordering key for paged queries
///
/// When absent, store-default order applies; adapters still add a
/// stable identity tiebreak so close-in-time page requests do not
/// duplicate or skip rows under a single writer.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub field: String,
    pub ascending: bool,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: true,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_produce_expected_shapes() {
        let f = Filter::and(vec![
            Filter::eq("active", true),
            Filter::gt("age", 18),
            Filter::like("name", "A%"),
        ]);
        match f {
            Filter::And(parts) => {
                assert_eq!(parts.len(), 3);
                assert_eq!(parts[0], Filter::Eq("active".into(), Scalar::Bool(true)));
                assert_eq!(parts[1], Filter::Gt("age".into(), Scalar::Int(18)));
            }
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(Scalar::from("x"), Scalar::Text("x".to_string()));
        assert_eq!(Scalar::from(3i32), Scalar::Int(3));
        assert_eq!(Scalar::from(2.5), Scalar::Float(2.5));
    }

    #[test]
    fn test_sort_direction() {
        assert!(Sort::asc("id").ascending);
        assert!(!Sort::desc("id").ascending);
    }
}
