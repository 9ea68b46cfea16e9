//! Filter and ordering translation to SQL
//!
//! Filters render as parameterized WHERE fragments; field names are
//! validated against the record's column whitelist before any SQL is
//! assembled, so unknown fields fail at the contract boundary with
//! `ERR_INVALID_ARGUMENT` and never reach the store.

use rusqlite::types::Value;
use tessera_errors::{invalid_argument, DataResult};
use tessera_repository::{Filter, Scalar, Sort};

use crate::record::{is_column, SqlRecord};

pub(crate) fn scalar_value(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::Null => Value::Null,
        Scalar::Bool(b) => Value::Integer(i64::from(*b)),
        Scalar::Int(i) => Value::Integer(*i),
        Scalar::Float(f) => Value::Real(*f),
        Scalar::Text(t) => Value::Text(t.clone()),
    }
}

/// Render `filter` as a WHERE fragment plus its positional parameters.
///
/// Returns `None` for a match-all predicate so callers can omit the
/// WHERE clause entirely.
pub(crate) fn where_clause<R: SqlRecord>(
    op: &str,
    filter: &Filter,
) -> DataResult<Option<(String, Vec<Value>)>> {
    match filter {
        Filter::All => Ok(None),
        _ => {
            let mut params = Vec::new();
            let fragment = render::<R>(op, filter, &mut params)?;
            Ok(Some((fragment, params)))
        }
    }
}

fn render<R: SqlRecord>(
    op: &str,
    filter: &Filter,
    params: &mut Vec<Value>,
) -> DataResult<String> {
    match filter {
        Filter::All => Ok("1 = 1".to_string()),
        Filter::Eq(field, Scalar::Null) => {
            check_field::<R>(op, field)?;
            Ok(format!("{} IS NULL", field))
        }
        Filter::Ne(field, Scalar::Null) => {
            check_field::<R>(op, field)?;
            Ok(format!("{} IS NOT NULL", field))
        }
        Filter::Eq(field, scalar) => comparison::<R>(op, field, "=", scalar, params),
        Filter::Ne(field, scalar) => comparison::<R>(op, field, "<>", scalar, params),
        Filter::Gt(field, scalar) => comparison::<R>(op, field, ">", scalar, params),
        Filter::Gte(field, scalar) => comparison::<R>(op, field, ">=", scalar, params),
        Filter::Lt(field, scalar) => comparison::<R>(op, field, "<", scalar, params),
        Filter::Lte(field, scalar) => comparison::<R>(op, field, "<=", scalar, params),
        Filter::Like(field, pattern) => {
            check_field::<R>(op, field)?;
            params.push(Value::Text(pattern.clone()));
            Ok(format!("{} LIKE ?", field))
        }
        Filter::And(parts) if parts.is_empty() => Ok("1 = 1".to_string()),
        Filter::Or(parts) if parts.is_empty() => Ok("1 = 0".to_string()),
        Filter::And(parts) => composite::<R>(op, parts, " AND ", params),
        Filter::Or(parts) => composite::<R>(op, parts, " OR ", params),
        Filter::Not(inner) => {
            let rendered = render::<R>(op, inner, params)?;
            Ok(format!("NOT ({})", rendered))
        }
    }
}

fn comparison<R: SqlRecord>(
    op: &str,
    field: &str,
    operator: &str,
    scalar: &Scalar,
    params: &mut Vec<Value>,
) -> DataResult<String> {
    check_field::<R>(op, field)?;
    if matches!(scalar, Scalar::Null) {
        return Err(invalid_argument(
            op,
            format!("cannot order-compare field '{}' against null", field),
        ));
    }
    params.push(scalar_value(scalar));
    Ok(format!("{} {} ?", field, operator))
}

fn composite<R: SqlRecord>(
    op: &str,
    parts: &[Filter],
    joiner: &str,
    params: &mut Vec<Value>,
) -> DataResult<String> {
    let rendered = parts
        .iter()
        .map(|part| render::<R>(op, part, params).map(|sql| format!("({})", sql)))
        .collect::<DataResult<Vec<_>>>()?;
    Ok(rendered.join(joiner))
}

fn check_field<R: SqlRecord>(op: &str, field: &str) -> DataResult<()> {
    if is_column::<R>(field) {
        Ok(())
    } else {
        Err(invalid_argument(
            op,
            format!(
                "field '{}' is not a column of {} and cannot be pushed down",
                field,
                R::TABLE
            ),
        ))
    }
}

/// Render the ORDER BY clause for a paged or full query.
///
/// The key column is always appended as a stable tiebreak, so paging
/// without an explicit sort cannot duplicate or skip rows under a
/// single writer.
pub(crate) fn order_clause<R: SqlRecord>(op: &str, sort: Option<&Sort>) -> DataResult<String> {
    match sort {
        None => Ok(format!("ORDER BY {} ASC", R::KEY_COLUMN)),
        Some(sort) => {
            check_field::<R>(op, &sort.field)?;
            let direction = if sort.ascending { "ASC" } else { "DESC" };
            if sort.field == R::KEY_COLUMN {
                Ok(format!("ORDER BY {} {}", sort.field, direction))
            } else {
                Ok(format!(
                    "ORDER BY {} {}, {} ASC",
                    sort.field,
                    direction,
                    R::KEY_COLUMN
                ))
            }
        }
    }
}
