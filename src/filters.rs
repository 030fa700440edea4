//! Conjunctive filters built from sparse query objects.
//!
//! A query object is a list of `(column, value)` pairs where absent fields have
//! already been dropped. Text values become substring matches, integers become
//! exact matches, and every clause is joined with `AND`.

use sqlx::{Postgres, QueryBuilder};

/// A scalar filter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Number(i64),
}

impl FilterValue {
    /// Empty text and zero count as falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            FilterValue::Text(text) => !text.is_empty(),
            FilterValue::Number(n) => *n != 0,
        }
    }
}

impl From<String> for FilterValue {
    fn from(text: String) -> Self {
        FilterValue::Text(text)
    }
}

impl From<&str> for FilterValue {
    fn from(text: &str) -> Self {
        FilterValue::Text(text.to_string())
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        FilterValue::Number(i64::from(n))
    }
}

/// How a single column is compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `column LIKE '%value%'`
    Contains(String),
    /// `column = value`
    Equals(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub column: &'static str,
    pub condition: Condition,
}

/// A field value as read from an in-memory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRef<'a> {
    Text(&'a str),
    Number(i64),
}

/// Records that a [`Predicate`] can be evaluated against without a database.
pub trait Filterable {
    /// Returns `None` when the record has no such column.
    fn field(&self, column: &str) -> Option<FieldRef<'_>>;
}

/// An `AND` of clauses. An empty predicate matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Appends ` AND <clause>` for every clause, binding values as parameters.
    ///
    /// The builder is expected to already hold a `WHERE` with at least one condition.
    pub fn push_sql(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        for clause in &self.clauses {
            builder.push(" AND ");
            builder.push(clause.column);
            match &clause.condition {
                Condition::Contains(text) => {
                    builder.push(" LIKE ");
                    builder.push_bind(format!("%{}%", text));
                }
                Condition::Equals(n) => {
                    builder.push(" = ");
                    builder.push_bind(*n);
                }
            }
        }
    }

    /// Evaluates the predicate against an in-memory record. Unknown columns never match.
    pub fn matches<T: Filterable>(&self, record: &T) -> bool {
        self.clauses.iter().all(|clause| {
            match (record.field(clause.column), &clause.condition) {
                (Some(FieldRef::Text(value)), Condition::Contains(needle)) => {
                    value.contains(needle.as_str())
                }
                (Some(FieldRef::Number(value)), Condition::Contains(needle)) => {
                    value.to_string().contains(needle.as_str())
                }
                (Some(FieldRef::Text(value)), Condition::Equals(n)) => value == n.to_string(),
                (Some(FieldRef::Number(value)), Condition::Equals(n)) => value == *n,
                (None, _) => false,
            }
        })
    }
}

/// Builds a conjunctive predicate from a sparse query object.
///
/// A field is kept when its value is truthy, or when it is falsy but listed in
/// `accept_falsy`. Fields in `ignore` are always dropped. Clause order follows
/// the input order.
pub fn build_filters(
    filters: Vec<(&'static str, FilterValue)>,
    ignore: &[&str],
    accept_falsy: &[&str],
) -> Predicate {
    let clauses = filters
        .into_iter()
        .filter(|(column, value)| {
            !ignore.contains(column) && (value.is_truthy() || accept_falsy.contains(column))
        })
        .map(|(column, value)| Clause {
            column,
            condition: match value {
                FilterValue::Text(text) => Condition::Contains(text),
                FilterValue::Number(n) => Condition::Equals(n),
            },
        })
        .collect();

    Predicate { clauses }
}
