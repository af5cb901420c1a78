//! Filter predicates and patch documents for the generic repository.
//!
//! A [`Filter`] is a conjunction of field/operator/value clauses selecting a
//! subset of records; a [`Document`] is an ordered field-to-value payload used
//! for inserts and patches. Both render to SQL fragments with numbered bind
//! placeholders. Field names come from code; values are always bound, never
//! interpolated.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A value bound into a store query.
///
/// `Null` renders as a SQL literal rather than a bound parameter, so it never
/// needs a concrete wire type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Bool(bool),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Value {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Value {
        Value::Int(v as i64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        Value::Bool(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Value {
        Value::Uuid(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Value {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Value {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

/// Comparison operator of a filter clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Op {
    fn as_sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "<>",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Gt => ">",
            Op::Gte => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Clause {
    field: &'static str,
    op: Op,
    value: Value,
}

/// A predicate selecting records by field values, combined with AND.
///
/// An empty filter matches every record in the collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    pub fn new() -> Filter {
        Filter::default()
    }

    pub fn eq(self, field: &'static str, value: impl Into<Value>) -> Filter {
        self.clause(field, Op::Eq, value)
    }

    pub fn ne(self, field: &'static str, value: impl Into<Value>) -> Filter {
        self.clause(field, Op::Ne, value)
    }

    pub fn lt(self, field: &'static str, value: impl Into<Value>) -> Filter {
        self.clause(field, Op::Lt, value)
    }

    pub fn lte(self, field: &'static str, value: impl Into<Value>) -> Filter {
        self.clause(field, Op::Lte, value)
    }

    pub fn gt(self, field: &'static str, value: impl Into<Value>) -> Filter {
        self.clause(field, Op::Gt, value)
    }

    pub fn gte(self, field: &'static str, value: impl Into<Value>) -> Filter {
        self.clause(field, Op::Gte, value)
    }

    fn clause(mut self, field: &'static str, op: Op, value: impl Into<Value>) -> Filter {
        self.clauses.push(Clause {
            field,
            op,
            value: value.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Renders the `WHERE ...` fragment, numbering bind placeholders from
    /// `first_param`. Returns an empty string for an empty filter.
    ///
    /// `eq NULL` renders as `IS NULL` and `ne NULL` as `IS NOT NULL`; ordered
    /// comparisons against an absent value can never match and render `FALSE`.
    /// Placeholder numbering matches [`Filter::params`] exactly: null values
    /// consume no placeholder.
    pub fn where_clause(&self, first_param: usize) -> String {
        if self.clauses.is_empty() {
            return String::new();
        }

        let mut param = first_param;
        let parts: Vec<String> = self
            .clauses
            .iter()
            .map(|clause| match (&clause.op, &clause.value) {
                (Op::Eq, Value::Null) => format!("{} IS NULL", clause.field),
                (Op::Ne, Value::Null) => format!("{} IS NOT NULL", clause.field),
                (_, Value::Null) => "FALSE".to_string(),
                (op, _) => {
                    let part = format!("{} {} ${}", clause.field, op.as_sql(), param);
                    param += 1;
                    part
                }
            })
            .collect();

        format!("WHERE {}", parts.join(" AND "))
    }

    /// The values to bind, in placeholder order. Null clauses are rendered as
    /// literals and therefore contribute nothing here.
    pub fn params(&self) -> impl Iterator<Item = &Value> {
        self.clauses
            .iter()
            .map(|clause| &clause.value)
            .filter(|value| !value.is_null())
    }

    /// Number of bind placeholders consumed by [`Filter::where_clause`].
    pub fn param_count(&self) -> usize {
        self.params().count()
    }
}

/// An ordered field-to-value payload for inserts and patches.
///
/// Setting a field that is already present replaces its value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: Vec<(&'static str, Value)>,
}

impl Document {
    pub fn new() -> Document {
        Document::default()
    }

    pub fn set(mut self, field: &'static str, value: impl Into<Value>) -> Document {
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    /// The values to bind, in placeholder order, excluding nulls (which render
    /// as SQL literals).
    pub fn params(&self) -> impl Iterator<Item = &Value> {
        self.fields
            .iter()
            .map(|(_, value)| value)
            .filter(|value| !value.is_null())
    }

    pub fn param_count(&self) -> usize {
        self.params().count()
    }

    /// Renders the column list and placeholder list of an `INSERT`, numbering
    /// placeholders from 1. Null fields become literal `NULL`s.
    pub(crate) fn insert_lists(&self) -> (String, String) {
        let columns: Vec<&str> = self.fields.iter().map(|(name, _)| *name).collect();
        let mut param = 1;
        let placeholders: Vec<String> = self
            .fields
            .iter()
            .map(|(_, value)| {
                if value.is_null() {
                    "NULL".to_string()
                } else {
                    let placeholder = format!("${}", param);
                    param += 1;
                    placeholder
                }
            })
            .collect();
        (columns.join(", "), placeholders.join(", "))
    }

    /// Renders the `SET` assignments of an `UPDATE`, numbering placeholders
    /// from 1. Null fields become literal `NULL` assignments.
    pub(crate) fn set_clause(&self) -> String {
        let mut param = 1;
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(name, value)| {
                if value.is_null() {
                    format!("{} = NULL", name)
                } else {
                    let part = format!("{} = ${}", name, param);
                    param += 1;
                    part
                }
            })
            .collect();
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_filter_renders_nothing() {
        let filter = Filter::new();
        assert_eq!(filter.where_clause(1), "");
        assert_eq!(filter.param_count(), 0);
    }

    #[test]
    fn test_filter_rendering_and_numbering() {
        let filter = Filter::new()
            .eq("status", "pending")
            .gte("priority", "low")
            .ne("assigned_to", Value::Null);
        assert_eq!(
            filter.where_clause(1),
            "WHERE status = $1 AND priority >= $2 AND assigned_to IS NOT NULL"
        );
        assert_eq!(filter.param_count(), 2);

        // The fragment can be re-rendered at an offset without rebinding.
        assert_eq!(
            filter.where_clause(4),
            "WHERE status = $4 AND priority >= $5 AND assigned_to IS NOT NULL"
        );
    }

    #[test]
    fn test_null_equality_renders_is_null() {
        let filter = Filter::new().eq("assigned_to", Value::Null);
        assert_eq!(filter.where_clause(1), "WHERE assigned_to IS NULL");
        assert_eq!(filter.param_count(), 0);
    }

    #[test]
    fn test_ordered_comparison_against_null_matches_nothing() {
        let filter = Filter::new().lt("created_at", Value::Null).eq("title", "x");
        assert_eq!(filter.where_clause(1), "WHERE FALSE AND title = $1");
        assert_eq!(filter.param_count(), 1);
    }

    #[test]
    fn test_option_values_become_null() {
        let filter = Filter::new().eq("assigned_to", Option::<Uuid>::None);
        assert_eq!(filter.where_clause(1), "WHERE assigned_to IS NULL");
    }

    #[test]
    fn test_document_set_replaces_existing_field() {
        let doc = Document::new()
            .set("title", "first")
            .set("status", "pending")
            .set("title", "second");
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.get("title"), Some(&Value::Text("second".into())));
    }

    #[test]
    fn test_document_insert_lists() {
        let doc = Document::new()
            .set("title", "Write report")
            .set("description", Value::Null)
            .set("created_by", Uuid::nil());
        let (columns, placeholders) = doc.insert_lists();
        assert_eq!(columns, "title, description, created_by");
        assert_eq!(placeholders, "$1, NULL, $2");
        assert_eq!(doc.param_count(), 2);
    }

    #[test]
    fn test_document_set_clause() {
        let doc = Document::new()
            .set("title", "Renamed")
            .set("assigned_to", Value::Null);
        assert_eq!(doc.set_clause(), "title = $1, assigned_to = NULL");
    }
}
