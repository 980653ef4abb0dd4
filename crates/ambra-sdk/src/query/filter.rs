//! Filter and sort expressions.
//!
//! The client only forwards these; the server decides which fields and
//! conditions are valid and reports `INVALID_FIELD`, `INVALID_CONDITION`,
//! `INVALID_SORT_FIELD` or `INVALID_SORT_ORDER` otherwise.

use std::fmt;

use serde_json::Value;

use crate::payload::encode_value;

/// Comparison applied by a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterCondition {
    Equals,
    EqualsOrNull,
    NotEquals,
    Like,
    NotLike,
    Gt,
    Ge,
    Lt,
    Le,
    In,
    InOrNull,
    Null,
    NotNull,
}

impl FilterCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterCondition::Equals => "equals",
            FilterCondition::EqualsOrNull => "equals_or_null",
            FilterCondition::NotEquals => "not_equals",
            FilterCondition::Like => "like",
            FilterCondition::NotLike => "not_like",
            FilterCondition::Gt => "gt",
            FilterCondition::Ge => "ge",
            FilterCondition::Lt => "lt",
            FilterCondition::Le => "le",
            FilterCondition::In => "in",
            FilterCondition::InOrNull => "in_or_null",
            FilterCondition::Null => "null",
            FilterCondition::NotNull => "not_null",
        }
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `field condition value` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    field: String,
    condition: FilterCondition,
    value: Value,
}

impl Filter {
    pub fn new(
        field: impl Into<String>,
        condition: FilterCondition,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            field: field.into(),
            condition,
            value: value.into(),
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterCondition::Equals, value)
    }

    pub fn not_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterCondition::NotEquals, value)
    }

    /// SQL-style pattern match (`%` wildcards).
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(field, FilterCondition::Like, pattern.into())
    }

    /// Field value is one of `values`.
    pub fn is_in<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        Self::new(field, FilterCondition::In, Value::Array(values))
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterCondition::Null, 1)
    }

    pub fn not_null(field: impl Into<String>) -> Self {
        Self::new(field, FilterCondition::NotNull, 1)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn condition(&self) -> FilterCondition {
        self.condition
    }

    /// Wire parameter: `filter.{field}.{condition}`.
    pub fn to_param(&self) -> (String, String) {
        (
            format!("filter.{}.{}", self.field, self.condition),
            encode_value(&self.value).unwrap_or_default(),
        )
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Sort by one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sorter {
    field: String,
    order: SortOrder,
}

impl Sorter {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Desc)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Term inside `sort_by`; descending fields carry a `-` prefix.
    pub fn to_term(&self) -> String {
        match self.order {
            SortOrder::Asc => self.field.clone(),
            SortOrder::Desc => format!("-{}", self.field),
        }
    }
}

/// Join sort terms into the `sort_by` value.
pub(crate) fn sort_param(sorting: &[Sorter]) -> Option<(String, String)> {
    if sorting.is_empty() {
        return None;
    }
    let terms: Vec<String> = sorting.iter().map(Sorter::to_term).collect();
    Some(("sort_by".to_string(), terms.join(",")))
}
