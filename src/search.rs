// src/search.rs
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::{Postgres, QueryBuilder};

use crate::date_helper::DateHelper;
use crate::models::ColumnType;

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("poprawne wyrażenie regularne"));

/// Wartość przekazywana do zapytania jako parametr (`push_bind`).
#[derive(Debug, Clone, PartialEq)]
pub enum SearchValue {
    Number(f64),
    Timestamp(NaiveDateTime),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    GreaterOrEqual,
    LessOrEqual,
    ILike,
}

impl Comparison {
    fn as_sql(&self) -> &'static str {
        match self {
            Comparison::GreaterOrEqual => " >= ",
            Comparison::LessOrEqual => " <= ",
            Comparison::ILike => " ILIKE ",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub comparison: Comparison,
    pub value: SearchValue,
}

impl Condition {
    fn push_to(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(&self.column).push(self.comparison.as_sql());
        match &self.value {
            SearchValue::Number(n) => builder.push_bind(*n),
            SearchValue::Timestamp(ts) => builder.push_bind(*ts),
            SearchValue::Text(text) => builder.push_bind(text.clone()),
        };
    }
}

/// Warunki wyszukiwania jednej kolumny, łączone przez AND.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub conditions: Vec<Condition>,
}

impl ColumnFilter {
    pub fn push_to(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        if let [single] = self.conditions.as_slice() {
            single.push_to(builder);
            return;
        }
        builder.push("(");
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                builder.push(" AND ");
            }
            condition.push_to(builder);
        }
        builder.push(")");
    }
}

fn range(column: &str, from: Option<SearchValue>, to: Option<SearchValue>) -> Option<ColumnFilter> {
    let conditions: Vec<Condition> = [
        from.map(|value| Condition {
            column: column.to_string(),
            comparison: Comparison::GreaterOrEqual,
            value,
        }),
        to.map(|value| Condition {
            column: column.to_string(),
            comparison: Comparison::LessOrEqual,
            value,
        }),
    ]
    .into_iter()
    .flatten()
    .collect();

    (!conditions.is_empty()).then_some(ColumnFilter { conditions })
}

fn numeric(value: Option<&str>) -> Option<SearchValue> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .map(SearchValue::Number)
}

pub fn search_number(column: &str, from: Option<&str>, to: Option<&str>) -> Option<ColumnFilter> {
    range(column, numeric(from), numeric(to))
}

pub fn search_string(column: &str, value: &str, column_type: ColumnType) -> ColumnFilter {
    let column = if column_type.is_text() {
        column.to_string()
    } else {
        format!("CAST({} AS TEXT)", column)
    };
    ColumnFilter {
        conditions: vec![Condition {
            column,
            comparison: Comparison::ILike,
            value: SearchValue::Text(format!("%{}%", value)),
        }],
    }
}

pub fn search_date(
    column: &str,
    from: Option<&str>,
    to: Option<&str>,
    date_helper: &DateHelper,
) -> Option<ColumnFilter> {
    let bound = |value: Option<&str>| -> Option<SearchValue> {
        let value = value.filter(|v| DATE_PATTERN.is_match(v))?;
        match date_helper.user_timezone_string_to_utc(value) {
            Some(utc) => Some(SearchValue::Timestamp(utc)),
            None => {
                tracing::warn!("Pomijam nieczytelną datę '{}' dla kolumny {}", value, column);
                None
            }
        }
    };
    range(column, bound(from), bound(to))
}
