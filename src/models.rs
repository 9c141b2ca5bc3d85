// src/models.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString};
use validator::Validate;

/// Typ kolumny w bazie, nazwy jak w mapie tabel ORM-a.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, EnumString, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ColumnType {
    Char,
    Varchar,
    LongVarchar,
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Float,
    Double,
    Numeric,
    Decimal,
    Date,
    Time,
    Timestamp,
}

/// Rodzaj wyszukiwania zaawansowanego dla danej kolumny.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    DateRange,
    NumberRange,
    Substring,
}

impl ColumnType {
    pub fn search_kind(&self) -> SearchKind {
        match self {
            ColumnType::Date | ColumnType::Timestamp => SearchKind::DateRange,
            ColumnType::TinyInt
            | ColumnType::SmallInt
            | ColumnType::Integer
            | ColumnType::BigInt
            | ColumnType::Real
            | ColumnType::Float
            | ColumnType::Double
            | ColumnType::Numeric
            | ColumnType::Decimal => SearchKind::NumberRange,
            _ => SearchKind::Substring,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(
            self,
            ColumnType::Char | ColumnType::Varchar | ColumnType::LongVarchar
        )
    }

    /// Typ SQL, na który rzutujemy kolumnę w SELECT, żeby odczyt wiersza
    /// był jednoznaczny.
    pub fn select_cast(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::TinyInt | ColumnType::SmallInt | ColumnType::Integer | ColumnType::BigInt => {
                "BIGINT"
            }
            ColumnType::Real
            | ColumnType::Float
            | ColumnType::Double
            | ColumnType::Numeric
            | ColumnType::Decimal => "DOUBLE PRECISION",
            ColumnType::Date => "DATE",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Char | ColumnType::Varchar | ColumnType::LongVarchar | ColumnType::Time => {
                "TEXT"
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ColumnMap {
    /// Nazwa właściwości modelu, np. `TrackTitle`
    #[validate(length(min = 1))]
    pub property: String,
    /// Nazwa pola w tabeli, np. `track_title`
    #[validate(length(min = 1))]
    pub field: String,
    pub column_type: ColumnType,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TableMap {
    #[validate(length(min = 1))]
    pub model: String,
    #[validate(length(min = 1))]
    pub table: String,
    #[validate(nested)]
    pub columns: Vec<ColumnMap>,
}

impl TableMap {
    pub fn column(&self, property: &str) -> Option<&ColumnMap> {
        self.columns.iter().find(|c| c.property == property)
    }
}

/// Zapytanie bazowe: każdy model w klauzuli FROM musi mieć alias
/// równy nazwie modelu, np. `cc_files AS "AudioFile"`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ModelQuery {
    #[validate(length(min = 1))]
    pub model: String,
    #[validate(length(min = 1))]
    pub from: String,
    #[serde(default)]
    pub filter: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ColumnInfo {
    #[validate(length(min = 1))]
    pub prop: String,
    pub title: String,
    #[serde(default = "default_true")]
    pub sortable: bool,
    #[serde(default = "default_true")]
    pub searchable: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub width: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub advanced_search: Option<Value>,
    /// Kolumna wyliczana (alias); wyrażenie SQL oparte o aliasy modeli
    #[serde(default)]
    pub expression: Option<String>,
    /// Typ kolumny wyliczanej; bez niego wartość czytamy jako tekst
    #[serde(default)]
    pub column_type: Option<ColumnType>,
}

impl ColumnInfo {
    pub fn is_alias(&self) -> bool {
        self.expression.is_some()
    }
}

/// Kolumna rozwiązana przez mapę tabel.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumn {
    pub column_type: ColumnType,
    pub column: String,
}
