//! Scalar cell values flowing through the pipelines

use chrono::{NaiveDate, NaiveDateTime};

/// A single cell read from a workbook, CSV file or query result
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Empty cell / SQL NULL
    #[default]
    Null,
    /// Text value
    Text(String),
    /// Whole number
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Date and time without a timezone
    DateTime(NaiveDateTime),
}

impl Value {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as float (integers widen)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as date/time
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Key used for exact-duplicate detection.
    ///
    /// Every variant is distinct and floats compare by bit pattern.
    pub fn exact_key(&self) -> ExactKey {
        match self {
            Value::Null => ExactKey::Null,
            Value::Text(s) => ExactKey::Text(s.clone()),
            Value::Int(i) => ExactKey::Int(*i),
            Value::Float(f) => ExactKey::Float(f.to_bits()),
            Value::Bool(b) => ExactKey::Bool(*b),
            Value::DateTime(dt) => ExactKey::DateTime(*dt),
        }
    }

    /// Key used to match rows across datasets in a join.
    ///
    /// Integral floats collapse onto the equal integer so a spreadsheet `1.0`
    /// matches a database `1`. Null never matches anything.
    pub fn join_key(&self) -> Option<ExactKey> {
        match self {
            Value::Null => None,
            Value::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Some(ExactKey::Int(*f as i64))
            }
            other => Some(other.exact_key()),
        }
    }

    /// Label used when the value becomes a pivot/summary dimension
    pub fn label(&self) -> String {
        match self {
            Value::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
            other => other.to_string(),
        }
    }

    /// Infer a typed value from raw text (CSV cells, ISO cells)
    pub fn infer(raw: &str) -> Value {
        let s = raw.trim();

        if s.is_empty() {
            return Value::Null;
        }

        match s.to_lowercase().as_str() {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }

        if let Ok(i) = s.parse::<i64>() {
            return Value::Int(i);
        }

        if let Ok(f) = s.parse::<f64>() {
            return Value::Float(f);
        }

        Value::Text(s.to_string())
    }
}

/// Hashable identity of a [`Value`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExactKey {
    Null,
    Text(String),
    Int(i64),
    Float(u64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Text(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Bool(b) => write!(f, "{}", b),
            Value::DateTime(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    write!(f, "{}", dt.date())
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
                }
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::DateTime(d.and_time(chrono::NaiveTime::MIN))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
