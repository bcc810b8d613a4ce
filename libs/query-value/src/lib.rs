mod error;

use indexmap::IndexMap;
use serde::Serialize;
use std::{convert::TryFrom, fmt};

pub use error::ConversionFailure;

pub type ValueResult<T> = std::result::Result<T, ConversionFailure>;
pub type ListValue = Vec<QueryValue>;

/// A `key -> value` map with stable insertion order.
pub type ObjectValue = IndexMap<String, QueryValue>;

/// The runtime value algebra: everything the engine reads from or writes to
/// a store, and everything an operation can return.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(ListValue),
    Object(ObjectValue),
}

impl QueryValue {
    pub fn object<I>(pairs: I) -> QueryValue
    where
        I: IntoIterator<Item = (String, QueryValue)>,
    {
        QueryValue::Object(pairs.into_iter().collect())
    }

    pub fn list<I>(values: I) -> QueryValue
    where
        I: IntoIterator<Item = QueryValue>,
    {
        QueryValue::List(values.into_iter().collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, QueryValue::Null)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, QueryValue::Object(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, QueryValue::List(_))
    }

    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            QueryValue::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[QueryValue]> {
        match self {
            QueryValue::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            QueryValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            QueryValue::Null => "null",
            QueryValue::Boolean(_) => "boolean",
            QueryValue::Int(_) => "int",
            QueryValue::Float(_) => "float",
            QueryValue::String(_) => "string",
            QueryValue::List(_) => "list",
            QueryValue::Object(_) => "object",
        }
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl From<bool> for QueryValue {
    fn from(b: bool) -> Self {
        QueryValue::Boolean(b)
    }
}

impl From<i64> for QueryValue {
    fn from(i: i64) -> Self {
        QueryValue::Int(i)
    }
}

impl From<f64> for QueryValue {
    fn from(f: f64) -> Self {
        QueryValue::Float(f)
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::String(s.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        QueryValue::String(s)
    }
}

impl From<Vec<QueryValue>> for QueryValue {
    fn from(values: Vec<QueryValue>) -> Self {
        QueryValue::List(values)
    }
}

impl TryFrom<serde_json::Value> for QueryValue {
    type Error = ConversionFailure;

    fn try_from(v: serde_json::Value) -> ValueResult<Self> {
        match v {
            serde_json::Value::Null => Ok(QueryValue::Null),
            serde_json::Value::Bool(b) => Ok(QueryValue::Boolean(b)),
            serde_json::Value::String(s) => Ok(QueryValue::String(s)),
            serde_json::Value::Number(num) => {
                if let Some(i) = num.as_i64() {
                    Ok(QueryValue::Int(i))
                } else if let Some(f) = num.as_f64() {
                    Ok(QueryValue::Float(f))
                } else {
                    Err(ConversionFailure::new("JSON number", "QueryValue"))
                }
            }
            serde_json::Value::Array(values) => {
                let values: ValueResult<Vec<_>> = values.into_iter().map(QueryValue::try_from).collect();
                Ok(QueryValue::List(values?))
            }
            serde_json::Value::Object(object) => {
                let pairs: ValueResult<ObjectValue> = object
                    .into_iter()
                    .map(|(k, v)| Ok((k, QueryValue::try_from(v)?)))
                    .collect();
                Ok(QueryValue::Object(pairs?))
            }
        }
    }
}

impl From<QueryValue> for serde_json::Value {
    fn from(value: QueryValue) -> Self {
        match value {
            QueryValue::Null => serde_json::Value::Null,
            QueryValue::Boolean(b) => serde_json::Value::Bool(b),
            QueryValue::Int(i) => serde_json::Value::from(i),
            QueryValue::Float(f) => serde_json::Value::from(f),
            QueryValue::String(s) => serde_json::Value::String(s),
            QueryValue::List(values) => serde_json::Value::Array(values.into_iter().map(Into::into).collect()),
            QueryValue::Object(object) => {
                serde_json::Value::Object(object.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}
