use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute payload of a backend block or a remote state `config` object
pub type Attributes = BTreeMap<String, AttrValue>;

/// Parser-independent value of a configuration attribute.
///
/// Only literals are evaluated. Anything that needs Terraform to evaluate it
/// (interpolations, variables, function calls) is kept as source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttrValue {
    Null,
    Bool(bool),
    /// Numbers keep their source representation
    Number(String),
    String(String),
    List(Vec<AttrValue>),
    Object(Attributes),
    /// Unevaluated expression
    Expression(String),
}

impl AttrValue {
    /// Short name of the value shape, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            AttrValue::Null => "null",
            AttrValue::Bool(_) => "bool",
            AttrValue::Number(_) => "number",
            AttrValue::String(_) => "string",
            AttrValue::List(_) => "list",
            AttrValue::Object(_) => "object",
            AttrValue::Expression(_) => "expression",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(value) => Some(*value),
            AttrValue::String(value) => match value.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Attributes> {
        match self {
            AttrValue::Object(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// Description of the value for diagnostics: its shape, plus the text of expressions
    pub fn describe(&self) -> String {
        match self {
            AttrValue::Expression(source) => format!("expression `{source}`"),
            other => other.kind().to_string(),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::String(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}
