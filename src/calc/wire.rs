use crate::calc::bindings::VariableBindings;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body posted to `{api_url}/calculate`.
#[derive(Debug, Serialize)]
pub struct CalculateRequest<'a> {
    pub image: &'a str,
    pub dict_of_vars: &'a VariableBindings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CalculateResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    pub data: Vec<ResultEntry>,
}

/// One item of the service's `data` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub expr: String,
    #[serde(deserialize_with = "loose_string")]
    pub result: String,
    #[serde(default)]
    pub assign: bool,
}

impl ResultEntry {
    pub fn new(expr: impl Into<String>, result: impl Into<String>, assign: bool) -> Self {
        Self {
            expr: expr.into(),
            result: result.into(),
            assign,
        }
    }

    /// The displayable form of this entry. Assignments never display.
    pub fn display(&self) -> Option<DisplayResult> {
        if self.assign {
            return None;
        }
        Some(DisplayResult {
            expression: self.expr.clone(),
            answer: self.result.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayResult {
    pub expression: String,
    pub answer: String,
}

// The evaluator sometimes answers with bare numbers.
fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}
