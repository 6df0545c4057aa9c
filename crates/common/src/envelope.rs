//! Uniform response envelope shared by every endpoint

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// `{success: true, data}` on success, `{success: false, code, message}` on failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            code: None,
            message: None,
        }
    }

    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            code: Some(code.into()),
            message: Some(message.into()),
        }
    }
}

impl<T> From<&Error> for Envelope<T> {
    fn from(err: &Error) -> Self {
        Envelope::failure(err.code(), err.to_string())
    }
}
