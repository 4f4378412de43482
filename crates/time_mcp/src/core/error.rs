use rmcp::ErrorData as McpError;
use rmcp::serde_json::json;

use crate::core::utils::AVAILABLE_RESOURCES;

// Error codes
const ERROR_INVALID_TIME_INPUT: &str = "invalid_time_input";
const ERROR_INVALID_TIMEZONE: &str = "invalid_timezone";
const ERROR_INVALID_FORMAT_PATTERN: &str = "invalid_format_pattern";
const ERROR_MISSING_REQUIRED_INPUT: &str = "missing_required_input";
const ERROR_RESOURCE_NOT_FOUND: &str = "resource_not_found";

/// Custom error types for better error handling
#[derive(Debug, thiserror::Error)]
pub enum TimeServerError {
    #[error("Invalid time input: {input}")]
    InvalidTimeInput { input: String },
    #[error("Invalid timezone: {timezone}")]
    InvalidTimezone { timezone: String },
    #[error("Invalid format pattern: {pattern}")]
    InvalidFormatPattern { pattern: String },
    #[error("Missing required input: {field}")]
    MissingRequiredInput { field: String },
    #[error("Resource not found: {uri}")]
    ResourceNotFound { uri: String },
}

impl From<TimeServerError> for McpError {
    fn from(err: TimeServerError) -> Self {
        match err {
            TimeServerError::InvalidTimeInput { input } => McpError::invalid_params(
                ERROR_INVALID_TIME_INPUT,
                Some(json!({
                    "input": input,
                    "accepted": [
                        "epoch seconds",
                        "epoch milliseconds",
                        "YYYY-MM-DD",
                        "YYYY-MM-DD HH:MM:SS",
                        "ISO 8601 with offset"
                    ]
                })),
            ),
            TimeServerError::InvalidTimezone { timezone } => McpError::invalid_params(
                ERROR_INVALID_TIMEZONE,
                Some(json!({"timezone": timezone})),
            ),
            TimeServerError::InvalidFormatPattern { pattern } => McpError::invalid_params(
                ERROR_INVALID_FORMAT_PATTERN,
                Some(json!({"pattern": pattern})),
            ),
            TimeServerError::MissingRequiredInput { field } => McpError::invalid_params(
                ERROR_MISSING_REQUIRED_INPUT,
                Some(json!({"field": field})),
            ),
            TimeServerError::ResourceNotFound { uri } => McpError::resource_not_found(
                ERROR_RESOURCE_NOT_FOUND,
                Some(json!({
                    "uri": uri,
                    "available_resources": AVAILABLE_RESOURCES
                })),
            ),
        }
    }
}

pub type TimeServerResult<T> = Result<T, TimeServerError>;
pub type McpResult<T> = Result<T, McpError>;
