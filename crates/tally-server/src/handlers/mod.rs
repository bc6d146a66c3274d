//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod audit;
pub mod auth;
pub mod budgets;
pub mod categories;
pub mod expenses;
pub mod insights;
pub mod reports;

// Re-export all handlers for use in router
pub use audit::*;
pub use auth::*;
pub use budgets::*;
pub use categories::*;
pub use expenses::*;
pub use insights::*;
pub use reports::*;

use axum::extract::Request;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{AppError, MAX_BODY_SIZE};
use tally_core::{Database, Month};

/// Audit a change that has already been committed
///
/// A failed audit insert is logged instead of turning a successful write
/// into an error response the client would retry.
pub(crate) fn audit_write(
    db: &Database,
    user: &str,
    action: &str,
    entity_type: &str,
    entity_id: Option<i64>,
    details: Option<&str>,
) {
    if let Err(e) = db.log_audit(user, action, Some(entity_type), entity_id, details) {
        warn!(user, action, entity_type, entity_id, error = %e, "Audit log write failed");
    }
}

/// Query parameters carrying a `YYYY-MM` month
#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

/// Parse a required month parameter
pub(crate) fn required_month(month: Option<&str>) -> Result<Month, AppError> {
    let raw = month
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::bad_request("month is required (YYYY-MM)"))?;
    raw.parse()
        .map_err(|_| AppError::bad_request("Invalid month format (use YYYY-MM)"))
}

/// Read and deserialize a JSON request body
pub(crate) async fn read_json<T: DeserializeOwned>(request: Request) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    serde_json::from_slice(&bytes).map_err(|e| {
        debug!(error = %e, "Rejected request body");
        AppError::bad_request("Invalid JSON")
    })
}

/// A number sent either as a JSON number or as a numeric string (form values)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(f64),
    Text(String),
}

impl NumberInput {
    /// The value as a finite number; `field` names it in the error message
    pub fn value(&self, field: &str) -> Result<f64, AppError> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| AppError::bad_request(&format!("{} must be a number", field)))?,
        };
        if !value.is_finite() {
            return Err(AppError::bad_request(&format!("{} must be a number", field)));
        }
        Ok(value)
    }
}

/// An id sent either as a JSON integer or as a numeric string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdInput {
    Id(i64),
    Text(String),
}

impl IdInput {
    pub fn value(&self, field: &str) -> Result<i64, AppError> {
        match self {
            Self::Id(id) => Ok(*id),
            Self::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| AppError::bad_request(&format!("{} must be an id", field))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_input() {
        let n: NumberInput = serde_json::from_str("12.5").unwrap();
        assert_eq!(n.value("amount").ok(), Some(12.5));

        let n: NumberInput = serde_json::from_str("\" 40 \"").unwrap();
        assert_eq!(n.value("amount").ok(), Some(40.0));

        let n: NumberInput = serde_json::from_str("\"abc\"").unwrap();
        assert!(n.value("amount").is_err());

        let n: NumberInput = serde_json::from_str("\"NaN\"").unwrap();
        assert!(n.value("amount").is_err());
    }

    #[test]
    fn test_id_input() {
        let id: IdInput = serde_json::from_str("7").unwrap();
        assert_eq!(id.value("category").ok(), Some(7));

        let id: IdInput = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(id.value("category").ok(), Some(7));

        let id: IdInput = serde_json::from_str("\"seven\"").unwrap();
        assert!(id.value("category").is_err());
    }

    #[test]
    fn test_required_month() {
        assert!(required_month(Some("2025-03")).is_ok());
        assert!(required_month(None).is_err());
        assert!(required_month(Some("  ")).is_err());
        assert!(required_month(Some("2025-3")).is_err());
        assert!(required_month(Some("2025-13")).is_err());
    }
}
