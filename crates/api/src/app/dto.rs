use serde::{Deserialize, Serialize};

use defaultdesk_applications::DefaultApplication;
use defaultdesk_auth::User;
use defaultdesk_core::{ApplicationId, DomainError, DomainResult};
use defaultdesk_infra::repository::{ApplicationDetail, Page, StatTarget};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateApplicationRequest {
    pub customer_name: String,
    pub severity: String,
    pub reason: String,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub application_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub application_id: String,
    pub rejection_reason: String,
}

#[derive(Debug, Deserialize)]
pub struct ApplyRebirthRequest {
    pub application_id: String,
    pub rebirth_reason: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub industry: String,
    pub region: String,
    pub latest_ext_grade: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationsQuery {
    pub customer_name: Option<String>,
    pub status: Option<String>,
    pub page: Option<u32>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatisticsQuery {
    pub year: Option<i32>,
    pub include_historical: Option<bool>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            role: user.role.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub message: &'static str,
    pub application: DefaultApplication,
}

#[derive(Debug, Serialize)]
pub struct PaginatedApplicationsResponse {
    pub total: u64,
    pub page: u32,
    #[serde(rename = "pageSize")]
    pub page_size: u32,
    pub data: Vec<ApplicationDetail>,
}

impl From<Page<ApplicationDetail>> for PaginatedApplicationsResponse {
    fn from(page: Page<ApplicationDetail>) -> Self {
        Self {
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            data: page.items,
        }
    }
}

// -------------------------
// Parsing helpers
// -------------------------

pub fn parse_application_id(raw: &str) -> DomainResult<ApplicationId> {
    raw.trim().parse()
}

/// Path segment naming the statistics target: `defaults` or `rebirths`.
pub fn parse_stat_target(raw: &str) -> DomainResult<StatTarget> {
    match raw {
        "defaults" => Ok(StatTarget::Approved),
        "rebirths" => Ok(StatTarget::Reborn),
        other => Err(DomainError::validation(format!(
            "statistics target must be one of defaults, rebirths (got '{other}')"
        ))),
    }
}

/// Treat empty query values as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_targets() {
        assert_eq!(parse_stat_target("defaults"), Ok(StatTarget::Approved));
        assert_eq!(parse_stat_target("rebirths"), Ok(StatTarget::Reborn));
        assert!(parse_stat_target("approvals").is_err());
    }

    #[test]
    fn application_ids_must_be_uuids() {
        let id = ApplicationId::new();
        assert_eq!(parse_application_id(&format!(" {id} ")), Ok(id));
        assert!(parse_application_id("42").is_err());
    }

    #[test]
    fn blank_filters_are_dropped() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some(" Acme ".to_string())), Some("Acme".to_string()));
    }
}
