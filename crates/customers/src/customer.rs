use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use defaultdesk_core::{CustomerId, DomainError, DomainResult};

/// Customer account subject to default determinations.
///
/// # Invariants
/// - `name` is non-empty and unique across customers (uniqueness is enforced by the store).
/// - `is_default` is only flipped by the application lifecycle (approve / approve rebirth).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub industry: String,
    pub region: String,
    pub is_default: bool,
    /// Most recent grade from an external rating source, if any.
    pub latest_ext_grade: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Persistable customer columns, used for partial updates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CustomerField {
    IsDefault,
    LatestExtGrade,
}

impl CustomerField {
    pub fn column(&self) -> &'static str {
        match self {
            CustomerField::IsDefault => "is_default",
            CustomerField::LatestExtGrade => "latest_ext_grade",
        }
    }
}

/// Command: RegisterCustomer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterCustomer {
    pub name: String,
    pub industry: String,
    pub region: String,
    pub latest_ext_grade: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl Customer {
    /// Build a new, non-defaulted customer from a registration command.
    pub fn register(cmd: RegisterCustomer) -> DomainResult<Self> {
        let name = cmd.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("customer name cannot be empty"));
        }
        let industry = cmd.industry.trim();
        if industry.is_empty() {
            return Err(DomainError::validation("industry cannot be empty"));
        }
        let region = cmd.region.trim();
        if region.is_empty() {
            return Err(DomainError::validation("region cannot be empty"));
        }

        Ok(Self {
            id: CustomerId::new(),
            name: name.to_string(),
            industry: industry.to_string(),
            region: region.to_string(),
            is_default: false,
            latest_ext_grade: cmd
                .latest_ext_grade
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty()),
            created_at: cmd.occurred_at,
        })
    }

    /// Flag the customer as defaulted. Returns the fields that changed.
    pub fn flag_default(&mut self) -> &'static [CustomerField] {
        self.is_default = true;
        &[CustomerField::IsDefault]
    }

    /// Clear the default flag after an approved rebirth. Returns the fields that changed.
    pub fn clear_default(&mut self) -> &'static [CustomerField] {
        self.is_default = false;
        &[CustomerField::IsDefault]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(name: &str) -> DomainResult<Customer> {
        Customer::register(RegisterCustomer {
            name: name.to_string(),
            industry: "Manufacturing".to_string(),
            region: "East".to_string(),
            latest_ext_grade: Some("  ".to_string()),
            occurred_at: Utc::now(),
        })
    }

    #[test]
    fn register_trims_and_starts_non_defaulted() {
        let c = register("  Acme  ").unwrap();
        assert_eq!(c.name, "Acme");
        assert!(!c.is_default);
        assert_eq!(c.latest_ext_grade, None);
    }

    #[test]
    fn register_rejects_empty_name() {
        let err = register("   ").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn default_flag_round_trip_touches_only_the_flag() {
        let mut c = register("Acme").unwrap();
        let before = c.clone();

        assert_eq!(c.flag_default(), &[CustomerField::IsDefault]);
        assert!(c.is_default);
        c.clear_default();
        assert_eq!(c, before);
    }
}
