use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use defaultdesk_core::{
    ApplicationId, ConflictReason, CustomerId, DomainError, DomainResult, UserId,
};

/// Application status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    RebirthPending,
    Reborn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
        ApplicationStatus::RebirthPending,
        ApplicationStatus::Reborn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::RebirthPending => "RebirthPending",
            ApplicationStatus::Reborn => "Reborn",
        }
    }

    /// `Pending`, `Approved` and `RebirthPending` accept further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            ApplicationStatus::Pending | ApplicationStatus::Approved | ApplicationStatus::RebirthPending
        )
    }

    /// Whether a single step from `self` to `next` is on the allowed graph.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, next),
            (Pending, Approved) | (Pending, Rejected) | (Approved, RebirthPending) | (RebirthPending, Reborn)
        )
    }
}

impl core::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown application status '{s}'")))
    }
}

/// How severe the reported default is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

impl core::fmt::Display for Severity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(Severity::High),
            "Medium" => Ok(Severity::Medium),
            "Low" => Ok(Severity::Low),
            other => Err(DomainError::validation(format!(
                "severity must be one of High, Medium, Low (got '{other}')"
            ))),
        }
    }
}

/// Persistable application columns written by lifecycle transitions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ApplicationField {
    Status,
    ApproverId,
    ApprovalTime,
    RejectionReason,
    RebirthReason,
    RebirthApproverId,
    RebirthApprovalTime,
}

impl ApplicationField {
    pub fn column(&self) -> &'static str {
        match self {
            ApplicationField::Status => "status",
            ApplicationField::ApproverId => "approver_id",
            ApplicationField::ApprovalTime => "approval_time",
            ApplicationField::RejectionReason => "rejection_reason",
            ApplicationField::RebirthReason => "rebirth_reason",
            ApplicationField::RebirthApproverId => "rebirth_approver_id",
            ApplicationField::RebirthApprovalTime => "rebirth_approval_time",
        }
    }
}

/// Command: SubmitApplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitApplication {
    pub customer_id: CustomerId,
    pub severity: Severity,
    pub reason: String,
    pub remarks: Option<String>,
    pub applicant_id: UserId,
    pub submitted_at: DateTime<Utc>,
}

/// A default determination raised against a customer.
///
/// # Invariants
/// - Status only moves along the allowed graph (see crate docs); every transition
///   checks its source state before touching any field.
/// - Approval / rejection / rebirth metadata is written once, by its transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultApplication {
    pub id: ApplicationId,
    pub customer_id: CustomerId,
    pub status: ApplicationStatus,
    pub severity: Severity,
    pub reason: String,
    pub remarks: Option<String>,
    pub applicant_id: UserId,
    pub application_time: DateTime<Utc>,
    pub approver_id: Option<UserId>,
    pub approval_time: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub rebirth_reason: Option<String>,
    pub rebirth_approver_id: Option<UserId>,
    pub rebirth_approval_time: Option<DateTime<Utc>>,
}

impl DefaultApplication {
    /// Build a new `Pending` application.
    pub fn submit(cmd: SubmitApplication) -> DomainResult<Self> {
        let reason = cmd.reason.trim();
        if reason.is_empty() {
            return Err(DomainError::validation("reason cannot be empty"));
        }

        Ok(Self {
            id: ApplicationId::new(),
            customer_id: cmd.customer_id,
            status: ApplicationStatus::Pending,
            severity: cmd.severity,
            reason: reason.to_string(),
            remarks: cmd.remarks.filter(|r| !r.trim().is_empty()),
            applicant_id: cmd.applicant_id,
            application_time: cmd.submitted_at,
            approver_id: None,
            approval_time: None,
            rejection_reason: None,
            rebirth_reason: None,
            rebirth_approver_id: None,
            rebirth_approval_time: None,
        })
    }

    fn ensure_status(&self, required: ApplicationStatus, otherwise: ConflictReason) -> DomainResult<()> {
        if self.status != required {
            return Err(DomainError::conflict(otherwise));
        }
        Ok(())
    }

    /// `Pending → Approved`. Returns the fields to persist.
    pub fn approve(&mut self, approver_id: UserId, at: DateTime<Utc>) -> DomainResult<&'static [ApplicationField]> {
        self.ensure_status(ApplicationStatus::Pending, ConflictReason::NotPending)?;

        self.status = ApplicationStatus::Approved;
        self.approver_id = Some(approver_id);
        self.approval_time = Some(at);
        Ok(&[
            ApplicationField::Status,
            ApplicationField::ApproverId,
            ApplicationField::ApprovalTime,
        ])
    }

    /// `Pending → Rejected`. Returns the fields to persist.
    pub fn reject(
        &mut self,
        approver_id: UserId,
        reason: impl Into<String>,
        at: DateTime<Utc>,
    ) -> DomainResult<&'static [ApplicationField]> {
        self.ensure_status(ApplicationStatus::Pending, ConflictReason::NotPending)?;

        self.status = ApplicationStatus::Rejected;
        self.approver_id = Some(approver_id);
        self.approval_time = Some(at);
        self.rejection_reason = Some(reason.into());
        Ok(&[
            ApplicationField::Status,
            ApplicationField::ApproverId,
            ApplicationField::ApprovalTime,
            ApplicationField::RejectionReason,
        ])
    }

    /// `Approved → RebirthPending`. Returns the fields to persist.
    pub fn apply_for_rebirth(&mut self, reason: impl Into<String>) -> DomainResult<&'static [ApplicationField]> {
        self.ensure_status(ApplicationStatus::Approved, ConflictReason::NotApproved)?;

        self.status = ApplicationStatus::RebirthPending;
        self.rebirth_reason = Some(reason.into());
        Ok(&[ApplicationField::Status, ApplicationField::RebirthReason])
    }

    /// `RebirthPending → Reborn`. Returns the fields to persist.
    pub fn approve_rebirth(
        &mut self,
        approver_id: UserId,
        at: DateTime<Utc>,
    ) -> DomainResult<&'static [ApplicationField]> {
        self.ensure_status(ApplicationStatus::RebirthPending, ConflictReason::NotRebirthPending)?;

        self.status = ApplicationStatus::Reborn;
        self.rebirth_approver_id = Some(approver_id);
        self.rebirth_approval_time = Some(at);
        Ok(&[
            ApplicationField::Status,
            ApplicationField::RebirthApproverId,
            ApplicationField::RebirthApprovalTime,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pending() -> DefaultApplication {
        DefaultApplication::submit(SubmitApplication {
            customer_id: CustomerId::new(),
            severity: Severity::High,
            reason: "missed three payments".to_string(),
            remarks: Some("   ".to_string()),
            applicant_id: UserId::new(),
            submitted_at: Utc::now(),
        })
        .unwrap()
    }

    #[test]
    fn submit_starts_pending_without_review_metadata() {
        let app = pending();
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert_eq!(app.remarks, None);
        assert!(app.approver_id.is_none() && app.approval_time.is_none());
    }

    #[test]
    fn submit_rejects_blank_reason() {
        let err = DefaultApplication::submit(SubmitApplication {
            customer_id: CustomerId::new(),
            severity: Severity::Low,
            reason: "  ".to_string(),
            remarks: None,
            applicant_id: UserId::new(),
            submitted_at: Utc::now(),
        })
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn approve_records_approver_and_time() {
        let mut app = pending();
        let approver = UserId::new();
        let at = Utc::now();

        let fields = app.approve(approver, at).unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(app.status, ApplicationStatus::Approved);
        assert_eq!(app.approver_id, Some(approver));
        assert_eq!(app.approval_time, Some(at));
    }

    #[test]
    fn reject_records_reason() {
        let mut app = pending();
        app.reject(UserId::new(), "insufficient evidence", Utc::now()).unwrap();
        assert_eq!(app.status, ApplicationStatus::Rejected);
        assert_eq!(app.rejection_reason.as_deref(), Some("insufficient evidence"));
    }

    #[test]
    fn full_rebirth_path() {
        let mut app = pending();
        app.approve(UserId::new(), Utc::now()).unwrap();
        app.apply_for_rebirth("debts settled").unwrap();
        assert_eq!(app.status, ApplicationStatus::RebirthPending);

        let rebirth_approver = UserId::new();
        app.approve_rebirth(rebirth_approver, Utc::now()).unwrap();
        assert_eq!(app.status, ApplicationStatus::Reborn);
        assert_eq!(app.rebirth_approver_id, Some(rebirth_approver));
        assert!(app.status.is_terminal());
    }

    #[test]
    fn only_rejected_and_reborn_are_terminal() {
        use ApplicationStatus::*;
        for status in [Pending, Approved, RebirthPending] {
            assert!(!status.is_terminal(), "{status}");
        }
        for status in [Rejected, Reborn] {
            assert!(status.is_terminal(), "{status}");
        }
    }

    #[test]
    fn wrong_source_state_is_a_conflict_and_changes_nothing() {
        let mut app = pending();
        let before = app.clone();

        let err = app.apply_for_rebirth("too early").unwrap_err();
        assert_eq!(err, DomainError::conflict(ConflictReason::NotApproved));
        let err = app.approve_rebirth(UserId::new(), Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::conflict(ConflictReason::NotRebirthPending));
        assert_eq!(app, before);

        app.reject(UserId::new(), "no", Utc::now()).unwrap();
        let rejected = app.clone();
        let err = app.approve(UserId::new(), Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::conflict(ConflictReason::NotPending));
        assert_eq!(app, rejected);
    }

    #[test]
    fn status_round_trips_through_str_and_json() {
        for status in ApplicationStatus::ALL {
            assert_eq!(status.as_str().parse::<ApplicationStatus>().unwrap(), status);
        }
        assert_eq!(
            serde_json::to_string(&ApplicationStatus::RebirthPending).unwrap(),
            "\"RebirthPending\""
        );
        assert!("pending".parse::<ApplicationStatus>().is_err());
    }

    #[derive(Debug, Clone, Copy)]
    enum Step {
        Approve,
        Reject,
        ApplyRebirth,
        ApproveRebirth,
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            Just(Step::Approve),
            Just(Step::Reject),
            Just(Step::ApplyRebirth),
            Just(Step::ApproveRebirth),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: any sequence of transition attempts only ever moves along the
        /// allowed graph, and failed attempts leave the application untouched.
        #[test]
        fn transitions_stay_on_the_graph(steps in prop::collection::vec(step(), 0..12)) {
            let mut app = pending();
            for s in steps {
                let before = app.clone();
                let result = match s {
                    Step::Approve => app.approve(UserId::new(), Utc::now()),
                    Step::Reject => app.reject(UserId::new(), "r", Utc::now()),
                    Step::ApplyRebirth => app.apply_for_rebirth("r"),
                    Step::ApproveRebirth => app.approve_rebirth(UserId::new(), Utc::now()),
                };
                match result {
                    Ok(_) => prop_assert!(before.status.can_transition_to(app.status)),
                    Err(e) => {
                        prop_assert!(matches!(e, DomainError::Conflict(_)));
                        prop_assert_eq!(&app, &before);
                    }
                }
            }
        }
    }
}
