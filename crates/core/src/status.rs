//! Status and choice enums stored as TEXT columns, plus the pure decision
//! rules behind upward status propagation.
//!
//! Every enum round-trips through its snake_case string form: serde uses it
//! on the wire, the database stores it in a `CHECK`-constrained TEXT column,
//! and `TryFrom<String>` lets sqlx decode rows straight into the enum.

define_text_enum! {
    /// Lifecycle of a project, task, or subtask.
    WorkStatus, "status" {
        NotStarted => "not_started",
        InProgress => "in_progress",
        Completed => "completed",
    }
}

define_text_enum! {
    /// Project colour category; each colour stands for a domain label.
    Category, "category" {
        Technical => "red",
        Design => "green",
        Research => "blue",
        Business => "purple",
        Education => "pink",
        Other => "yellow",
    }
}

define_text_enum! {
    /// How a financial outcome is paid. Fixed at creation.
    PaymentMethod, "payment method" {
        Cash => "cash",
        Check => "check",
        Installment => "installment",
    }
}

define_text_enum! {
    /// Status of a financial outcome record.
    OutcomeStatus, "outcome status" {
        Paid => "paid",
        InProgress => "in_progress",
        Canceled => "canceled",
    }
}

define_text_enum! {
    /// Final state of a cash, check, or installment payment. Absent until
    /// the payment is settled one way or the other.
    PaymentStatus, "payment status" {
        Done => "done",
        Canceled => "canceled",
    }
}

define_text_enum! {
    /// Status of one dated installment.
    ScheduleStatus, "installment status" {
        Paid => "paid",
        InProgress => "in_progress",
        Canceled => "canceled",
    }
}

impl Default for WorkStatus {
    fn default() -> Self {
        WorkStatus::NotStarted
    }
}

impl Category {
    /// Human-readable label for the colour code.
    pub fn label(self) -> &'static str {
        match self {
            Category::Technical => "Technical",
            Category::Design => "Design",
            Category::Research => "Research",
            Category::Business => "Business",
            Category::Education => "Education",
            Category::Other => "Other",
        }
    }
}

// ---------------------------------------------------------------------------
// Propagation rules
// ---------------------------------------------------------------------------

/// Whether a parent node should be marked completed after one of its
/// children was written.
///
/// The parent completes when every child is completed. A parent that is
/// already completed, or that has no children at all, is left alone.
pub fn parent_should_complete(parent: WorkStatus, children: &[WorkStatus]) -> bool {
    parent != WorkStatus::Completed
        && !children.is_empty()
        && children.iter().all(|s| *s == WorkStatus::Completed)
}

/// Derive an installment payment's status from its schedules.
///
/// Any canceled schedule cancels the whole installment; otherwise the
/// installment is done once every schedule is paid. `None` means the
/// installment status should be left unchanged.
pub fn installment_status_from_schedules(schedules: &[ScheduleStatus]) -> Option<PaymentStatus> {
    if schedules.is_empty() {
        return None;
    }
    if schedules.contains(&ScheduleStatus::Canceled) {
        return Some(PaymentStatus::Canceled);
    }
    if schedules.iter().all(|s| *s == ScheduleStatus::Paid) {
        return Some(PaymentStatus::Done);
    }
    None
}

/// Map a payment-method status onto the owning outcome's status.
pub fn outcome_status_from_payment(payment: Option<PaymentStatus>) -> OutcomeStatus {
    match payment {
        Some(PaymentStatus::Done) => OutcomeStatus::Paid,
        Some(PaymentStatus::Canceled) => OutcomeStatus::Canceled,
        None => OutcomeStatus::InProgress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use assert_matches::assert_matches;

    #[test]
    fn text_round_trip() {
        for status in WorkStatus::ALL {
            assert_eq!(WorkStatus::parse(status.as_str()).unwrap(), *status);
        }
        assert_eq!(Category::parse("purple").unwrap(), Category::Business);
        assert_eq!(Category::Business.label(), "Business");
    }

    #[test]
    fn unknown_value_is_validation_error() {
        assert_matches!(PaymentMethod::parse("barter"), Err(CoreError::Validation(msg)) if msg.contains("cash, check, installment"));
    }

    #[test]
    fn serde_uses_stored_form() {
        let json = serde_json::to_string(&WorkStatus::NotStarted).unwrap();
        assert_eq!(json, "\"not_started\"");
        let parsed: Category = serde_json::from_str("\"red\"").unwrap();
        assert_eq!(parsed, Category::Technical);
    }

    #[test]
    fn parent_completes_when_all_children_completed() {
        use WorkStatus::*;
        assert!(parent_should_complete(InProgress, &[Completed, Completed]));
        assert!(!parent_should_complete(InProgress, &[Completed, InProgress]));
        assert!(!parent_should_complete(Completed, &[Completed]));
    }

    #[test]
    fn parent_without_children_stays() {
        assert!(!parent_should_complete(WorkStatus::NotStarted, &[]));
    }

    #[test]
    fn canceled_schedule_cancels_installment() {
        use ScheduleStatus::*;
        assert_eq!(
            installment_status_from_schedules(&[Paid, Canceled, InProgress]),
            Some(PaymentStatus::Canceled)
        );
    }

    #[test]
    fn all_paid_schedules_finish_installment() {
        use ScheduleStatus::*;
        assert_eq!(
            installment_status_from_schedules(&[Paid, Paid]),
            Some(PaymentStatus::Done)
        );
        assert_eq!(installment_status_from_schedules(&[Paid, InProgress]), None);
        assert_eq!(installment_status_from_schedules(&[]), None);
    }

    #[test]
    fn outcome_follows_payment() {
        assert_eq!(outcome_status_from_payment(Some(PaymentStatus::Done)), OutcomeStatus::Paid);
        assert_eq!(
            outcome_status_from_payment(Some(PaymentStatus::Canceled)),
            OutcomeStatus::Canceled
        );
        assert_eq!(outcome_status_from_payment(None), OutcomeStatus::InProgress);
    }
}
