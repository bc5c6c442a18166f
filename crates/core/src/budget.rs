//! Budget rollup rules: children may never claim more than their parent.

use crate::error::CoreError;
use crate::types::Money;

/// A budget, when given, must be a positive amount.
pub fn validate_amount(budget: Option<Money>) -> Result<(), CoreError> {
    match budget {
        Some(b) if b <= 0 => Err(CoreError::Validation(
            "budget must be greater than zero.".into(),
        )),
        _ => Ok(()),
    }
}

/// Check that adding `child` to the budgets already allotted to its
/// siblings stays within `parent`.
///
/// `siblings_total` must exclude the child's own previous budget when the
/// child is being updated. A parent without a budget imposes no limit.
pub fn validate_child_fits(
    parent: Option<Money>,
    siblings_total: Money,
    child: Option<Money>,
    parent_name: &str,
) -> Result<(), CoreError> {
    let (Some(parent), Some(child)) = (parent, child) else {
        return Ok(());
    };
    let total = siblings_total.checked_add(child).ok_or_else(|| {
        CoreError::Validation("budget total is out of range.".into())
    })?;
    if total > parent {
        let remaining = (parent - siblings_total).max(0);
        return Err(CoreError::Validation(format!(
            "budget exceeds the {parent_name} budget. Remaining budget: {remaining}."
        )));
    }
    Ok(())
}

/// Check that a parent's (new) budget still covers what its children hold.
pub fn validate_covers_children(
    parent: Option<Money>,
    children_total: Money,
    child_name: &str,
) -> Result<(), CoreError> {
    match parent {
        Some(p) if p < children_total => Err(CoreError::Validation(format!(
            "budget cannot be less than the total {child_name} budgets ({children_total})."
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn zero_and_negative_budgets_rejected() {
        assert!(validate_amount(None).is_ok());
        assert!(validate_amount(Some(1)).is_ok());
        assert_matches!(validate_amount(Some(0)), Err(CoreError::Validation(_)));
        assert_matches!(validate_amount(Some(-5)), Err(CoreError::Validation(_)));
    }

    #[test]
    fn child_fits_exactly() {
        assert!(validate_child_fits(Some(1000), 600, Some(400), "project").is_ok());
    }

    #[test]
    fn child_over_remaining_budget() {
        assert_matches!(
            validate_child_fits(Some(1000), 600, Some(401), "project"),
            Err(CoreError::Validation(msg)) if msg.contains("Remaining budget: 400")
        );
    }

    #[test]
    fn unbudgeted_parent_or_child_is_unconstrained() {
        assert!(validate_child_fits(None, 10_000, Some(5), "task").is_ok());
        assert!(validate_child_fits(Some(10), 10, None, "task").is_ok());
    }

    #[test]
    fn overflowing_sum_is_rejected() {
        assert!(validate_child_fits(Some(Money::MAX), Money::MAX, Some(1), "project").is_err());
    }

    #[test]
    fn parent_cannot_shrink_below_children() {
        assert!(validate_covers_children(Some(500), 500, "task").is_ok());
        assert!(validate_covers_children(None, 500, "task").is_ok());
        assert_matches!(
            validate_covers_children(Some(499), 500, "task"),
            Err(CoreError::Validation(msg)) if msg.contains("(500)")
        );
    }
}
