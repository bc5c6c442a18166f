//! Date rules for hierarchy nodes: ordering, write-once fields, and
//! containment of a child's range within its parent's.

use crate::error::CoreError;
use crate::types::Date;

/// An optional start/end pair. Either end may still be unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<Date>,
    pub end: Option<Date>,
}

impl DateRange {
    pub fn new(start: Option<Date>, end: Option<Date>) -> Self {
        Self { start, end }
    }
}

/// Reject a range whose start falls after its end.
pub fn validate_order(range: DateRange) -> Result<(), CoreError> {
    if let (Some(start), Some(end)) = (range.start, range.end) {
        if start > end {
            return Err(CoreError::Validation(
                "start date cannot be greater than end date.".into(),
            ));
        }
    }
    Ok(())
}

/// Combine the stored range with a requested change.
///
/// Dates are write-once: a date that is already set may be re-sent with the
/// same value but never changed. The merged range is checked for ordering.
pub fn apply_change(current: DateRange, requested: DateRange) -> Result<DateRange, CoreError> {
    if let (Some(old), Some(new)) = (current.start, requested.start) {
        if old != new {
            return Err(CoreError::Validation(
                "You can't change start date field!".into(),
            ));
        }
    }
    if let (Some(old), Some(new)) = (current.end, requested.end) {
        if old != new {
            return Err(CoreError::Validation(
                "You can't change end date field!".into(),
            ));
        }
    }

    let merged = DateRange {
        start: current.start.or(requested.start),
        end: current.end.or(requested.end),
    };
    validate_order(merged)?;
    Ok(merged)
}

/// Require `child` to lie inside `parent` wherever both sides are known.
pub fn validate_within(child: DateRange, parent: DateRange, parent_name: &str) -> Result<(), CoreError> {
    if let Some(parent_start) = parent.start {
        for (label, date) in [("start", child.start), ("end", child.end)] {
            if let Some(d) = date {
                if d < parent_start {
                    return Err(CoreError::Validation(format!(
                        "{label} date cannot be before the {parent_name} start date ({parent_start})."
                    )));
                }
            }
        }
    }
    if let Some(parent_end) = parent.end {
        for (label, date) in [("start", child.start), ("end", child.end)] {
            if let Some(d) = date {
                if d > parent_end {
                    return Err(CoreError::Validation(format!(
                        "{label} date cannot be after the {parent_name} end date ({parent_end})."
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Require a parent range to still cover the span its children occupy.
///
/// `children` is the envelope of all child dates: earliest start/end date
/// seen as `start`, latest as `end`.
pub fn validate_covers(parent: DateRange, children: DateRange, child_name: &str) -> Result<(), CoreError> {
    if let (Some(parent_start), Some(earliest)) = (parent.start, children.start) {
        if parent_start > earliest {
            return Err(CoreError::Validation(format!(
                "start date cannot be after an existing {child_name} date ({earliest})."
            )));
        }
    }
    if let (Some(parent_end), Some(latest)) = (parent.end, children.end) {
        if parent_end < latest {
            return Err(CoreError::Validation(format!(
                "end date cannot be before an existing {child_name} date ({latest})."
            )));
        }
    }
    Ok(())
}

/// Require a payment or installment date to be today or later.
pub fn validate_not_past(date: Date, today: Date, what: &str) -> Result<(), CoreError> {
    if date < today {
        return Err(CoreError::Validation(format!(
            "The {what} date must be today or in future!"
        )));
    }
    Ok(())
}
