//! Rules for the payment-method records behind a financial outcome.
//!
//! Every detail field on a payment method (payment date, check date and
//! number, installment count, schedule date) is write-once: the first update
//! must supply it, later updates may not touch it.

use crate::error::CoreError;
use crate::schedule::validate_not_past;
use crate::status::{PaymentStatus, ScheduleStatus};
use crate::types::Date;

/// Upper bound on the number of installments per payment.
pub const MAX_INSTALLMENTS: i32 = 4;

/// Required length of a check number.
pub const CHECK_NUMBER_LENGTH: usize = 16;

fn write_once<C: ?Sized, T>(
    current: Option<&C>,
    requested: Option<T>,
    changed: &str,
    required: &str,
) -> Result<Option<T>, CoreError> {
    match (current, requested) {
        (Some(_), Some(_)) => Err(CoreError::Validation(changed.to_string())),
        (None, None) => Err(CoreError::Validation(required.to_string())),
        (None, Some(value)) => Ok(Some(value)),
        (Some(_), None) => Ok(None),
    }
}

/// Validate a cash payment update. Returns the payment date to store, if any.
pub fn cash_update(
    current: Option<Date>,
    requested: Option<Date>,
    today: Date,
) -> Result<Option<Date>, CoreError> {
    let date = write_once(
        current.as_ref(),
        requested,
        "Payment date cannot be change",
        "You must enter a payment date!",
    )?;
    if let Some(d) = date {
        validate_not_past(d, today, "payment")?;
    }
    Ok(date)
}

/// Fields to store after a check payment update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckChange {
    pub check_date: Option<Date>,
    pub check_number: Option<String>,
}

/// Validate a check payment update.
pub fn check_update(
    current_date: Option<Date>,
    current_number: Option<&str>,
    requested_date: Option<Date>,
    requested_number: Option<String>,
    today: Date,
) -> Result<CheckChange, CoreError> {
    let check_date = write_once(
        current_date.as_ref(),
        requested_date,
        "You can't change check date field!",
        "You must enter a check date!",
    )?;
    if let Some(d) = check_date {
        validate_not_past(d, today, "check")?;
    }

    let check_number = write_once(
        current_number,
        requested_number,
        "You can't change check number field!",
        "You must enter a check number!",
    )?;
    if let Some(ref number) = check_number {
        validate_check_number(number)?;
    }

    Ok(CheckChange {
        check_date,
        check_number,
    })
}

/// A check number is exactly [`CHECK_NUMBER_LENGTH`] ASCII digits.
pub fn validate_check_number(number: &str) -> Result<(), CoreError> {
    if number.len() != CHECK_NUMBER_LENGTH || !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::Validation(format!(
            "The check number must have {CHECK_NUMBER_LENGTH} digits"
        )));
    }
    Ok(())
}

/// Validate an installment payment update. Returns the count to store; the
/// caller creates one schedule row per installment.
pub fn installment_update(
    current: Option<i32>,
    requested: Option<i32>,
) -> Result<Option<i32>, CoreError> {
    let count = write_once(
        current.as_ref(),
        requested,
        "You cant change count installments!",
        "You must enter a count installments!",
    )?;
    if let Some(n) = count {
        if n < 1 {
            return Err(CoreError::Validation(
                "The count installments must be at least 1".into(),
            ));
        }
        if n > MAX_INSTALLMENTS {
            return Err(CoreError::Validation(format!(
                "The count installments must be {MAX_INSTALLMENTS} or less"
            )));
        }
    }
    Ok(count)
}

/// Validate an installment schedule date update.
///
/// `siblings` are the dates already picked by the other schedules of the
/// same installment payment. Two installments may not share a date or a
/// calendar month.
pub fn schedule_update(
    current: Option<Date>,
    requested: Option<Date>,
    siblings: &[Date],
    today: Date,
) -> Result<Option<Date>, CoreError> {
    let date = write_once(
        current.as_ref(),
        requested,
        "You cant change date of installment!",
        "You must enter date of installment!",
    )?;
    if let Some(d) = date {
        validate_not_past(d, today, "installment")?;
        for other in siblings {
            if *other == d {
                return Err(CoreError::Validation(
                    "This date is picked by another installment!".into(),
                ));
            }
            if same_month(*other, d) {
                return Err(CoreError::Validation(
                    "You can't set two installments in one month!".into(),
                ));
            }
        }
    }
    Ok(date)
}

fn same_month(a: Date, b: Date) -> bool {
    use chrono::Datelike;
    a.year() == b.year() && a.month() == b.month()
}

/// A settled payment (done or canceled) cannot be settled again.
pub fn ensure_payment_open(status: Option<PaymentStatus>) -> Result<(), CoreError> {
    match status {
        Some(s) => Err(CoreError::Conflict(format!("Payment is already {s}"))),
        None => Ok(()),
    }
}

/// A paid or canceled installment cannot change status again.
pub fn ensure_schedule_open(status: ScheduleStatus) -> Result<(), CoreError> {
    match status {
        ScheduleStatus::InProgress => Ok(()),
        other => Err(CoreError::Conflict(format!("Installment is already {other}"))),
    }
}

/// Completing a payment requires its date to be recorded first.
pub fn ensure_date_recorded(date: Option<Date>, what: &str) -> Result<(), CoreError> {
    if date.is_none() {
        return Err(CoreError::Validation(format!(
            "You must enter a {what} date before completing the payment!"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    fn today() -> Date {
        d(2024, 5, 10)
    }

    #[test]
    fn cash_date_set_once() {
        assert_eq!(cash_update(None, Some(today()), today()).unwrap(), Some(today()));
        assert_eq!(cash_update(Some(today()), None, today()).unwrap(), None);
        assert_matches!(
            cash_update(Some(today()), Some(d(2024, 6, 1)), today()),
            Err(CoreError::Validation(msg)) if msg == "Payment date cannot be change"
        );
    }

    #[test]
    fn cash_date_required_and_not_past() {
        assert_matches!(
            cash_update(None, None, today()),
            Err(CoreError::Validation(msg)) if msg == "You must enter a payment date!"
        );
        assert!(cash_update(None, Some(d(2024, 5, 9)), today()).is_err());
    }

    #[test]
    fn check_fields_validated_independently() {
        let change = check_update(
            Some(today()),
            None,
            None,
            Some("1234567890123456".into()),
            today(),
        )
        .unwrap();
        assert_eq!(change.check_date, None);
        assert_eq!(change.check_number.as_deref(), Some("1234567890123456"));

        assert_matches!(
            check_update(None, None, Some(today()), None, today()),
            Err(CoreError::Validation(msg)) if msg == "You must enter a check number!"
        );
    }

    #[test]
    fn check_number_must_be_sixteen_digits() {
        assert!(validate_check_number("1234567890123456").is_ok());
        assert!(validate_check_number("123456789012345").is_err());
        assert!(validate_check_number("12345678901234567").is_err());
        assert!(validate_check_number("12345678901234ab").is_err());
    }

    #[test]
    fn check_number_is_write_once() {
        assert_matches!(
            check_update(Some(today()), Some("1234567890123456"), None, Some("6543210987654321".into()), today()),
            Err(CoreError::Validation(msg)) if msg == "You can't change check number field!"
        );
    }

    #[test]
    fn installment_count_bounds() {
        assert_eq!(installment_update(None, Some(4)).unwrap(), Some(4));
        assert!(installment_update(None, Some(5)).is_err());
        assert!(installment_update(None, Some(0)).is_err());
        assert!(installment_update(Some(2), Some(3)).is_err());
        assert!(installment_update(None, None).is_err());
    }

    #[test]
    fn schedule_dates_distinct_months() {
        let siblings = [d(2024, 6, 15)];
        assert_eq!(
            schedule_update(None, Some(d(2024, 7, 15)), &siblings, today()).unwrap(),
            Some(d(2024, 7, 15))
        );
        assert_matches!(
            schedule_update(None, Some(d(2024, 6, 15)), &siblings, today()),
            Err(CoreError::Validation(msg)) if msg == "This date is picked by another installment!"
        );
        assert_matches!(
            schedule_update(None, Some(d(2024, 6, 1)), &siblings, today()),
            Err(CoreError::Validation(msg)) if msg == "You can't set two installments in one month!"
        );
    }

    #[test]
    fn same_month_of_another_year_is_allowed() {
        let siblings = [d(2024, 6, 15)];
        assert!(schedule_update(None, Some(d(2025, 6, 15)), &siblings, today()).is_ok());
    }

    #[test]
    fn settled_payments_cannot_change() {
        assert!(ensure_payment_open(None).is_ok());
        assert_matches!(ensure_payment_open(Some(PaymentStatus::Done)), Err(CoreError::Conflict(_)));
        assert!(ensure_schedule_open(ScheduleStatus::InProgress).is_ok());
        assert_matches!(ensure_schedule_open(ScheduleStatus::Paid), Err(CoreError::Conflict(_)));
        assert!(ensure_date_recorded(None, "check").is_err());
    }
}
