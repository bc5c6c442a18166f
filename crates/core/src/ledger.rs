//! Rules for outcome and income records.

use crate::error::CoreError;
use crate::status::PaymentMethod;
use crate::types::Money;

/// An outcome price must be a positive amount.
pub fn validate_price(price: Money) -> Result<(), CoreError> {
    if price <= 0 {
        return Err(CoreError::Validation(
            "price must be greater than zero.".into(),
        ));
    }
    Ok(())
}

/// An income amount must be a positive amount.
pub fn validate_income_amount(amount: Money) -> Result<(), CoreError> {
    if amount <= 0 {
        return Err(CoreError::Validation(
            "amount must be greater than zero.".into(),
        ));
    }
    Ok(())
}

/// The payment method is fixed when the outcome is created.
pub fn reject_method_change(requested: Option<PaymentMethod>) -> Result<(), CoreError> {
    match requested {
        Some(_) => Err(CoreError::Validation(
            "This field cannot be change.".into(),
        )),
        None => Ok(()),
    }
}

/// An income amount may be re-sent unchanged but never altered.
pub fn income_amount_update(current: Money, requested: Option<Money>) -> Result<(), CoreError> {
    match requested {
        Some(amount) if amount != current => Err(CoreError::Validation(
            "You can't change amount field!".into(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn non_positive_amounts_rejected() {
        assert!(validate_price(1).is_ok());
        assert!(validate_price(0).is_err());
        assert!(validate_income_amount(-3).is_err());
    }

    #[test]
    fn payment_method_is_immutable() {
        assert!(reject_method_change(None).is_ok());
        assert_matches!(
            reject_method_change(Some(PaymentMethod::Cash)),
            Err(CoreError::Validation(msg)) if msg == "This field cannot be change."
        );
    }

    #[test]
    fn income_amount_resent_unchanged() {
        assert!(income_amount_update(500, None).is_ok());
        assert!(income_amount_update(500, Some(500)).is_ok());
        assert!(income_amount_update(500, Some(501)).is_err());
    }
}
