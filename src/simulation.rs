//! Credit simulation calculator.
//!
//! Turns the raw simulation form of one operation into a
//! [`ComputedOperation`]:
//!
//! - `total = installment / coefficient` for every operation type
//! - `net = total - outstanding balance` for operations that settle a prior
//!   loan, `net = total` otherwise
//!
//! Everything here is pure: no I/O, no logging, no shared state.

use crate::currency::{format_brl, parse_amount};
use crate::errors::ValidationError;
use crate::models::{ComputedOperation, FieldValue, OperationEntry, OperationType};

/// Validates `entry` and derives its amounts.
///
/// Validation stops at the first problem found, in this order: coefficient,
/// operation type, installment, term, then balance and current bank for
/// operations that settle a prior loan. The coefficient goes first so a zero
/// coefficient is always reported as [`ValidationError::ZeroCoefficient`].
///
/// A balance larger than the computed total is accepted and yields a
/// negative net released amount. A coefficient so small that the total
/// overflows is reported as out of range.
pub fn compute_operation(entry: &OperationEntry) -> Result<ComputedOperation, ValidationError> {
    let coefficient = required_amount(entry.coefficient.as_ref(), "coefficient")?;
    if coefficient == 0.0 {
        return Err(ValidationError::ZeroCoefficient);
    }

    let operation_type: OperationType = entry.operation_type.parse()?;

    let installment_amount =
        required_amount(entry.installment_amount.as_ref(), "installment_amount")?;
    if installment_amount <= 0.0 {
        return Err(ValidationError::OutOfRange("installment_amount"));
    }

    let term_months = required_term(entry.term_months.as_ref())?;

    let current_bank = non_blank(entry.current_bank.as_deref());
    let target_bank = non_blank(entry.target_bank.as_deref());

    let outstanding_balance = if operation_type.requires_outstanding_balance() {
        let balance = entry
            .outstanding_balance
            .as_ref()
            .filter(|v| !v.is_blank());
        if balance.is_none() || current_bank.is_none() {
            return Err(ValidationError::MissingBalanceOrBank);
        }
        let balance = required_amount(balance, "outstanding_balance")?;
        if balance < 0.0 {
            return Err(ValidationError::OutOfRange("outstanding_balance"));
        }
        balance
    } else {
        0.0
    };

    let total_operation_amount = installment_amount / coefficient;
    if !total_operation_amount.is_finite() {
        return Err(ValidationError::OutOfRange("coefficient"));
    }

    let (net_released_amount, note) = if operation_type.requires_outstanding_balance() {
        (
            total_operation_amount - outstanding_balance,
            settled_balance_note(outstanding_balance),
        )
    } else {
        (total_operation_amount, String::new())
    };

    Ok(ComputedOperation {
        operation_type,
        current_bank,
        target_bank,
        installment_amount,
        outstanding_balance,
        coefficient,
        term_months,
        total_operation_amount,
        net_released_amount,
        note,
    })
}

/// Annotation attached to operations that pay off a prior loan.
pub fn settled_balance_note(outstanding_balance: f64) -> String {
    format!("Saldo devedor quitado: R$ {}", format_brl(outstanding_balance))
}

fn required_amount(
    value: Option<&FieldValue>,
    field: &'static str,
) -> Result<f64, ValidationError> {
    let parsed = match value {
        Some(FieldValue::Number(n)) if n.is_finite() => Some(*n),
        Some(FieldValue::Text(s)) => parse_amount(s),
        _ => None,
    };

    parsed.ok_or(ValidationError::MissingRequiredField(field))
}

fn required_term(value: Option<&FieldValue>) -> Result<u32, ValidationError> {
    const FIELD: &str = "term_months";

    let months: i64 = match value {
        Some(FieldValue::Number(n)) if n.is_finite() && n.fract() == 0.0 => *n as i64,
        Some(FieldValue::Text(s)) => s
            .trim()
            .parse()
            .map_err(|_| ValidationError::MissingRequiredField(FIELD))?,
        _ => return Err(ValidationError::MissingRequiredField(FIELD)),
    };

    if months <= 0 {
        return Err(ValidationError::OutOfRange(FIELD));
    }

    u32::try_from(months).map_err(|_| ValidationError::OutOfRange(FIELD))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
