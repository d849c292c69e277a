//! Proposal message aggregation.
//!
//! The text built here is handed verbatim to WhatsApp, so the layout
//! (emoji, `*bold*` markers, blank lines) is part of the contract with the
//! channel. Output is a pure function of the operations and the link: the
//! same draft always produces the same bytes, which keeps a retried send
//! identical to the first attempt.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::currency::format_brl;
use crate::errors::AppError;
use crate::models::ComputedOperation;

/// Bytes escaped in the pre-filled text. Matches `encodeURIComponent`, which
/// leaves `-_.!~*'()` alone.
const MESSAGE_TEXT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const HEADER: &str = "💰 *Simulação de Crédito*";
const CALL_TO_ACTION: &str = "📲 Deseja prosseguir com esta proposta?";

/// Formats `operations` (in the given order) into the proposal message.
///
/// `acceptance_link` is embedded as-is; see [`build_acceptance_link`].
/// Callers must not pass an empty slice.
pub fn format_proposal(operations: &[ComputedOperation], acceptance_link: &str) -> String {
    debug_assert!(
        !operations.is_empty(),
        "a proposal needs at least one operation"
    );

    let mut message = String::new();
    message.push_str(HEADER);
    message.push_str("\n\n");

    for (i, op) in operations.iter().enumerate() {
        push_operation_block(&mut message, i + 1, op);
    }

    message.push_str(&format!(
        "✅ *TOTAL LIBERADO: R$ {}*\n\n",
        format_brl(grand_total(operations))
    ));
    message.push_str(CALL_TO_ACTION);
    message.push('\n');
    message.push_str(&format!("👉 [Aceitar Proposta]({})", acceptance_link));

    message
}

fn push_operation_block(message: &mut String, position: usize, op: &ComputedOperation) {
    message.push_str(&format!("📋 *Operação {}*\n", position));
    message.push_str(&format!("Tipo: {}\n", op.operation_type().label()));
    if let Some(bank) = op.current_bank() {
        message.push_str(&format!("🏦 Banco atual: {}\n", bank));
    }
    if let Some(bank) = op.target_bank() {
        message.push_str(&format!("🏦 Banco da operação: {}\n", bank));
    }

    message.push_str("\n📊 Dados:\n");
    message.push_str(&format!(
        "Parcela: R$ {}\n",
        format_brl(op.installment_amount())
    ));
    message.push_str(&format!("Prazo: {} meses\n", op.term_months()));

    message.push_str("\n💵 Resultado:\n");
    if !op.note().is_empty() {
        message.push_str(op.note());
        message.push('\n');
    }
    message.push_str(&format!(
        "💰 Valor líquido liberado: R$ {}\n\n",
        format_brl(op.net_released_amount())
    ));
}

/// Sum of the net released amounts. Negative amounts count as they are.
pub fn grand_total(operations: &[ComputedOperation]) -> f64 {
    operations.iter().map(|op| op.net_released_amount()).sum()
}

/// Builds the `wa.me` deep link the customer taps to accept the proposal.
///
/// Every non-digit is stripped from `whatsapp_number`. The pre-filled text is
/// percent-encoded like `encodeURIComponent` (spaces become `%20`, `!'()*`
/// stay as they are). The link is checked with [`Url`] but returned as built,
/// since `Url` would re-escape `'` in the query.
pub fn build_acceptance_link(whatsapp_number: &str, message: &str) -> Result<String, AppError> {
    let digits: String = whatsapp_number
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Acceptance number '{}' has no digits",
            whatsapp_number
        )));
    }

    let link = format!(
        "https://wa.me/{}?text={}",
        digits,
        utf8_percent_encode(message, MESSAGE_TEXT)
    );
    Url::parse(&link)
        .map_err(|e| AppError::InternalError(format!("Invalid acceptance link: {}", e)))?;

    Ok(link)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptance_link_strips_formatting() {
        let link = build_acceptance_link("+55 (51) 99535-3698", "Aceito a proposta").unwrap();
        assert_eq!(
            link,
            "https://wa.me/5551995353698?text=Aceito%20a%20proposta"
        );
    }

    #[test]
    fn test_acceptance_link_encodes_accents() {
        let link = build_acceptance_link("5511987654321", "Sim, quero a simulação").unwrap();
        assert_eq!(
            link,
            "https://wa.me/5511987654321?text=Sim%2C%20quero%20a%20simula%C3%A7%C3%A3o"
        );
    }

    #[test]
    fn test_acceptance_link_keeps_unreserved_marks() {
        let link = build_acceptance_link("5551995353698", "Aceito a proposta! (sim)").unwrap();
        assert_eq!(
            link,
            "https://wa.me/5551995353698?text=Aceito%20a%20proposta!%20(sim)"
        );

        let link = build_acceptance_link("5551995353698", "it's *ok* ~ 100% & more").unwrap();
        assert_eq!(
            link,
            "https://wa.me/5551995353698?text=it's%20*ok*%20~%20100%25%20%26%20more"
        );
    }

    #[test]
    fn test_acceptance_link_requires_digits() {
        let err = build_acceptance_link("n/a", "Aceito").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_grand_total_of_empty_is_zero() {
        assert_eq!(grand_total(&[]), 0.0);
    }
}
