/// Unit tests for the credit simulation calculator
/// Covers the reference scenarios, validation failures and purity
use crm_consignado_api::errors::ValidationError;
use crm_consignado_api::models::{OperationEntry, OperationType};
use crm_consignado_api::simulation::compute_operation;

const EPS: f64 = 1e-9;

fn debt_purchase() -> OperationEntry {
    OperationEntry::new("debt-purchase")
        .with_current_bank("Banco X")
        .with_installment("1250.00")
        .with_outstanding_balance("15000.00")
        .with_coefficient("45.5")
        .with_term_months("84")
}

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_new_contract_releases_total() {
        let entry = OperationEntry::new("new-contract")
            .with_installment("1250.00")
            .with_coefficient("45.5")
            .with_term_months("84");

        let op = compute_operation(&entry).unwrap();

        assert_eq!(op.operation_type(), OperationType::NewContract);
        assert!((op.total_operation_amount() - 1250.0 / 45.5).abs() < EPS);
        assert!((op.total_operation_amount() - 27.47).abs() < 0.01);
        assert_eq!(op.net_released_amount(), op.total_operation_amount());
        assert_eq!(op.note(), "");
    }

    #[test]
    fn test_debt_purchase_subtracts_balance_and_may_go_negative() {
        let op = compute_operation(&debt_purchase()).unwrap();

        assert!((op.total_operation_amount() - 27.47).abs() < 0.01);
        assert!((op.net_released_amount() - (1250.0 / 45.5 - 15000.0)).abs() < EPS);
        assert!((op.net_released_amount() - -14972.53).abs() < 0.01);
        assert_eq!(op.note(), "Saldo devedor quitado: R$ 15.000,00");
        assert_eq!(op.current_bank(), Some("Banco X"));
        assert_eq!(op.outstanding_balance(), 15000.0);
    }

    #[test]
    fn test_zero_coefficient_rejected() {
        let entry = OperationEntry::new("new-contract")
            .with_installment("1250.00")
            .with_coefficient("0")
            .with_term_months("84");

        assert_eq!(
            compute_operation(&entry),
            Err(ValidationError::ZeroCoefficient)
        );
    }

    #[test]
    fn test_zero_coefficient_wins_over_other_problems() {
        let entry = OperationEntry::new("not-a-type").with_coefficient(0.0);
        assert_eq!(
            compute_operation(&entry),
            Err(ValidationError::ZeroCoefficient)
        );

        let entry = debt_purchase().with_coefficient("0,00");
        assert_eq!(
            compute_operation(&entry),
            Err(ValidationError::ZeroCoefficient)
        );
    }

    #[test]
    fn test_pt_br_form_values() {
        let entry = OperationEntry::new("Portabilidade com troco")
            .with_current_bank("Itaú")
            .with_installment("R$ 1.250,00")
            .with_outstanding_balance("10.000,00")
            .with_coefficient("0,02")
            .with_term_months("84");

        let op = compute_operation(&entry).unwrap();
        assert!((op.total_operation_amount() - 62_500.0).abs() < 1e-6);
        assert!((op.net_released_amount() - 52_500.0).abs() < 1e-6);
    }
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    #[test]
    fn test_balance_required_types_need_balance_and_bank() {
        for op_type in [
            "portability-with-cashback",
            "portability-with-reduction",
            "debt-purchase",
        ] {
            let no_balance = OperationEntry::new(op_type)
                .with_current_bank("Banco X")
                .with_installment(1250.0)
                .with_coefficient(45.5)
                .with_term_months(84u32);
            assert_eq!(
                compute_operation(&no_balance),
                Err(ValidationError::MissingBalanceOrBank),
                "{}",
                op_type
            );

            let no_bank = OperationEntry::new(op_type)
                .with_installment(1250.0)
                .with_outstanding_balance(100.0)
                .with_coefficient(45.5)
                .with_term_months(84u32);
            assert_eq!(
                compute_operation(&no_bank),
                Err(ValidationError::MissingBalanceOrBank),
                "{}",
                op_type
            );

            let blank = no_bank.clone().with_current_bank("  ").with_outstanding_balance("");
            assert_eq!(
                compute_operation(&blank),
                Err(ValidationError::MissingBalanceOrBank),
                "{}",
                op_type
            );
        }
    }

    #[test]
    fn test_other_types_need_neither() {
        for op_type in ["consigned-card", "card-purchase", "new-contract", "refinance"] {
            let entry = OperationEntry::new(op_type)
                .with_installment(500.0)
                .with_coefficient(0.025)
                .with_term_months(72u32);
            let op = compute_operation(&entry).unwrap();
            assert_eq!(op.note(), "");
            assert!((op.net_released_amount() - 20_000.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_missing_required_fields() {
        let full = OperationEntry::new("new-contract")
            .with_installment("1250")
            .with_coefficient("45.5")
            .with_term_months("84");

        let mut no_installment = full.clone();
        no_installment.installment_amount = None;
        assert_eq!(
            compute_operation(&no_installment),
            Err(ValidationError::MissingRequiredField("installment_amount"))
        );

        let mut no_coefficient = full.clone();
        no_coefficient.coefficient = None;
        assert_eq!(
            compute_operation(&no_coefficient),
            Err(ValidationError::MissingRequiredField("coefficient"))
        );

        let mut no_term = full.clone();
        no_term.term_months = None;
        assert_eq!(
            compute_operation(&no_term),
            Err(ValidationError::MissingRequiredField("term_months"))
        );

        let unparsable = full.clone().with_installment("mil reais");
        assert_eq!(
            compute_operation(&unparsable),
            Err(ValidationError::MissingRequiredField("installment_amount"))
        );

        let mut no_type = full;
        no_type.operation_type = String::new();
        assert_eq!(
            compute_operation(&no_type),
            Err(ValidationError::MissingRequiredField("operation_type"))
        );
    }

    #[test]
    fn test_unknown_operation_type() {
        let entry = OperationEntry::new("leasing")
            .with_installment(1.0)
            .with_coefficient(1.0)
            .with_term_months(1u32);

        assert_eq!(
            compute_operation(&entry),
            Err(ValidationError::UnknownOperationType("leasing".to_string()))
        );
    }

    #[test]
    fn test_non_positive_installment() {
        let entry = OperationEntry::new("refinance")
            .with_installment(0.0)
            .with_coefficient(1.0)
            .with_term_months(1u32);

        assert_eq!(
            compute_operation(&entry),
            Err(ValidationError::OutOfRange("installment_amount"))
        );
    }
}

#[cfg(test)]
mod purity_tests {
    use super::*;

    #[test]
    fn test_compute_is_idempotent_and_leaves_input_alone() {
        let entry = debt_purchase();
        let snapshot = entry.clone();

        let first = compute_operation(&entry).unwrap();
        let second = compute_operation(&entry).unwrap();

        assert_eq!(first, second);
        assert_eq!(entry, snapshot);
    }
}
