use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::ValidationError;
use crate::pipeline::LeadStage;

// ============ Simulation Models ============

/// Category of loan transaction being simulated.
///
/// The set is closed. Each variant has a kebab-case identifier (used on the
/// wire) and the Portuguese label shown to agents and customers; both are
/// accepted when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationType {
    PortabilityWithCashback,
    PortabilityWithReduction,
    DebtPurchase,
    ConsignedCard,
    CardPurchase,
    NewContract,
    Refinance,
}

impl OperationType {
    pub const ALL: [OperationType; 7] = [
        OperationType::PortabilityWithCashback,
        OperationType::PortabilityWithReduction,
        OperationType::DebtPurchase,
        OperationType::ConsignedCard,
        OperationType::CardPurchase,
        OperationType::NewContract,
        OperationType::Refinance,
    ];

    /// Stable wire identifier.
    pub fn id(self) -> &'static str {
        match self {
            OperationType::PortabilityWithCashback => "portability-with-cashback",
            OperationType::PortabilityWithReduction => "portability-with-reduction",
            OperationType::DebtPurchase => "debt-purchase",
            OperationType::ConsignedCard => "consigned-card",
            OperationType::CardPurchase => "card-purchase",
            OperationType::NewContract => "new-contract",
            OperationType::Refinance => "refinance",
        }
    }

    /// Label used in the proposal message.
    pub fn label(self) -> &'static str {
        match self {
            OperationType::PortabilityWithCashback => "Portabilidade com troco",
            OperationType::PortabilityWithReduction => "Portabilidade com redução",
            OperationType::DebtPurchase => "Compra de dívida",
            OperationType::ConsignedCard => "Cartão consignado",
            OperationType::CardPurchase => "Compra de cartão",
            OperationType::NewContract => "Contrato novo",
            OperationType::Refinance => "Refin",
        }
    }

    /// Membership in the balance-required set: these operations settle a
    /// prior loan, so they need the outstanding balance and the current bank,
    /// and the balance is subtracted from the released amount.
    pub fn requires_outstanding_balance(self) -> bool {
        matches!(
            self,
            OperationType::PortabilityWithCashback
                | OperationType::PortabilityWithReduction
                | OperationType::DebtPurchase
        )
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OperationType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.is_empty() {
            return Err(ValidationError::MissingRequiredField("operation_type"));
        }

        OperationType::ALL
            .into_iter()
            .find(|op| {
                op.id().eq_ignore_ascii_case(wanted)
                    || op.label().to_lowercase() == wanted.to_lowercase()
            })
            .ok_or_else(|| ValidationError::UnknownOperationType(wanted.to_string()))
    }
}

/// A form value as typed by the agent: either a JSON number or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// True for empty or whitespace-only text.
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.trim().is_empty())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Raw simulation-form values for one operation, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationEntry {
    #[serde(default)]
    pub operation_type: String,
    #[serde(default)]
    pub current_bank: Option<String>,
    #[serde(default)]
    pub target_bank: Option<String>,
    #[serde(default)]
    pub installment_amount: Option<FieldValue>,
    #[serde(default)]
    pub outstanding_balance: Option<FieldValue>,
    #[serde(default)]
    pub coefficient: Option<FieldValue>,
    #[serde(default)]
    pub term_months: Option<FieldValue>,
}

impl OperationEntry {
    pub fn new(operation_type: impl Into<String>) -> Self {
        Self {
            operation_type: operation_type.into(),
            ..Self::default()
        }
    }

    pub fn with_current_bank(mut self, bank: impl Into<String>) -> Self {
        self.current_bank = Some(bank.into());
        self
    }

    pub fn with_target_bank(mut self, bank: impl Into<String>) -> Self {
        self.target_bank = Some(bank.into());
        self
    }

    pub fn with_installment(mut self, value: impl Into<FieldValue>) -> Self {
        self.installment_amount = Some(value.into());
        self
    }

    pub fn with_outstanding_balance(mut self, value: impl Into<FieldValue>) -> Self {
        self.outstanding_balance = Some(value.into());
        self
    }

    pub fn with_coefficient(mut self, value: impl Into<FieldValue>) -> Self {
        self.coefficient = Some(value.into());
        self
    }

    pub fn with_term_months(mut self, value: impl Into<FieldValue>) -> Self {
        self.term_months = Some(value.into());
        self
    }
}

/// A validated operation with its derived amounts.
///
/// Only [`crate::simulation::compute_operation`] builds these; the fields are
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedOperation {
    pub(crate) operation_type: OperationType,
    pub(crate) current_bank: Option<String>,
    pub(crate) target_bank: Option<String>,
    pub(crate) installment_amount: f64,
    pub(crate) outstanding_balance: f64,
    pub(crate) coefficient: f64,
    pub(crate) term_months: u32,
    pub(crate) total_operation_amount: f64,
    pub(crate) net_released_amount: f64,
    pub(crate) note: String,
}

impl ComputedOperation {
    pub fn operation_type(&self) -> OperationType {
        self.operation_type
    }

    pub fn current_bank(&self) -> Option<&str> {
        self.current_bank.as_deref()
    }

    pub fn target_bank(&self) -> Option<&str> {
        self.target_bank.as_deref()
    }

    pub fn installment_amount(&self) -> f64 {
        self.installment_amount
    }

    /// Zero for operation types that do not settle a prior loan.
    pub fn outstanding_balance(&self) -> f64 {
        self.outstanding_balance
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    pub fn term_months(&self) -> u32 {
        self.term_months
    }

    pub fn total_operation_amount(&self) -> f64 {
        self.total_operation_amount
    }

    /// May be negative when the balance exceeds the computed total.
    pub fn net_released_amount(&self) -> f64 {
        self.net_released_amount
    }

    /// Empty unless the operation settles an outstanding balance.
    pub fn note(&self) -> &str {
        &self.note
    }
}

// ============ API Payloads ============

/// Response for `POST /api/v1/drafts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftCreatedResponse {
    pub session_id: Uuid,
}

/// Current state of a proposal draft.
#[derive(Debug, Clone, Serialize)]
pub struct DraftResponse {
    pub session_id: Uuid,
    pub operations: Vec<ComputedOperation>,
    pub total_released: f64,
}

/// Response for appending an operation to a draft.
#[derive(Debug, Clone, Serialize)]
pub struct OperationAddedResponse {
    /// Position of the new operation in the draft.
    pub index: usize,
    pub operation: ComputedOperation,
    pub draft_size: usize,
}

/// Proposal preview text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalPreview {
    pub message: String,
    pub operations: usize,
    pub total_released: f64,
}

/// Body for `POST /api/v1/drafts/:id/send`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendProposalRequest {
    /// Customer phone number in any common Brazilian format.
    pub recipient: String,
}

/// Outcome of a message handed to the messaging collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Provider message id, when the provider returns one.
    pub message_id: Option<String>,
    pub recipient: String,
    pub sent_at: DateTime<Utc>,
}

/// Response for a proposal handed to the messaging collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalSent {
    pub receipt: DeliveryReceipt,
    /// Exact text that was sent.
    pub message: String,
    pub operations: usize,
    pub total_released: f64,
}

/// Body for `POST /api/v1/leads/stage-notifications`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageNotificationRequest {
    pub phone: String,
    pub name: String,
    #[serde(default)]
    pub bank: Option<String>,
    #[serde(default)]
    pub requested_amount: Option<f64>,
    pub stage: LeadStage,
    #[serde(default)]
    pub previous_stage: Option<LeadStage>,
}
