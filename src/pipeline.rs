use serde::{Deserialize, Serialize};

use crate::currency::format_brl_compact;

/// Column of the lead board. Leads move left to right as the proposal
/// advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadStage {
    #[serde(rename = "novo")]
    New,
    #[serde(rename = "analise")]
    UnderReview,
    #[serde(rename = "retencao")]
    BankRetention,
    #[serde(rename = "documentacao")]
    Documentation,
    #[serde(rename = "pagamento")]
    Payment,
    #[serde(rename = "finalizado")]
    Completed,
}

impl LeadStage {
    pub const ALL: [LeadStage; 6] = [
        LeadStage::New,
        LeadStage::UnderReview,
        LeadStage::BankRetention,
        LeadStage::Documentation,
        LeadStage::Payment,
        LeadStage::Completed,
    ];

    pub fn id(self) -> &'static str {
        match self {
            LeadStage::New => "novo",
            LeadStage::UnderReview => "analise",
            LeadStage::BankRetention => "retencao",
            LeadStage::Documentation => "documentacao",
            LeadStage::Payment => "pagamento",
            LeadStage::Completed => "finalizado",
        }
    }

    /// Column title on the board.
    pub fn title(self) -> &'static str {
        match self {
            LeadStage::New => "Novo Lead",
            LeadStage::UnderReview => "Proposta em Análise",
            LeadStage::BankRetention => "Retenção Bancária",
            LeadStage::Documentation => "Documentação",
            LeadStage::Payment => "Em Pagamento",
            LeadStage::Completed => "Finalizado",
        }
    }
}

/// Lead fields interpolated into stage messages.
#[derive(Debug, Clone, Default)]
pub struct LeadSummary<'a> {
    pub name: &'a str,
    pub bank: Option<&'a str>,
    pub requested_amount: Option<f64>,
}

/// Message sent to the customer when their lead enters `stage`.
pub fn stage_update_message(stage: LeadStage, lead: &LeadSummary<'_>) -> String {
    match stage {
        LeadStage::UnderReview => format!(
            "🔍 Olá {}! Sua proposta está agora em análise. Em breve teremos novidades!",
            lead.name
        ),
        LeadStage::BankRetention => format!(
            "🏦 Sua proposta foi enviada para o {}. Aguardando retorno bancário.",
            lead.bank.unwrap_or("banco")
        ),
        LeadStage::Documentation => {
            "📄 Precisamos de documentos. Por favor, envie os documentos solicitados.".to_string()
        }
        LeadStage::Payment => {
            "✅ Sua proposta foi aprovada! Estamos processando o pagamento.".to_string()
        }
        LeadStage::Completed => format!(
            "🎉 Tudo certo! Seu crédito de R$ {} foi liberado!",
            format_brl_compact(lead.requested_amount.unwrap_or(0.0))
        ),
        LeadStage::New => "Status atualizado!".to_string(),
    }
}

/// Stage change worth notifying, or `None` when the lead stays where it was.
pub fn stage_transition(previous: Option<LeadStage>, next: LeadStage) -> Option<LeadStage> {
    match previous {
        Some(prev) if prev == next => None,
        _ => Some(next),
    }
}
