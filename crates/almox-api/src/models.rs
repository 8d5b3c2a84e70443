use serde::{Deserialize, Serialize};

/// Badge shown for items that don't carry a source tab
pub const DEFAULT_CATEGORY: &str = "Produto";

/// A stock item as served by `GET /items`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub nome: String,
    #[serde(default)]
    pub categoria: Option<String>,
    #[serde(default)]
    pub localizacao: Option<String>,
    /// Source tab of the spreadsheet (Mecânica, Eletrônica, Produto...)
    #[serde(default)]
    pub aba_origem: Option<String>,
    /// Comma-separated list of the original asset codes
    #[serde(default)]
    pub codigos_originais: Option<String>,
    /// Can go negative after a spreadsheet sync shrinks the total
    pub quantidade_disponivel: i64,
    #[serde(default)]
    pub quantidade_em_uso: Option<i64>,
    #[serde(default)]
    pub quantidade_total: Option<i64>,
    #[serde(default)]
    pub estoque_minimo: Option<i64>,
}

impl Item {
    /// Total quantity, falling back to the available one when the backend
    /// doesn't report a total (or reports zero)
    pub fn total_quantity(&self) -> i64 {
        match self.quantidade_total {
            Some(total) if total > 0 => total,
            _ => self.quantidade_disponivel,
        }
    }

    pub fn in_use(&self) -> i64 {
        self.quantidade_em_uso.unwrap_or(0)
    }

    pub fn category_badge(&self) -> &str {
        self.aba_origem
            .as_deref()
            .filter(|aba| !aba.is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
    }

    pub fn is_low_stock(&self) -> bool {
        self.quantidade_disponivel <= self.estoque_minimo.unwrap_or(0)
    }

    /// Share of the total currently checked out, rounded to whole percent
    pub fn usage_percent(&self) -> u32 {
        let total = self.total_quantity();
        if total <= 0 {
            return 0;
        }
        let in_use = self.in_use().max(0);
        ((in_use as f64 / total as f64) * 100.0).round() as u32
    }

    pub fn original_codes(&self) -> Vec<&str> {
        self.codigos_originais
            .as_deref()
            .map(|codes| {
                codes
                    .split(',')
                    .map(str::trim)
                    .filter(|code| !code.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First two codes plus a `+N` counter for the rest, as the detail card shows them.
    /// Only the first three codes are ever considered.
    pub fn codes_summary(&self) -> Option<String> {
        let codes: Vec<&str> = self.original_codes().into_iter().take(3).collect();
        if codes.is_empty() {
            return None;
        }

        let shown = codes[..codes.len().min(2)].join(", ");
        if codes.len() > 2 {
            Some(format!("{} +{}", shown, codes.len() - 2))
        } else {
            Some(shown)
        }
    }
}

/// Withdrawal or return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Retirada,
    Devolucao,
}

impl TransactionKind {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Retirada => "Retirada",
            TransactionKind::Devolucao => "Devolução",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            TransactionKind::Retirada => "📤",
            TransactionKind::Devolucao => "📥",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Body of `POST /transactions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub tipo: TransactionKind,
    pub item_id: i64,
    pub quantidade: u32,
    pub nome_pessoa: String,
}

/// Reply to `POST /transactions`. `novo_saldo` is the authoritative available quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<i64>,
    pub novo_saldo: i64,
    #[serde(default)]
    pub slack_notified: bool,
}

/// One row of `GET /history`, newest first as ordered by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: Option<i64>,
    pub tipo: TransactionKind,
    #[serde(default)]
    pub item_id: Option<i64>,
    #[serde(default)]
    pub item_nome: Option<String>,
    pub quantidade: u32,
    pub nome_pessoa: String,
    pub saldo_apos: i64,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SlackSettings {
    #[serde(default)]
    pub channel: String,
    pub enabled: bool,
    #[serde(default)]
    pub configured: bool,
}

/// Body of `POST /slack-settings`; only the toggle is writable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackSettingsUpdate {
    pub enabled: bool,
}

/// Spreadsheet sync report from `POST /sync`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub registros_lidos: Option<u64>,
    #[serde(default)]
    pub itens_unicos: Option<u64>,
    #[serde(default)]
    pub items_novos: Option<u64>,
    #[serde(default)]
    pub items_atualizados: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SyncResult {
    pub fn summary(&self) -> String {
        if let Some(error) = &self.error {
            return format!("Sincronização falhou: {}", error);
        }

        format!(
            "{} registros lidos, {} novos, {} atualizados",
            self.registros_lidos.unwrap_or(0),
            self.items_novos.unwrap_or(0),
            self.items_atualizados.unwrap_or(0)
        )
    }
}

/// A unit currently checked out, from `GET /items-em-uso`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInUse {
    #[serde(default)]
    pub id: Option<i64>,
    pub item_id: i64,
    #[serde(default)]
    pub codigo: Option<String>,
    pub nome_pessoa: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}
