// Withdrawal/return flow: stepper, local checks, confirmation, submission
use almox_api::{Item, TransactionKind, TransactionRequest, TransactionResponse};

use crate::backend::InventoryBackend;
use crate::error::ValidationError;

/// Integer quantity input, never below 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityStepper {
    value: u32,
}

impl Default for QuantityStepper {
    fn default() -> Self {
        Self { value: 1 }
    }
}

impl QuantityStepper {
    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn increment(&mut self) {
        self.value = self.value.saturating_add(1);
    }

    pub fn decrement(&mut self) {
        self.value = self.value.saturating_sub(1).max(1);
    }

    /// Validate typed input back to a positive integer; garbage becomes 1
    pub fn set_from_input(&mut self, input: &str) {
        self.value = input.trim().parse::<u32>().unwrap_or(1).max(1);
    }

    pub fn reset(&mut self) {
        self.value = 1;
    }
}

/// A transaction that passed the local checks and is waiting for the user to confirm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub request: TransactionRequest,
    pub item_name: String,
}

impl PendingTransaction {
    pub fn kind(&self) -> TransactionKind {
        self.request.tipo
    }

    pub fn confirmation_title(&self) -> String {
        format!("Confirmar {}", self.kind().label())
    }

    pub fn confirmation_message(&self) -> String {
        let verb = match self.kind() {
            TransactionKind::Retirada => "retirar",
            TransactionKind::Devolucao => "devolver",
        };
        format!(
            "Deseja {} {} unidade(s) de {}?",
            verb, self.request.quantidade, self.item_name
        )
    }
}

/// Local pre-flight checks. Nothing here touches the network.
///
/// Withdrawals can't ask for more than is on the shelf; returns are checked
/// by the server against what is actually in use.
pub fn prepare(
    kind: TransactionKind,
    item: Option<&Item>,
    person: &str,
    quantity: u32,
) -> Result<PendingTransaction, ValidationError> {
    let item = item.ok_or(ValidationError::NoItemSelected)?;

    let person = person.trim();
    if person.is_empty() {
        return Err(ValidationError::MissingName);
    }

    if quantity == 0 {
        return Err(ValidationError::InvalidQuantity);
    }

    if kind == TransactionKind::Retirada && i64::from(quantity) > item.quantidade_disponivel {
        return Err(ValidationError::InsufficientStock {
            available: item.quantidade_disponivel.max(0),
            requested: quantity,
        });
    }

    Ok(PendingTransaction {
        request: TransactionRequest {
            tipo: kind,
            item_id: item.id,
            quantidade: quantity,
            nome_pessoa: person.to_string(),
        },
        item_name: item.nome.clone(),
    })
}

/// Send a confirmed transaction
pub async fn submit(
    backend: &dyn InventoryBackend,
    pending: &PendingTransaction,
) -> crate::Result<TransactionResponse> {
    tracing::info!(
        "{} of {} x {} by {}",
        pending.kind(),
        pending.request.quantidade,
        pending.item_name,
        pending.request.nome_pessoa
    );
    backend.create_transaction(pending.request.clone()).await
}

/// Toast text after the server accepted a transaction
pub fn success_message(pending: &PendingTransaction, response: &TransactionResponse) -> String {
    let base = response
        .message
        .clone()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("{} realizada com sucesso!", pending.kind().label()));

    if response.slack_notified {
        format!("{} (Slack notificado)", base)
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockInventoryBackend;

    fn drill() -> Item {
        Item {
            id: 10,
            nome: "Furadeira".into(),
            categoria: Some("Ferramentas".into()),
            localizacao: None,
            aba_origem: Some("Mecânica".into()),
            codigos_originais: None,
            quantidade_disponivel: 3,
            quantidade_em_uso: Some(1),
            quantidade_total: Some(4),
            estoque_minimo: Some(1),
        }
    }

    #[test]
    fn test_stepper_clamps_at_one() {
        let mut stepper = QuantityStepper::default();
        stepper.decrement();
        assert_eq!(stepper.value(), 1);

        stepper.increment();
        stepper.increment();
        assert_eq!(stepper.value(), 3);
        stepper.decrement();
        assert_eq!(stepper.value(), 2);

        stepper.reset();
        assert_eq!(stepper.value(), 1);
    }

    #[test]
    fn test_stepper_manual_entry() {
        let mut stepper = QuantityStepper::default();
        stepper.set_from_input(" 12 ");
        assert_eq!(stepper.value(), 12);
        stepper.set_from_input("0");
        assert_eq!(stepper.value(), 1);
        stepper.set_from_input("-4");
        assert_eq!(stepper.value(), 1);
        stepper.set_from_input("abc");
        assert_eq!(stepper.value(), 1);
    }

    #[test]
    fn test_prepare_requires_item() {
        assert_eq!(
            prepare(TransactionKind::Retirada, None, "Ana", 1),
            Err(ValidationError::NoItemSelected)
        );
    }

    #[test]
    fn test_prepare_requires_name() {
        let item = drill();
        assert_eq!(
            prepare(TransactionKind::Devolucao, Some(&item), "   ", 1),
            Err(ValidationError::MissingName)
        );
    }

    #[test]
    fn test_withdrawal_over_stock_is_rejected() {
        let item = drill();
        assert_eq!(
            prepare(TransactionKind::Retirada, Some(&item), "Ana", 5),
            Err(ValidationError::InsufficientStock {
                available: 3,
                requested: 5
            })
        );
    }

    #[test]
    fn test_negative_balance_blocks_withdrawal_but_not_return() {
        let mut item = drill();
        item.quantidade_disponivel = -2;

        assert_eq!(
            prepare(TransactionKind::Retirada, Some(&item), "Ana", 1),
            Err(ValidationError::InsufficientStock {
                available: 0,
                requested: 1
            })
        );
        assert!(prepare(TransactionKind::Devolucao, Some(&item), "Ana", 1).is_ok());
    }

    #[test]
    fn test_return_is_not_capped_by_stock() {
        let item = drill();
        let pending = prepare(TransactionKind::Devolucao, Some(&item), " Ana ", 5).unwrap();
        assert_eq!(pending.request.nome_pessoa, "Ana");
        assert_eq!(pending.request.quantidade, 5);
    }

    #[test]
    fn test_confirmation_text() {
        let item = drill();
        let pending = prepare(TransactionKind::Retirada, Some(&item), "Ana", 3).unwrap();
        assert_eq!(pending.confirmation_title(), "Confirmar Retirada");
        assert_eq!(
            pending.confirmation_message(),
            "Deseja retirar 3 unidade(s) de Furadeira?"
        );
    }

    #[tokio::test]
    async fn test_submit_sends_request_verbatim() {
        let item = drill();
        let pending = prepare(TransactionKind::Retirada, Some(&item), "Ana", 2).unwrap();
        let expected = pending.request.clone();

        let mut backend = MockInventoryBackend::new();
        backend
            .expect_create_transaction()
            .withf(move |request| *request == expected)
            .times(1)
            .returning(|_| {
                Ok(TransactionResponse {
                    success: true,
                    message: None,
                    transaction_id: Some(1),
                    novo_saldo: 1,
                    slack_notified: true,
                })
            });

        let response = submit(&backend, &pending).await.unwrap();
        assert_eq!(response.novo_saldo, 1);
        assert_eq!(
            success_message(&pending, &response),
            "Retirada realizada com sucesso! (Slack notificado)"
        );
    }
}
