// Application context: owns every piece of client state and wires it to the backend
use almox_api::{ItemInUse, TransactionKind};
use std::sync::Arc;
use std::time::Instant;

use crate::auth::Authenticator;
use crate::backend::InventoryBackend;
use crate::config::TimingConfig;
use crate::debounce::Debouncer;
use crate::history::{HistoryScope, HistoryView};
use crate::inventory::InventoryList;
use crate::navigation::{NavOutcome, Page, Router};
use crate::notify::{Notifier, Toast, ToastLevel};
use crate::search::SearchBar;
use crate::session::SessionStore;
use crate::settings::SlackPanel;
use crate::sync::{run_sync, ConnectionStatus, SyncScheduler};
use crate::transaction::{self, PendingTransaction, QuantityStepper};

/// Single owner of the item list, session flags and UI-facing state.
///
/// Handlers get `&mut AppContext`; nothing lives in globals. Every method that
/// can show a toast takes `now` so timing stays testable.
pub struct AppContext {
    backend: Arc<dyn InventoryBackend>,
    authenticator: Arc<dyn Authenticator>,
    timing: TimingConfig,
    session: SessionStore,
    router: Router,
    notifier: Notifier,
    inventory: InventoryList,
    filter_input: String,
    filter_debounce: Debouncer<String>,
    search: SearchBar,
    stepper: QuantityStepper,
    person_name: String,
    pending: Option<PendingTransaction>,
    history: HistoryView,
    slack: SlackPanel,
    in_use: Vec<ItemInUse>,
    connection: ConnectionStatus,
    sync: SyncScheduler,
    items_error: Option<String>,
    loading: bool,
}

impl AppContext {
    pub fn new(
        backend: Arc<dyn InventoryBackend>,
        authenticator: Arc<dyn Authenticator>,
        timing: TimingConfig,
        session: SessionStore,
    ) -> Self {
        let person_name = session.user_name().unwrap_or_default().to_string();

        Self {
            backend,
            authenticator,
            session,
            router: Router::default(),
            notifier: Notifier::new(timing.toast_duration()),
            inventory: InventoryList::default(),
            filter_input: String::new(),
            filter_debounce: Debouncer::new(timing.filter_debounce()),
            search: SearchBar::new(timing.search_debounce()),
            stepper: QuantityStepper::default(),
            person_name,
            pending: None,
            history: HistoryView::default(),
            slack: SlackPanel::default(),
            in_use: Vec::new(),
            connection: ConnectionStatus::Unknown,
            sync: SyncScheduler::new(timing.sync_interval()),
            items_error: None,
            loading: false,
            timing,
        }
    }

    // --- startup / data loading -------------------------------------------

    /// Fetch the item list once and probe the backend
    pub async fn start(&mut self, now: Instant) {
        tracing::info!("Starting stock client");
        self.reload_items(now).await;
        self.connection = ConnectionStatus::from(self.backend.check_connection().await);
    }

    pub async fn reload_items(&mut self, now: Instant) -> bool {
        self.load_items(now, false).await
    }

    /// A quiet load leaves the failure in `items_error` without raising a toast
    async fn load_items(&mut self, now: Instant, quiet: bool) -> bool {
        match self.backend.get_all_items().await {
            Ok(items) => {
                tracing::debug!("loaded {} items", items.len());
                self.inventory.replace_items(items);
                self.items_error = None;
                true
            }
            Err(e) => {
                tracing::warn!("Error loading items: {}", e);
                self.items_error = Some(format!("Erro ao carregar itens: {}", e));
                if !quiet {
                    self.toast(ToastLevel::Error, "Erro ao carregar itens", now);
                }
                false
            }
        }
    }

    // --- navigation / session ---------------------------------------------

    pub async fn navigate(&mut self, page: Page, now: Instant) -> NavOutcome {
        let outcome = self.router.navigate(page, self.session.is_logged_in());

        match outcome {
            NavOutcome::RedirectedToLogin { wanted } => {
                self.toast(
                    ToastLevel::Warning,
                    format!("Faça login para acessar {}", wanted.title()),
                    now,
                );
            }
            NavOutcome::Shown(shown) => self.enter_page(shown, now).await,
        }

        outcome
    }

    async fn enter_page(&mut self, page: Page, now: Instant) {
        match page {
            Page::Manage => match self.backend.get_items_in_use().await {
                Ok(in_use) => self.in_use = in_use,
                Err(e) => self.toast(ToastLevel::Error, format!("Erro: {}", e), now),
            },
            Page::Settings => {
                if let Err(e) = self.slack.load(self.backend.as_ref()).await {
                    self.toast(ToastLevel::Error, format!("Erro: {}", e), now);
                }
            }
            Page::Home | Page::Dashboard | Page::Login => {}
        }
    }

    pub async fn login(&mut self, user: &str, password: &str, now: Instant) -> bool {
        if !self.authenticator.authenticate(user, password).await {
            self.toast(ToastLevel::Error, "Usuário ou senha inválidos", now);
            return false;
        }

        if let Err(e) = self.session.set_logged_in(true) {
            tracing::warn!("Could not persist session: {}", e);
        }
        tracing::info!("Admin session started");
        self.toast(ToastLevel::Success, "Login realizado com sucesso!", now);

        let target = self.router.take_after_login();
        self.navigate(target, now).await;
        true
    }

    pub fn logout(&mut self, now: Instant) {
        if let Err(e) = self.session.clear() {
            tracing::warn!("Could not clear session file: {}", e);
        }
        self.person_name.clear();
        self.router.on_logout();
        self.toast(ToastLevel::Info, "Sessão encerrada", now);
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn current_page(&self) -> Page {
        self.router.current()
    }

    pub fn next_menu_page(&self) -> Page {
        self.router.next_menu_page()
    }

    // --- list filter --------------------------------------------------------

    /// Keystroke in the list filter; the list is refiltered once typing pauses
    pub fn set_filter_input(&mut self, input: impl Into<String>, now: Instant) {
        self.filter_input = input.into();
        self.filter_debounce.schedule(self.filter_input.clone(), now);
    }

    pub fn filter_input(&self) -> &str {
        &self.filter_input
    }

    pub fn inventory(&self) -> &InventoryList {
        &self.inventory
    }

    pub fn cycle_category(&mut self) {
        self.inventory.cycle_category();
    }

    pub fn cycle_sort(&mut self) {
        self.inventory.cycle_sort();
    }

    // --- remote search ------------------------------------------------------

    pub fn search(&self) -> &SearchBar {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut SearchBar {
        &mut self.search
    }

    /// Pick the highlighted remote result and show it in the detail panel
    pub fn pick_search_result(&mut self) -> bool {
        let Some(item) = self.search.select() else {
            return false;
        };
        let id = item.id;
        self.inventory.upsert(item);
        self.select_item(id)
    }

    // --- selection / transaction form --------------------------------------

    pub fn select_item(&mut self, id: i64) -> bool {
        if self.inventory.select(id).is_none() {
            return false;
        }
        self.stepper.reset();
        true
    }

    pub fn select_visible(&mut self, position: usize) -> bool {
        match self.inventory.visible_at(position).map(|item| item.id) {
            Some(id) => self.select_item(id),
            None => false,
        }
    }

    pub fn stepper(&self) -> QuantityStepper {
        self.stepper
    }

    pub fn stepper_mut(&mut self) -> &mut QuantityStepper {
        &mut self.stepper
    }

    pub fn person_name(&self) -> &str {
        &self.person_name
    }

    pub fn set_person_name(&mut self, name: impl Into<String>) {
        self.person_name = name.into();
    }

    /// Leaving the name field: remember a non-blank name for next time
    pub fn commit_person_name(&mut self) {
        if let Err(e) = self.session.set_user_name(&self.person_name) {
            tracing::warn!("Could not persist user name: {}", e);
        }
    }

    /// Run the local checks and, if they pass, park the transaction for confirmation
    pub fn request_transaction(&mut self, kind: TransactionKind, now: Instant) -> bool {
        let prepared = transaction::prepare(
            kind,
            self.inventory.selected(),
            &self.person_name,
            self.stepper.value(),
        );

        match prepared {
            Ok(pending) => {
                self.pending = Some(pending);
                true
            }
            Err(e) => {
                self.toast(e.toast_level(), e.to_string(), now);
                false
            }
        }
    }

    pub fn pending(&self) -> Option<&PendingTransaction> {
        self.pending.as_ref()
    }

    /// User declined: nothing is sent
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    /// User confirmed: send it and fold the server's answer into the list.
    ///
    /// Local state is only touched after the server replied, so a failure
    /// leaves nothing to roll back.
    pub async fn confirm_pending(&mut self, now: Instant) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };

        let result = transaction::submit(self.backend.as_ref(), &pending).await;

        match result {
            Ok(response) => {
                self.inventory.apply_transaction(
                    pending.request.item_id,
                    pending.kind(),
                    pending.request.quantidade,
                    response.novo_saldo,
                );
                self.stepper.reset();
                self.commit_person_name();
                self.toast(
                    ToastLevel::Success,
                    transaction::success_message(&pending, &response),
                    now,
                );
                true
            }
            Err(e) => {
                tracing::warn!("Transaction failed: {}", e);
                self.toast(ToastLevel::Error, format!("Erro: {}", e), now);
                false
            }
        }
    }

    // --- history / settings -------------------------------------------------

    pub fn history(&self) -> &HistoryView {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryView {
        &mut self.history
    }

    pub async fn open_history(&mut self, now: Instant) {
        let scope = HistoryScope::All {
            limit: self.timing.history_limit,
        };
        self.open_history_scope(scope, now).await;
    }

    /// History of the selected item only; falls back to the full history
    pub async fn open_item_history(&mut self, now: Instant) {
        let scope = match self.inventory.selected() {
            Some(item) => HistoryScope::Item {
                id: item.id,
                name: item.nome.clone(),
            },
            None => HistoryScope::All {
                limit: self.timing.history_limit,
            },
        };
        self.open_history_scope(scope, now).await;
    }

    async fn open_history_scope(&mut self, scope: HistoryScope, now: Instant) {
        if let Err(e) = self.history.open(self.backend.as_ref(), scope).await {
            self.toast(ToastLevel::Error, format!("Erro ao carregar histórico: {}", e), now);
        }
    }

    pub fn close_history(&mut self) {
        self.history.close();
    }

    pub fn slack(&self) -> &SlackPanel {
        &self.slack
    }

    pub async fn toggle_slack(&mut self, now: Instant) {
        match self.slack.toggle(self.backend.as_ref()).await {
            Ok(true) => self.toast(ToastLevel::Success, "Notificações do Slack ativadas", now),
            Ok(false) => self.toast(ToastLevel::Info, "Notificações do Slack desativadas", now),
            Err(e) => self.toast(ToastLevel::Error, format!("Erro: {}", e), now),
        }
    }

    pub fn items_in_use(&self) -> &[ItemInUse] {
        &self.in_use
    }

    // --- sync / connectivity -----------------------------------------------

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    /// Sync with the spreadsheet and reload the list.
    ///
    /// Automatic runs stay quiet on failure; manual ones report either way.
    pub async fn sync_now(&mut self, manual: bool, now: Instant) {
        self.sync.mark_run(now);
        let (result, status) = run_sync(self.backend.as_ref()).await;
        self.connection = status;

        match result {
            Ok(report) => {
                self.load_items(now, !manual).await;
                if manual {
                    let level = if report.error.is_some() {
                        ToastLevel::Error
                    } else {
                        ToastLevel::Success
                    };
                    self.toast(level, report.summary(), now);
                }
            }
            Err(e) if manual => {
                self.toast(ToastLevel::Error, format!("Erro na sincronização: {}", e), now)
            }
            Err(_) => {}
        }
    }

    // --- clock ---------------------------------------------------------------

    /// Whether the next `tick` at `now` will run the periodic sync
    pub fn sync_due(&self, now: Instant) -> bool {
        self.sync.is_due(now)
    }

    /// Advance timers: expire toasts, release debounced input, run the periodic sync
    pub async fn tick(&mut self, now: Instant) {
        self.notifier.expire(now);

        if let Some(query) = self.filter_debounce.poll(now) {
            self.inventory.set_query(query);
        }

        if let Err(e) = self.search.tick(self.backend.as_ref(), now).await {
            tracing::warn!("Search error: {}", e);
            self.toast(ToastLevel::Error, "Erro ao buscar itens", now);
        }

        if self.sync_due(now) {
            self.sync_now(false, now).await;
        }
    }

    /// Earliest moment `tick` has something to do
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.notifier.deadline(),
            self.filter_debounce.deadline(),
            self.search.deadline(),
            self.sync.next_due(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Set by the front end around slow calls so it can draw a spinner
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn items_error(&self) -> Option<&str> {
        self.items_error.as_deref()
    }

    pub fn toast(&mut self, level: ToastLevel, message: impl Into<String>, now: Instant) {
        self.notifier.show(level, message, now);
    }

    pub fn current_toast(&self) -> Option<&Toast> {
        self.notifier.current()
    }

    pub fn dismiss_toast(&mut self) {
        self.notifier.dismiss();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ConfiguredAuthenticator;
    use crate::backend::MockInventoryBackend;
    use crate::config::AuthConfig;
    use almox_api::{Item, TransactionResponse};
    use std::time::Duration;

    fn item(id: i64, nome: &str, disponivel: i64) -> Item {
        Item {
            id,
            nome: nome.into(),
            categoria: None,
            localizacao: None,
            aba_origem: Some("Mecânica".into()),
            codigos_originais: None,
            quantidade_disponivel: disponivel,
            quantidade_em_uso: Some(0),
            quantidade_total: Some(10),
            estoque_minimo: None,
        }
    }

    fn context(backend: MockInventoryBackend) -> AppContext {
        let auth = ConfiguredAuthenticator::new(&AuthConfig {
            admin_user: Some("admin".into()),
            admin_password: Some("segredo".into()),
        });
        AppContext::new(
            Arc::new(backend),
            Arc::new(auth),
            TimingConfig::default(),
            SessionStore::in_memory(),
        )
    }

    async fn loaded(mut backend: MockInventoryBackend) -> AppContext {
        backend
            .expect_get_all_items()
            .returning(|| Ok(vec![item(1, "Alicate", 3), item(2, "Trena", 8)]));
        backend.expect_check_connection().returning(|| true);
        let mut ctx = context(backend);
        ctx.start(Instant::now()).await;
        ctx
    }

    #[tokio::test]
    async fn test_start_loads_items_and_probes() {
        let ctx = loaded(MockInventoryBackend::new()).await;
        assert_eq!(ctx.inventory().all().len(), 2);
        assert_eq!(ctx.connection(), ConnectionStatus::Online);
        assert!(ctx.items_error().is_none());
    }

    #[tokio::test]
    async fn test_failed_load_shows_error_state() {
        let mut backend = MockInventoryBackend::new();
        backend.expect_get_all_items().returning(|| {
            Err(crate::Error::Api(almox_api::ApiError::Server {
                status: 500,
                message: "db locked".into(),
            }))
        });
        backend.expect_check_connection().returning(|| false);

        let mut ctx = context(backend);
        ctx.start(Instant::now()).await;

        assert!(ctx.items_error().unwrap().contains("db locked"));
        assert_eq!(ctx.current_toast().unwrap().level, ToastLevel::Error);
        assert_eq!(ctx.connection(), ConnectionStatus::Offline);
    }

    #[tokio::test]
    async fn test_withdrawal_over_stock_never_reaches_backend() {
        let mut backend = MockInventoryBackend::new();
        backend.expect_create_transaction().never();
        let mut ctx = loaded(backend).await;
        let now = Instant::now();

        ctx.select_item(1);
        ctx.set_person_name("Ana");
        for _ in 0..4 {
            ctx.stepper_mut().increment();
        }
        assert_eq!(ctx.stepper().value(), 5);

        assert!(!ctx.request_transaction(TransactionKind::Retirada, now));
        assert!(ctx.pending().is_none());
        assert_eq!(ctx.current_toast().unwrap().level, ToastLevel::Error);
    }

    #[tokio::test]
    async fn test_missing_name_is_a_warning() {
        let ctx_backend = MockInventoryBackend::new();
        let mut ctx = loaded(ctx_backend).await;
        ctx.select_item(2);

        assert!(!ctx.request_transaction(TransactionKind::Devolucao, Instant::now()));
        let toast = ctx.current_toast().unwrap();
        assert_eq!(toast.level, ToastLevel::Warning);
        assert_eq!(toast.message, "Digite seu nome");
    }

    #[tokio::test]
    async fn test_declined_confirmation_sends_nothing() {
        let mut backend = MockInventoryBackend::new();
        backend.expect_create_transaction().never();
        let mut ctx = loaded(backend).await;

        ctx.select_item(1);
        ctx.set_person_name("Ana");
        assert!(ctx.request_transaction(TransactionKind::Retirada, Instant::now()));
        ctx.cancel_pending();

        assert!(!ctx.confirm_pending(Instant::now()).await);
        assert_eq!(ctx.inventory().get(1).unwrap().quantidade_disponivel, 3);
    }

    #[tokio::test]
    async fn test_confirmed_withdrawal_takes_server_balance() {
        let mut backend = MockInventoryBackend::new();
        backend.expect_create_transaction().times(1).returning(|_| {
            Ok(TransactionResponse {
                success: true,
                message: Some("Retirada realizada com sucesso!".into()),
                transaction_id: Some(31),
                novo_saldo: 7,
                slack_notified: false,
            })
        });
        let mut ctx = loaded(backend).await;
        let now = Instant::now();

        ctx.select_item(2);
        ctx.set_person_name("Ana");
        ctx.stepper_mut().increment();
        assert!(ctx.request_transaction(TransactionKind::Retirada, now));
        assert!(ctx.confirm_pending(now).await);

        let item = ctx.inventory().selected().unwrap();
        assert_eq!(item.quantidade_disponivel, 7);
        assert_eq!(item.in_use(), 2);
        assert_eq!(ctx.stepper().value(), 1);
        assert_eq!(ctx.session().user_name(), Some("Ana"));
        assert_eq!(ctx.current_toast().unwrap().level, ToastLevel::Success);
    }

    #[tokio::test]
    async fn test_failed_transaction_changes_nothing() {
        let mut backend = MockInventoryBackend::new();
        backend.expect_create_transaction().returning(|_| {
            Err(crate::Error::Api(almox_api::ApiError::Server {
                status: 400,
                message: "Quantidade inválida! Apenas 0 unidades em uso".into(),
            }))
        });
        let mut ctx = loaded(backend).await;
        let now = Instant::now();

        ctx.select_item(1);
        ctx.set_person_name("Ana");
        ctx.request_transaction(TransactionKind::Devolucao, now);
        assert!(!ctx.confirm_pending(now).await);

        let item = ctx.inventory().get(1).unwrap();
        assert_eq!(item.quantidade_disponivel, 3);
        assert_eq!(item.in_use(), 0);
        let toast = ctx.current_toast().unwrap();
        assert_eq!(toast.level, ToastLevel::Error);
        assert_eq!(toast.message, "Erro: Quantidade inválida! Apenas 0 unidades em uso");
    }

    #[tokio::test]
    async fn test_admin_gate_then_login() {
        let mut backend = MockInventoryBackend::new();
        backend.expect_get_slack_settings().times(1).returning(|| {
            Ok(almox_api::SlackSettings {
                channel: "#estoque".into(),
                enabled: true,
                configured: true,
            })
        });
        let mut ctx = loaded(backend).await;
        let now = Instant::now();

        let outcome = ctx.navigate(Page::Settings, now).await;
        assert_eq!(outcome, NavOutcome::RedirectedToLogin { wanted: Page::Settings });
        assert_eq!(ctx.current_page(), Page::Login);
        assert_eq!(ctx.current_toast().unwrap().level, ToastLevel::Warning);

        assert!(!ctx.login("admin", "errado", now).await);
        assert_eq!(ctx.current_page(), Page::Login);

        assert!(ctx.login("admin", "segredo", now).await);
        assert_eq!(ctx.current_page(), Page::Settings);
        assert!(ctx.slack().settings().unwrap().enabled);

        ctx.logout(now);
        assert_eq!(ctx.current_page(), Page::Home);
        assert!(!ctx.is_logged_in());
    }

    #[tokio::test]
    async fn test_filter_is_debounced() {
        let mut backend = MockInventoryBackend::new();
        backend
            .expect_sync_with_sheets()
            .returning(|| Ok(almox_api::SyncResult::default()));
        let mut ctx = loaded(backend).await;
        let start = Instant::now();

        ctx.set_filter_input("t", start);
        ctx.set_filter_input("tr", start + Duration::from_millis(50));
        assert_eq!(ctx.inventory().visible_len(), 2);

        ctx.tick(start + Duration::from_millis(100)).await;
        assert_eq!(ctx.inventory().visible_len(), 2);

        ctx.tick(start + Duration::from_millis(250)).await;
        assert_eq!(ctx.inventory().query(), "tr");
        assert_eq!(ctx.inventory().visible_len(), 1);
    }

    #[tokio::test]
    async fn test_auto_sync_is_quiet_and_reloads() {
        let mut backend = MockInventoryBackend::new();
        backend
            .expect_sync_with_sheets()
            .times(1)
            .returning(|| Ok(almox_api::SyncResult::default()));
        let mut ctx = loaded(backend).await;
        let now = Instant::now();

        ctx.tick(now).await;
        assert!(ctx.current_toast().is_none());
        // Not due again until the interval passes
        ctx.tick(now + Duration::from_secs(1)).await;
        assert!(ctx.next_deadline().is_some());
    }

    #[tokio::test]
    async fn test_auto_sync_reload_failure_stays_quiet() {
        let mut backend = MockInventoryBackend::new();
        backend
            .expect_sync_with_sheets()
            .returning(|| Ok(almox_api::SyncResult::default()));
        backend.expect_check_connection().returning(|| true);
        backend.expect_get_all_items().returning(|| {
            Err(crate::Error::Api(almox_api::ApiError::Server {
                status: 503,
                message: "planilha ocupada".into(),
            }))
        });
        let mut ctx = context(backend);
        let now = Instant::now();

        assert!(ctx.sync_due(now));
        ctx.tick(now).await;
        assert!(!ctx.sync_due(now));
        assert!(ctx.current_toast().is_none());
        assert!(ctx.items_error().unwrap().contains("planilha ocupada"));

        // An explicit reload still reports it
        assert!(!ctx.reload_items(now).await);
        assert_eq!(ctx.current_toast().unwrap().message, "Erro ao carregar itens");
    }
}
