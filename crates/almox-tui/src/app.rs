// TUI application state and key handling
use almox_core::{AppContext, Page, TransactionKind};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use ratatui::widgets::ListState;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,          // Navigating the list and pages
    Filtering,       // Typing in the local list filter
    QuickSearch,     // Typing in the remote search box
    EditingName,     // Person name field
    EditingQuantity, // Typing a quantity directly
    LoginUser,
    LoginPassword,
}

/// Anything that has to wait on the backend. Key handling stays synchronous
/// and hands these to the runner, which can draw the spinner first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Navigate(Page),
    Login,
    ConfirmTransaction,
    OpenHistory,
    OpenItemHistory,
    ToggleSlack,
    Sync,
    Reload,
}

impl Action {
    pub fn shows_spinner(&self) -> bool {
        matches!(
            self,
            Action::ConfirmTransaction
                | Action::OpenHistory
                | Action::OpenItemHistory
                | Action::Sync
                | Action::Reload
        )
    }
}

pub struct App {
    pub ctx: AppContext,
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub list_state: ListState,
    pub quantity_input: String,
    pub login_user: String,
    pub login_password: String,
    // Last drawn history popup, for click-outside-to-close
    pub history_area: Option<Rect>,
}

impl App {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            should_quit: false,
            input_mode: InputMode::Normal,
            list_state: ListState::default(),
            quantity_input: String::new(),
            login_user: String::new(),
            login_password: String::new(),
            history_area: None,
        }
    }

    /// Keep the highlighted row on the selected item after the view changed
    pub fn sync_list_state(&mut self) {
        self.list_state.select(self.ctx.inventory().selected_position());
    }

    pub fn next_item(&mut self) {
        let len = self.ctx.inventory().visible_len();
        if len == 0 {
            return;
        }
        let next = match self.ctx.inventory().selected_position() {
            Some(pos) if pos + 1 < len => pos + 1,
            Some(pos) => pos,
            None => 0,
        };
        self.ctx.select_visible(next);
        self.sync_list_state();
    }

    pub fn previous_item(&mut self) {
        if self.ctx.inventory().visible_len() == 0 {
            return;
        }
        let previous = self
            .ctx
            .inventory()
            .selected_position()
            .map(|pos| pos.saturating_sub(1))
            .unwrap_or(0);
        self.ctx.select_visible(previous);
        self.sync_list_state();
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }

        // The confirmation dialog swallows everything until answered
        if self.ctx.pending().is_some() {
            match key.code {
                KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('s') => {
                    return Some(Action::ConfirmTransaction)
                }
                KeyCode::Esc | KeyCode::Char('n') => self.ctx.cancel_pending(),
                _ => {}
            }
            return None;
        }

        if self.ctx.history().is_open() {
            match key.code {
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') => self.close_history(),
                KeyCode::Char('j') | KeyCode::Down => self.ctx.history_mut().scroll_down(),
                KeyCode::Char('k') | KeyCode::Up => self.ctx.history_mut().scroll_up(),
                _ => {}
            }
            return None;
        }

        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key, now),
            InputMode::Filtering => {
                match key.code {
                    KeyCode::Char(c) => {
                        let mut input = self.ctx.filter_input().to_string();
                        input.push(c);
                        self.ctx.set_filter_input(input, now);
                    }
                    KeyCode::Backspace => {
                        let mut input = self.ctx.filter_input().to_string();
                        input.pop();
                        self.ctx.set_filter_input(input, now);
                    }
                    KeyCode::Enter | KeyCode::Esc => self.input_mode = InputMode::Normal,
                    _ => {}
                }
                None
            }
            InputMode::QuickSearch => {
                match key.code {
                    KeyCode::Char(c) => self.ctx.search_mut().push_char(c, now),
                    KeyCode::Backspace => self.ctx.search_mut().pop_char(now),
                    KeyCode::Down => self.ctx.search_mut().next(),
                    KeyCode::Up => self.ctx.search_mut().previous(),
                    KeyCode::Enter => {
                        if self.ctx.pick_search_result() {
                            self.input_mode = InputMode::Normal;
                            self.sync_list_state();
                        }
                    }
                    KeyCode::Esc => {
                        self.ctx.search_mut().clear();
                        self.input_mode = InputMode::Normal;
                    }
                    _ => {}
                }
                None
            }
            InputMode::EditingName => {
                match key.code {
                    KeyCode::Char(c) => {
                        let mut name = self.ctx.person_name().to_string();
                        name.push(c);
                        self.ctx.set_person_name(name);
                    }
                    KeyCode::Backspace => {
                        let mut name = self.ctx.person_name().to_string();
                        name.pop();
                        self.ctx.set_person_name(name);
                    }
                    KeyCode::Enter | KeyCode::Esc | KeyCode::Tab => {
                        self.ctx.commit_person_name();
                        self.input_mode = InputMode::Normal;
                    }
                    _ => {}
                }
                None
            }
            InputMode::EditingQuantity => {
                match key.code {
                    KeyCode::Char(c) if c.is_ascii_digit() => self.quantity_input.push(c),
                    KeyCode::Backspace => {
                        self.quantity_input.pop();
                    }
                    KeyCode::Enter => {
                        self.ctx.stepper_mut().set_from_input(&self.quantity_input);
                        self.input_mode = InputMode::Normal;
                    }
                    KeyCode::Esc => self.input_mode = InputMode::Normal,
                    _ => {}
                }
                None
            }
            InputMode::LoginUser => match key.code {
                KeyCode::Char(c) => {
                    self.login_user.push(c);
                    None
                }
                KeyCode::Backspace => {
                    self.login_user.pop();
                    None
                }
                KeyCode::Enter | KeyCode::Tab => {
                    self.input_mode = InputMode::LoginPassword;
                    None
                }
                KeyCode::Esc => Some(Action::Navigate(Page::Home)),
                _ => None,
            },
            InputMode::LoginPassword => match key.code {
                KeyCode::Char(c) => {
                    self.login_password.push(c);
                    None
                }
                KeyCode::Backspace => {
                    self.login_password.pop();
                    None
                }
                KeyCode::Tab => {
                    self.input_mode = InputMode::LoginUser;
                    None
                }
                KeyCode::Enter => Some(Action::Login),
                KeyCode::Esc => Some(Action::Navigate(Page::Home)),
                _ => None,
            },
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent, now: Instant) -> Option<Action> {
        // Global keys first
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return None;
            }
            KeyCode::Tab => return Some(Action::Navigate(self.ctx.next_menu_page())),
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                return Some(Action::Navigate(Page::MENU[index]));
            }
            KeyCode::Char('h') => return Some(Action::OpenHistory),
            KeyCode::Char('S') => return Some(Action::Sync),
            KeyCode::Char('L') => {
                if self.ctx.is_logged_in() {
                    self.ctx.logout(now);
                    return None;
                }
                return Some(Action::Navigate(Page::Login));
            }
            KeyCode::Esc => {
                self.ctx.dismiss_toast();
                return None;
            }
            _ => {}
        }

        match self.ctx.current_page() {
            Page::Home => match key.code {
                KeyCode::Char('j') | KeyCode::Down => self.next_item(),
                KeyCode::Char('k') | KeyCode::Up => self.previous_item(),
                KeyCode::Char('/') => self.input_mode = InputMode::Filtering,
                KeyCode::Char('s') => self.input_mode = InputMode::QuickSearch,
                KeyCode::Char('c') => {
                    self.ctx.cycle_category();
                    self.sync_list_state();
                }
                KeyCode::Char('o') => {
                    self.ctx.cycle_sort();
                    self.sync_list_state();
                }
                KeyCode::Char('+') | KeyCode::Char('=') => self.ctx.stepper_mut().increment(),
                KeyCode::Char('-') => self.ctx.stepper_mut().decrement(),
                KeyCode::Char('n') => self.input_mode = InputMode::EditingName,
                KeyCode::Char('e') => {
                    self.quantity_input.clear();
                    self.input_mode = InputMode::EditingQuantity;
                }
                KeyCode::Char('r') => {
                    self.ctx.request_transaction(TransactionKind::Retirada, now);
                }
                KeyCode::Char('d') => {
                    self.ctx.request_transaction(TransactionKind::Devolucao, now);
                }
                KeyCode::Char('H') => return Some(Action::OpenItemHistory),
                KeyCode::Char('R') => return Some(Action::Reload),
                _ => {}
            },
            Page::Manage => {
                if key.code == KeyCode::Char('R') {
                    return Some(Action::Navigate(Page::Manage));
                }
            }
            Page::Settings => {
                if key.code == KeyCode::Char('t') {
                    return Some(Action::ToggleSlack);
                }
            }
            Page::Dashboard | Page::Login => {}
        }

        None
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) || !self.ctx.history().is_open() {
            return;
        }

        let clicked = Position::new(mouse.column, mouse.row);
        if let Some(area) = self.history_area {
            if !area.contains(clicked) {
                self.close_history();
            }
        }
    }

    fn close_history(&mut self) {
        self.ctx.close_history();
        self.history_area = None;
    }

    /// Advance the context clock. The runner raises the spinner before a due sync;
    /// it comes down here once the sync is over.
    pub async fn tick(&mut self, now: Instant) {
        let syncing = self.ctx.sync_due(now);
        self.ctx.tick(now).await;
        if syncing {
            self.ctx.set_loading(false);
        }
        self.sync_list_state();
    }

    /// Run an action against the backend
    pub async fn perform(&mut self, action: Action, now: Instant) {
        match action {
            Action::Navigate(page) => {
                self.ctx.navigate(page, now).await;
            }
            Action::Login => {
                let user = std::mem::take(&mut self.login_user);
                let password = std::mem::take(&mut self.login_password);
                if !self.ctx.login(&user, &password, now).await {
                    // Keep the user name; retype the password
                    self.login_user = user;
                }
            }
            Action::ConfirmTransaction => {
                self.ctx.confirm_pending(now).await;
            }
            Action::OpenHistory => self.ctx.open_history(now).await,
            Action::OpenItemHistory => self.ctx.open_item_history(now).await,
            Action::ToggleSlack => self.ctx.toggle_slack(now).await,
            Action::Sync => self.ctx.sync_now(true, now).await,
            Action::Reload => {
                self.ctx.reload_items(now).await;
            }
        }

        self.ctx.set_loading(false);
        self.sync_input_mode();
        self.sync_list_state();
    }

    /// The login page owns the keyboard; any other page starts in normal mode
    fn sync_input_mode(&mut self) {
        let on_login = self.ctx.current_page() == Page::Login;
        let typing_login = matches!(self.input_mode, InputMode::LoginUser | InputMode::LoginPassword);

        if on_login && !typing_login {
            self.input_mode = InputMode::LoginUser;
        } else if !on_login && typing_login {
            self.input_mode = InputMode::Normal;
            self.login_user.clear();
            self.login_password.clear();
        }
    }
}
