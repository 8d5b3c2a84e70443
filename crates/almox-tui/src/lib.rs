// Terminal UI for the stock client, built on ratatui

pub mod app;
pub mod modal_ui;
pub mod runner;
pub mod ui;

pub use app::{Action, App, InputMode};
pub use runner::run_tui;
