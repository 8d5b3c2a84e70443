// Client-side state of the stock tool: everything between the keyboard and the API
pub mod auth;
pub mod backend;
pub mod config;
pub mod context;
pub mod debounce;
pub mod error;
pub mod history;
pub mod inventory;
pub mod navigation;
pub mod notify;
pub mod search;
pub mod session;
pub mod settings;
pub mod sync;
pub mod transaction;

pub use almox_api::{HistoryEntry, Item, TransactionKind};
pub use auth::{Authenticator, ConfiguredAuthenticator};
pub use backend::InventoryBackend;
pub use config::Config;
pub use context::AppContext;
pub use error::{Error, ValidationError};
pub use inventory::{CategoryFilter, InventoryList, SortKey};
pub use navigation::{NavOutcome, Page, Router};
pub use notify::{Toast, ToastLevel};
pub use session::SessionStore;

/// Result alias for the core crate
pub type Result<T> = std::result::Result<T, Error>;
