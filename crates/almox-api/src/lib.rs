// HTTP client for the stock backend
pub mod client;
pub mod endpoints;
pub mod models;
pub mod retry;

// Re-export common types
pub use client::{ApiError, InventoryClient};
pub use endpoints::Endpoints;
pub use models::{
    HistoryEntry, Item, ItemInUse, SlackSettings, SlackSettingsUpdate, SyncResult,
    TransactionKind, TransactionRequest, TransactionResponse,
};
pub use retry::RetryConfig;
