use almox_api::{
    HistoryEntry, InventoryClient, Item, ItemInUse, SlackSettings, SlackSettingsUpdate,
    SyncResult, TransactionRequest, TransactionResponse,
};

use crate::Result;

/// Everything the client needs from the stock backend.
///
/// `InventoryClient` is the real implementation; tests swap in mocks so they
/// can count exactly which calls went out.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait InventoryBackend: Send + Sync {
    async fn search_items(&self, query: &str) -> Result<Vec<Item>>;
    async fn get_all_items(&self) -> Result<Vec<Item>>;
    async fn get_item_by_id(&self, id: i64) -> Result<Item>;
    async fn create_transaction(&self, request: TransactionRequest) -> Result<TransactionResponse>;
    async fn get_history(&self, limit: u32) -> Result<Vec<HistoryEntry>>;
    async fn get_item_history(&self, item_id: i64, limit: u32) -> Result<Vec<HistoryEntry>>;
    async fn get_items_in_use(&self) -> Result<Vec<ItemInUse>>;
    async fn sync_with_sheets(&self) -> Result<SyncResult>;
    /// Never fails: an unreachable backend is just `false`
    async fn check_connection(&self) -> bool;
    async fn get_slack_settings(&self) -> Result<SlackSettings>;
    async fn save_slack_settings(&self, update: SlackSettingsUpdate) -> Result<()>;
}

#[async_trait::async_trait]
impl InventoryBackend for InventoryClient {
    async fn search_items(&self, query: &str) -> Result<Vec<Item>> {
        Ok(InventoryClient::search_items(self, query).await?)
    }

    async fn get_all_items(&self) -> Result<Vec<Item>> {
        Ok(InventoryClient::get_all_items(self).await?)
    }

    async fn get_item_by_id(&self, id: i64) -> Result<Item> {
        Ok(InventoryClient::get_item_by_id(self, id).await?)
    }

    async fn create_transaction(&self, request: TransactionRequest) -> Result<TransactionResponse> {
        Ok(InventoryClient::create_transaction(self, &request).await?)
    }

    async fn get_history(&self, limit: u32) -> Result<Vec<HistoryEntry>> {
        Ok(InventoryClient::get_history(self, limit).await?)
    }

    async fn get_item_history(&self, item_id: i64, limit: u32) -> Result<Vec<HistoryEntry>> {
        Ok(InventoryClient::get_item_history(self, item_id, limit).await?)
    }

    async fn get_items_in_use(&self) -> Result<Vec<ItemInUse>> {
        Ok(InventoryClient::get_items_in_use(self).await?)
    }

    async fn sync_with_sheets(&self) -> Result<SyncResult> {
        Ok(InventoryClient::sync_with_sheets(self).await?)
    }

    async fn check_connection(&self) -> bool {
        InventoryClient::check_connection(self).await
    }

    async fn get_slack_settings(&self) -> Result<SlackSettings> {
        Ok(InventoryClient::get_slack_settings(self).await?)
    }

    async fn save_slack_settings(&self, update: SlackSettingsUpdate) -> Result<()> {
        InventoryClient::save_slack_settings(self, &update).await?;
        Ok(())
    }
}
