use serde::{Deserialize, Serialize};

/// Default API root when nothing else is configured
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";

/// REST paths relative to the API base.
///
/// Every path can be overridden from the config file, so a backend that mounts
/// its Slack routes under `/settings/slack` only needs one line of TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub items: String,
    pub search: String,
    pub transactions: String,
    pub history: String,
    pub sync: String,
    pub health: String,
    pub slack_settings: String,
    pub items_in_use: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            items: "/items".to_string(),
            search: "/items/search".to_string(),
            transactions: "/transactions".to_string(),
            history: "/history".to_string(),
            sync: "/sync".to_string(),
            health: "/health".to_string(),
            slack_settings: "/slack-settings".to_string(),
            items_in_use: "/items-em-uso".to_string(),
        }
    }
}

impl Endpoints {
    pub fn item(&self, id: i64) -> String {
        format!("{}/{}", self.items, id)
    }

    pub fn search_query(&self, query: &str) -> String {
        format!("{}?q={}", self.search, urlencoding::encode(query))
    }

    pub fn history_page(&self, limit: u32) -> String {
        format!("{}?limit={}", self.history, limit)
    }

    pub fn item_history(&self, item_id: i64, limit: u32) -> String {
        format!("{}/item/{}?limit={}", self.history, item_id, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.items, "/items");
        assert_eq!(endpoints.slack_settings, "/slack-settings");
        assert_eq!(endpoints.item(42), "/items/42");
        assert_eq!(endpoints.history_page(50), "/history?limit=50");
        assert_eq!(endpoints.item_history(7, 20), "/history/item/7?limit=20");
    }

    #[test]
    fn test_search_query_is_encoded() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.search_query("chave de fenda"),
            "/items/search?q=chave%20de%20fenda"
        );
        assert_eq!(endpoints.search_query("M&M"), "/items/search?q=M%26M");
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let endpoints: Endpoints =
            serde_json::from_str(r#"{"slack_settings": "/settings/slack"}"#).unwrap();
        assert_eq!(endpoints.slack_settings, "/settings/slack");
        assert_eq!(endpoints.sync, "/sync");
    }
}
