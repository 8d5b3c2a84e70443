use almox_api::{SlackSettings, SlackSettingsUpdate};

use crate::backend::InventoryBackend;

/// Slack notification toggle on the settings page
#[derive(Debug, Default)]
pub struct SlackPanel {
    settings: Option<SlackSettings>,
}

impl SlackPanel {
    pub fn settings(&self) -> Option<&SlackSettings> {
        self.settings.as_ref()
    }

    pub async fn load(&mut self, backend: &dyn InventoryBackend) -> crate::Result<&SlackSettings> {
        let settings = backend.get_slack_settings().await?;
        Ok(self.settings.insert(settings))
    }

    /// Flip the toggle on the server. Local state only changes once the save went through.
    pub async fn toggle(&mut self, backend: &dyn InventoryBackend) -> crate::Result<bool> {
        let current = match self.settings.as_ref().map(|s| s.enabled) {
            Some(enabled) => enabled,
            None => self.load(backend).await?.enabled,
        };

        let enabled = !current;
        backend
            .save_slack_settings(SlackSettingsUpdate { enabled })
            .await?;

        if let Some(settings) = self.settings.as_mut() {
            settings.enabled = enabled;
        }
        tracing::info!("Slack notifications {}", if enabled { "enabled" } else { "disabled" });
        Ok(enabled)
    }
}
