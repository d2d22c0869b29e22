use async_trait::async_trait;
use els_config::ElsConfig;

/// Setting holding the app directory name used by glob-based import search.
pub const APP_ROOT_KEY: &str = "els.appRoot";

/// Editor-side settings, fetched on demand.
#[async_trait]
pub trait WorkspaceConfiguration: Send + Sync {
    async fn get_configuration(&self, key: &str) -> Option<String>;
}

/// Answers from the loaded `els.toml` without a round trip to the client.
#[async_trait]
impl WorkspaceConfiguration for ElsConfig {
    async fn get_configuration(&self, key: &str) -> Option<String> {
        match key {
            APP_ROOT_KEY => Some(self.project.app_root.clone()).filter(|root| !root.is_empty()),
            "els.linter.source" => Some(self.linter.source.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn answers_app_root_from_project_config() {
        let mut config = ElsConfig::default();
        assert_eq!(config.get_configuration(APP_ROOT_KEY).await, None);

        config.project.app_root = "frontend".into();
        assert_eq!(
            config.get_configuration(APP_ROOT_KEY).await.as_deref(),
            Some("frontend")
        );
        assert_eq!(
            config.get_configuration("els.linter.source").await.as_deref(),
            Some("ember-template-lint")
        );
        assert_eq!(config.get_configuration("els.unknown").await, None);
    }
}
