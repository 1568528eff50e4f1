use std::sync::Arc;

use engage_core::SessionAnalyzer;

use crate::config::Config;
use crate::llm::OpenAiReasoner;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analyzer: SessionAnalyzer,
}

impl AppState {
    /// Wire the analyzer from configuration. No credential means no reasoner.
    pub fn from_config(config: Config) -> Result<Self, reqwest::Error> {
        let analyzer = match config.api_key.as_deref() {
            Some(api_key) => {
                let reasoner = OpenAiReasoner::new(&config.llm, api_key)?;
                SessionAnalyzer::new(Arc::new(reasoner), config.llm.timeout)
            }
            None => {
                tracing::warn!("OPENAI_API_KEY is not set; every decision will be no popup");
                SessionAnalyzer::disabled()
            }
        };

        Ok(Self {
            config: Arc::new(config),
            analyzer,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_builds_disabled_analyzer() {
        let state = AppState::from_config(Config::from_lookup(|_| None)).expect("state builds");
        assert!(!state.analyzer.is_enabled());
    }

    #[test]
    fn credential_builds_enabled_analyzer() {
        let config = Config::from_lookup(|key| (key == "OPENAI_API_KEY").then(|| "sk-test".to_string()));
        let state = AppState::from_config(config).expect("state builds");
        assert!(state.analyzer.is_enabled());
        assert!(state.config.analyzer_enabled());
    }
}
