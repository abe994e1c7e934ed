//! Service-specific tests
//!
//! Each service has its own test file; shared construction helpers live in
//! [`common`].


// Common test utilities for services
#[cfg(test)]
pub mod common {
    use crate::config::DispatchConfig;

    pub const TEST_TOKEN: &str = "test-token";

    /// Minimal configuration pointing at `base_url`, with the token already applied
    pub fn config_for(base_url: &str) -> DispatchConfig {
        let toml = format!(
            r#"
            [backend]
            base_url = "{base_url}"
            transition_id = "21"
            page_size = 2
            pending_query = "project = SD AND assignee is EMPTY"
            open_statuses = ["In Progress", "Waiting"]

            [[routing.teams]]
            name = "printers"
            include = ["printer"]
            candidates = ["alice", "bob"]
            "#
        );
        let mut config = DispatchConfig::from_toml_str(&toml).expect("valid test config");
        config.apply_env(|key| (key == crate::config::API_TOKEN_VAR).then(|| TEST_TOKEN.to_string()));
        config
    }
}
