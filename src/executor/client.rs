//! Revision client configuration

/// Configuration for the revision service client
#[derive(Debug, Clone)]
pub struct RevisionClientConfig {
    /// Path to the external revision command.
    ///
    /// If not provided, defaults to "revise" (assumes it's on PATH).
    pub command: Option<String>,

    /// Timeout for each step execution in seconds
    pub timeout_secs: u64,
}

impl Default for RevisionClientConfig {
    fn default() -> Self {
        Self {
            command: None,
            timeout_secs: 30,
        }
    }
}

impl RevisionClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_command(mut self, command: String) -> Self {
        self.command = Some(command);
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = RevisionClientConfig::new()
            .with_command("/opt/revise/bin/revise".to_string())
            .with_timeout(60);

        assert_eq!(config.command, Some("/opt/revise/bin/revise".to_string()));
        assert_eq!(config.timeout_secs, 60);
    }
}
