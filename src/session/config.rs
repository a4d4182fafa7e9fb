use std::time::Duration;

pub struct SessionConfig {
    /// Upper bound on any single mount command.
    pub command_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(30),
        }
    }
}
