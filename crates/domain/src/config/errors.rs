use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("at least one upstream server must be configured")]
    NoServers,

    #[error("query_timeout_ms {0} outside the accepted range [100, 30000]")]
    QueryTimeoutOutOfRange(u32),

    #[error("retry max_attempts {0} outside the accepted range [1, 10]")]
    RetryAttemptsOutOfRange(u32),

    #[error("retry base_delay_ms {0} must be at least 10")]
    BaseDelayTooSmall(u32),

    #[error("retry max_delay_ms {max} must not be below base_delay_ms {base}")]
    MaxDelayBelowBase { base: u32, max: u32 },

    #[error("failed to read config file: {0}")]
    Io(String),

    #[error("failed to parse config file: {0}")]
    Parse(String),
}
