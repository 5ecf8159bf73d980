use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ptrscan_core::ValidationError),

    #[error(transparent)]
    Config(#[from] ptrscan_core::ConfigError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(_) => 2,
            Self::Command(_) => 2,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_problems_and_io_failures_use_distinct_codes() {
        let validation = CliError::from(ptrscan_core::ValidationError::EmptyTicker);
        let io = CliError::from(std::io::Error::other("disk full"));

        assert_eq!(validation.exit_code(), 2);
        assert_eq!(io.exit_code(), 10);
    }
}
