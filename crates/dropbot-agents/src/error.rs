use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CreateAgentError {
    #[error("agent {0} is already registered")]
    AlreadyExists(String),

    #[error("population is full ({max} agents)")]
    PopulationFull { max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoiError {
    #[error("poi `{name}` has tier {tier}; expected 1, 2 or 3")]
    InvalidTier { name: String, tier: u8 },

    #[error("poi `{0}` already exists")]
    DuplicateName(String),
}
