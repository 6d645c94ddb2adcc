use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("cannot read shops file {path}: {source}")]
    ShopsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse shops file: {0}")]
    ShopsFileParse(#[from] serde_yaml::Error),

    #[error("invalid filter regex \"{pattern}\": {source}")]
    InvalidFilterRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("shops file validation failed: {0}")]
    Validation(String),
}
