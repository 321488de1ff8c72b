//! Domain error types.

/// Top-level error type for statplots.
#[derive(Debug, thiserror::Error)]
pub enum StatplotsError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("insufficient data for {what}: have {have}, need {need}")]
    InsufficientData {
        what: String,
        have: usize,
        need: usize,
    },

    #[error("no data for {ticker} from {source_name}")]
    NoData { ticker: String, source_name: String },

    #[error("{source_name} failed for {ticker}: {reason}")]
    Source {
        source_name: String,
        ticker: String,
        reason: String,
    },

    #[error("no price sources configured")]
    NoSources,

    #[error("could not fetch {ticker} from any source (last error: {last})")]
    AllSourcesFailed {
        ticker: String,
        last: Box<StatplotsError>,
    },

    #[error("could not fetch any ticker (last error: {last})")]
    AllTickersFailed { last: Box<StatplotsError> },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StatplotsError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        StatplotsError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// The innermost failure behind any fallback wrappers.
    pub fn root_cause(&self) -> &StatplotsError {
        match self {
            StatplotsError::AllSourcesFailed { last, .. }
            | StatplotsError::AllTickersFailed { last } => last.root_cause(),
            other => other,
        }
    }

    /// Process exit status for this error category.
    pub fn exit_status(&self) -> u8 {
        match self {
            StatplotsError::Io(_) => 1,
            StatplotsError::ConfigParse { .. }
            | StatplotsError::ConfigMissing { .. }
            | StatplotsError::ConfigInvalid { .. } => 2,
            StatplotsError::Source { .. }
            | StatplotsError::NoSources
            | StatplotsError::AllSourcesFailed { .. }
            | StatplotsError::AllTickersFailed { .. }
            | StatplotsError::Http(_)
            | StatplotsError::Csv(_) => 3,
            StatplotsError::InvalidParameter { .. } => 4,
            StatplotsError::NoData { .. } | StatplotsError::InsufficientData { .. } => 5,
        }
    }
}

impl From<&StatplotsError> for std::process::ExitCode {
    fn from(err: &StatplotsError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
