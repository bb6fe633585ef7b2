use std::fmt;

#[derive(Debug)]
pub enum SmokeError {
    IoError(std::io::Error),
    ConfigError(String),
    ValidationError(String),
    SerdeError(serde_json::Error),
    YamlError(serde_yaml::Error),
    FilterError(String),
    NoChecksSelected(Vec<String>),
    ProcessError(String),
}

impl fmt::Display for SmokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmokeError::IoError(err) => write!(f, "{}", err),
            SmokeError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            SmokeError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            SmokeError::SerdeError(err) => write!(f, "{}", err),
            SmokeError::YamlError(err) => write!(f, "{}", err),
            SmokeError::FilterError(msg) => write!(f, "Invalid filter: {}", msg),
            SmokeError::NoChecksSelected(filters) => {
                write!(f, "No checks match filter(s): {}", filters.join(", "))
            }
            SmokeError::ProcessError(msg) => write!(f, "Process error: {}", msg),
        }
    }
}

impl std::error::Error for SmokeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SmokeError::IoError(err) => Some(err),
            SmokeError::SerdeError(err) => Some(err),
            SmokeError::YamlError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SmokeError {
    fn from(err: std::io::Error) -> Self {
        SmokeError::IoError(err)
    }
}

impl From<serde_json::Error> for SmokeError {
    fn from(err: serde_json::Error) -> Self {
        SmokeError::SerdeError(err)
    }
}

impl From<serde_yaml::Error> for SmokeError {
    fn from(err: serde_yaml::Error) -> Self {
        SmokeError::YamlError(err)
    }
}

impl From<validator::ValidationErrors> for SmokeError {
    fn from(err: validator::ValidationErrors) -> Self {
        SmokeError::ValidationError(err.to_string())
    }
}

impl From<globset::Error> for SmokeError {
    fn from(err: globset::Error) -> Self {
        SmokeError::FilterError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SmokeError>;
