use reqwest::StatusCode;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A request parameter failed its type or range check.
///
/// Raised before anything is sent over the network. The `Display` output names
/// the field and the violated constraint, e.g. `lat must be >= -90 and <= 90`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("{field} must be >= {min} and <= {max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be one of {allowed}")]
    NotAllowed {
        field: &'static str,
        value: String,
        allowed: String,
    },

    /// A free-form field was given an array or an object.
    #[error("{field} must be a string, number or boolean")]
    NotScalar { field: &'static str },

    #[error("unknown request parameter `{0}`")]
    UnknownField(String),

    #[error("request parameters must be a JSON object")]
    NotAnObject,
}

impl ValidationError {
    /// Name of the offending field, when there is one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::WrongType { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::NotAllowed { field, .. }
            | Self::NotScalar { field } => Some(*field),
            Self::UnknownField(field) => Some(field.as_str()),
            Self::NotAnObject => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The service answered HTTP 403, usually an invalid or rate-limited key.
    #[error("Forbidden, 403")]
    Authorization,

    /// Error status whose body was not JSON.
    #[error("PVWatts request failed: HTTP {status}\n{body}")]
    Status { status: StatusCode, body: String },

    #[error("PVWatts request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to parse PVWatts JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid proxy url for scheme `{scheme}`: {source}")]
    Proxy {
        scheme: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unsupported proxy scheme `{0}` (expected http, https or all)")]
    UnsupportedProxyScheme(String),

    #[error(transparent)]
    Config(#[from] anyhow::Error),
}

impl Error {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_message_names_bounds() {
        let e = ValidationError::OutOfRange {
            field: "gamma",
            value: 0.0,
            min: -2.0,
            max: -0.01,
        };
        assert_eq!(e.to_string(), "gamma must be >= -2 and <= -0.01");
        assert_eq!(e.field(), Some("gamma"));
    }

    #[test]
    fn authorization_message() {
        let e = Error::Authorization;
        assert!(e.to_string().starts_with("Forbidden"));
        assert!(e.is_authorization());
        assert!(!e.is_validation());
    }

    #[test]
    fn validation_converts_into_crate_error() {
        let e: Error = ValidationError::UnknownField("foo".into()).into();
        assert!(e.is_validation());
        assert_eq!(e.to_string(), "unknown request parameter `foo`");
    }
}
