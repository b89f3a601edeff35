//! Error type for watch and bind operations.

use std::fmt;

/// Errors from watching or binding a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// A path with no segments was supplied.
    EmptyPath,
    /// A single-key watch named a key that is not observable.
    NotObservable { key: String },
    /// A non-observable path link reads as `undefined` or `null`, so the
    /// rest of the path can never be reached.
    NotAnObject {
        segment: String,
        found: &'static str,
    },
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "path must not be empty"),
            Self::NotObservable { key } => write!(f, "key '{key}' is not observable"),
            Self::NotAnObject { segment, found } => {
                write!(f, "path segment '{segment}' holds {found}, not an object")
            }
        }
    }
}

impl std::error::Error for BindError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(BindError::EmptyPath.to_string(), "path must not be empty");
        assert_eq!(
            BindError::NotObservable { key: "name".into() }.to_string(),
            "key 'name' is not observable"
        );
        assert_eq!(
            BindError::NotAnObject {
                segment: "user".into(),
                found: "undefined",
            }
            .to_string(),
            "path segment 'user' holds undefined, not an object"
        );
    }
}
