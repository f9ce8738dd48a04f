//! Resolution error types

use thiserror::Error;

use super::client::ClientError;

/// Domain error surfaced by the resolution layer.
///
/// "Zero spaces discovered" and "spaces discovered but the requested pair is
/// absent" collapse into the same [`SpaceNotFound`](Self::SpaceNotFound)
/// variant: the caller declared it expects space partitioning, and from its
/// point of view the expected space is missing either way.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Expected a cloud space for {url} but none were found.")]
    SpaceNotFound { url: String },

    #[error("Unable to communicate with server")]
    Communication,

    /// Platform-reported failure, message normalized at the operation
    /// boundary when validation text is available
    #[error("{message}")]
    Cloud {
        message: String,
        validation: Option<String>,
    },

    #[error("Operation cancelled")]
    Cancelled,

    /// Faults with no domain interpretation, re-raised verbatim
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<ClientError> for ResolveError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Cloud {
                message,
                validation,
            } => ResolveError::Cloud {
                message,
                validation,
            },
            ClientError::Runtime(err) => ResolveError::Internal(err),
        }
    }
}

impl ResolveError {
    /// Replace the outer message with the platform's embedded validation
    /// message when one is present. Happens once, at the outermost boundary
    /// of each public operation, never mid-algorithm.
    pub(crate) fn normalized(self) -> Self {
        match self {
            ResolveError::Cloud {
                validation: Some(validation),
                ..
            } => ResolveError::Cloud {
                message: validation,
                validation: None,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_not_found_message() {
        let err = ResolveError::SpaceNotFound {
            url: "https://api.example.com".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Expected a cloud space for https://api.example.com but none were found."
        );
    }

    #[test]
    fn test_communication_message_is_canonical() {
        assert_eq!(
            ResolveError::Communication.to_string(),
            "Unable to communicate with server"
        );
    }

    #[test]
    fn test_normalized_prefers_validation_message() {
        let err = ResolveError::Cloud {
            message: "403 Forbidden".to_string(),
            validation: Some("Invalid credentials".to_string()),
        };
        assert_eq!(err.normalized().to_string(), "Invalid credentials");
    }

    #[test]
    fn test_normalized_keeps_message_without_validation() {
        let err = ResolveError::Cloud {
            message: "503 Service Unavailable".to_string(),
            validation: None,
        };
        assert_eq!(err.normalized().to_string(), "503 Service Unavailable");
    }

    #[test]
    fn test_client_runtime_fault_converts_verbatim() {
        let err: ResolveError = ClientError::Runtime(anyhow::anyhow!("boom")).into();
        assert!(matches!(err, ResolveError::Internal(_)));
        assert_eq!(err.to_string(), "boom");
    }
}
