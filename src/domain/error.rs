use thiserror::Error;

/// Core cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Generation error: {message}")]
    Generation { message: String },

    #[error("Lookup error: {message}")]
    Lookup { message: String },

    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl CacheError {
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup {
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Generic message safe to surface in a UI. Raw transport and storage
    /// error text must never reach end users.
    pub fn user_message(&self) -> &'static str {
        "Content is unavailable right now. Please try again."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error() {
        let error = CacheError::generation("model refused the request");
        assert_eq!(
            error.to_string(),
            "Generation error: model refused the request"
        );
    }

    #[test]
    fn test_lookup_error() {
        let error = CacheError::lookup("query timed out");
        assert_eq!(error.to_string(), "Lookup error: query timed out");
    }

    #[test]
    fn test_user_message_hides_detail() {
        let error = CacheError::storage("connection refused at 10.0.0.3:5432");
        assert!(!error.user_message().contains("10.0.0.3"));
    }
}
