use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Store-related errors.
///
/// `Connection` and `Database` are the transient class: callers on the
/// storefront path degrade to "no recommendations" instead of surfacing them.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("stored value could not be parsed: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The order id does not resolve to a completed order in the host.
    #[error("order {order_id} not found")]
    OrderNotFound { order_id: i64 },

    /// A poison record: the order exists but its line items cannot be read.
    #[error("order {order_id} is malformed: {reason}")]
    MalformedOrder { order_id: i64, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error came from the store layer (transient class).
    pub fn is_store(&self) -> bool {
        matches!(self, Error::Store(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_are_classified() {
        let err = Error::from(StoreError::Connection("pool exhausted".into()));
        assert!(err.is_store());
        assert_eq!(err.to_string(), "connection error: pool exhausted");
    }

    #[test]
    fn order_errors_are_not_store_errors() {
        let err = Error::OrderNotFound { order_id: 42 };
        assert!(!err.is_store());
        assert_eq!(err.to_string(), "order 42 not found");
    }
}
