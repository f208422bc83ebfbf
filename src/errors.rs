use bakery_config::ConfigError;
use bakery_core::CoreError;
use thiserror::Error;

/// Error type for the back-office surface: service failures plus the ways a
/// request can be malformed before any service runs.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Malformed request: {0}")]
    Request(String),
    #[error("Failed to encode response: {0}")]
    Encode(String),
}

impl AppError {
    /// HTTP-style status the back office reports for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Core(CoreError::NotFound { .. }) => 404,
            AppError::Core(CoreError::InvalidArgument(_))
            | AppError::Core(CoreError::InvalidTransition { .. })
            | AppError::Request(_) => 400,
            AppError::Core(CoreError::Unauthorized) => 401,
            AppError::Core(CoreError::StoreUnavailable(_))
            | AppError::Config(_)
            | AppError::Encode(_) => 500,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Encode(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use bakery_domain::OrderStatus;

    #[test]
    fn core_errors_map_to_http_statuses() {
        let cases = [
            (CoreError::order_not_found("ASI1"), 404),
            (CoreError::invalid("amount must be positive"), 400),
            (
                CoreError::InvalidTransition {
                    from: OrderStatus::Completed,
                    to: OrderStatus::Pending,
                },
                400,
            ),
            (CoreError::Unauthorized, 401),
            (CoreError::StoreUnavailable("disk full".into()), 500),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
        assert_eq!(AppError::Request("no action".into()).status_code(), 400);
    }
}
