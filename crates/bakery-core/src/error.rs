use bakery_domain::{DateWindowError, OrderStatus, UnknownStatus};
use thiserror::Error;
use uuid::Uuid;

/// Failures surfaced by the back-office services.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn order_not_found(order_number: &str) -> Self {
        CoreError::NotFound {
            entity: "Order",
            key: order_number.to_string(),
        }
    }

    pub fn expense_not_found(id: Uuid) -> Self {
        CoreError::NotFound {
            entity: "Expense",
            key: id.to_string(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        CoreError::InvalidArgument(message.into())
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::StoreUnavailable(err.to_string())
    }
}

impl From<UnknownStatus> for CoreError {
    fn from(err: UnknownStatus) -> Self {
        CoreError::InvalidArgument(err.to_string())
    }
}

impl From<DateWindowError> for CoreError {
    fn from(err: DateWindowError) -> Self {
        CoreError::InvalidArgument(err.to_string())
    }
}
