// ⚠️ Errors - Everything that can reject a subscription before it reaches the store

use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, SubscriptionError>;

/// Errors raised while creating, projecting or configuring subscriptions.
///
/// Every variant is raised at creation time (form submit, API request,
/// config load). Once a `Subscription` exists, projecting it cannot fail
/// except for `DateOutOfRange`, which creation already guards against.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    /// A required form field was left empty.
    #[error("required field is empty: {0}")]
    MissingField(&'static str),

    /// Price is not a decimal amount with at most two fractional digits.
    #[error("invalid price '{0}': expected an amount like 9.99")]
    InvalidPrice(String),

    /// Price parsed but is below zero.
    #[error("price must not be negative, got {0}")]
    NegativePrice(String),

    /// Start date is not a valid YYYY-MM-DD calendar date.
    #[error("invalid start date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Frequency is not one of daily, weekly, monthly or yearly.
    #[error("unsupported frequency '{0}': expected daily, weekly, monthly or yearly")]
    UnsupportedFrequency(String),

    /// Logo file does not look like an image.
    #[error("unsupported logo '{0}': expected an image file")]
    UnsupportedLogo(String),

    /// The projection horizon runs past the representable calendar.
    #[error("billing dates starting {0} fall outside the supported calendar range")]
    DateOutOfRange(String),

    /// Config file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl SubscriptionError {
    /// Name of the form field this error belongs to, if any.
    ///
    /// Used by the form UIs to point the user at the offending input.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            SubscriptionError::MissingField(field) => Some(*field),
            SubscriptionError::InvalidPrice(_) | SubscriptionError::NegativePrice(_) => {
                Some("price")
            }
            SubscriptionError::InvalidDate(_) | SubscriptionError::DateOutOfRange(_) => {
                Some("start_date")
            }
            SubscriptionError::UnsupportedFrequency(_) => Some("frequency"),
            SubscriptionError::UnsupportedLogo(_) => Some("logo"),
            SubscriptionError::Config(_) => None,
        }
    }
}
