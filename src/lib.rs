// Subscription Calendar - Core Library
// Exposes all modules for use in the TUI, the web server, and tests

pub mod calendar;
pub mod config;
pub mod error;
pub mod form;
pub mod projector;
pub mod store;
pub mod subscription;

#[cfg(feature = "tui")]
pub mod ui;

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use calendar::{group_by_date, CalendarMonth, WeekStart};
pub use config::{load_suitable_config, Config};
pub use error::{Result, SubscriptionError};
pub use form::{parse_date, FormField, SubscriptionForm};
pub use projector::{
    events_between, next_payment, occurrence_date, project, project_all, BillingEvent, HORIZON,
};
pub use store::SubscriptionStore;
pub use subscription::{Frequency, LogoRef, Price, Subscription};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
