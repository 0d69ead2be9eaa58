// 💳 Subscription - A recurring charge the user wants to see on the calendar
//
// A Subscription is a VALUE: created once from a validated form, never mutated.
// Identity is the optional id; when it is missing the name doubles as the key.

use crate::error::{Result, SubscriptionError};
use crate::projector::{occurrence_date, HORIZON};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// FREQUENCY
// ============================================================================

/// How often a subscription bills.
///
/// Closed set: anything else is rejected by `FromStr` with
/// `SubscriptionError::UnsupportedFrequency` before a record exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Yearly,
    ];

    /// Wire/form value ("daily", "weekly", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }

    /// Human label for select boxes and tables
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Frequency::Daily => Frequency::Weekly,
            Frequency::Weekly => Frequency::Monthly,
            Frequency::Monthly => Frequency::Yearly,
            Frequency::Yearly => Frequency::Daily,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Frequency::Daily => Frequency::Yearly,
            Frequency::Weekly => Frequency::Daily,
            Frequency::Monthly => Frequency::Weekly,
            Frequency::Yearly => Frequency::Monthly,
        }
    }

    /// Number of charges per average month, for monthly cost totals.
    pub fn charges_per_month(&self) -> f64 {
        match self {
            Frequency::Daily => 365.0 / 12.0,
            Frequency::Weekly => 52.0 / 12.0,
            Frequency::Monthly => 1.0,
            Frequency::Yearly => 1.0 / 12.0,
        }
    }
}

impl FromStr for Frequency {
    type Err = SubscriptionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            _ => Err(SubscriptionError::UnsupportedFrequency(s.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PRICE
// ============================================================================

/// Non-negative amount in cents plus the currency symbol it is shown with.
///
/// Displays as `"$9.99"`, which is also how it serializes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price {
    cents: u64,
    symbol: String,
}

impl Price {
    pub fn from_cents(cents: u64, symbol: &str) -> Self {
        Price {
            cents,
            symbol: symbol.to_string(),
        }
    }

    /// Parse a form amount such as `"9.99"`, `"10"`, `"$4.5"`.
    ///
    /// A leading `symbol` is accepted. Any other currency sign is rejected
    /// rather than silently re-denominated.
    /// At most two fractional digits, matching a `step=0.01` input.
    pub fn parse(input: &str, symbol: &str) -> Result<Self> {
        let trimmed = input.trim();
        let unprefixed = trimmed
            .strip_prefix(symbol)
            .unwrap_or(trimmed)
            .trim();

        if unprefixed.is_empty() {
            return Err(SubscriptionError::MissingField("price"));
        }

        let (negative, digits) = match unprefixed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, unprefixed.strip_prefix('+').unwrap_or(unprefixed)),
        };

        let invalid = || SubscriptionError::InvalidPrice(input.trim().to_string());

        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if fraction.len() > 2 {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole_value: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let fraction_value: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        let cents = whole_value
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction_value))
            .ok_or_else(invalid)?;

        // "-0" and "-0.00" are zero, which the min=0 bound allows
        if negative && cents > 0 {
            return Err(SubscriptionError::NegativePrice(input.trim().to_string()));
        }

        Ok(Price::from_cents(cents, symbol))
    }

    pub fn cents(&self) -> u64 {
        self.cents
    }

    pub fn amount(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}.{:02}", self.symbol, self.cents / 100, self.cents % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// LOGO
// ============================================================================

const IMAGE_EXTENSIONS: [&str; 9] = [
    "png", "jpg", "jpeg", "gif", "svg", "webp", "bmp", "ico", "avif",
];

/// Session-local reference to an image: a file path, an http(s) URL, a
/// `data:image/...` URI or a browser `blob:` URL from a file picker.
/// Never read or uploaded, only displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LogoRef(String);

impl LogoRef {
    pub fn new(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        // The browser already filtered blob URLs with accept="image/*"
        if reference.starts_with("data:image/") || reference.starts_with("blob:") {
            return Ok(LogoRef(reference.to_string()));
        }

        // Query strings and fragments are not part of the file name
        let path = reference
            .split(|c: char| c == '?' || c == '#')
            .next()
            .unwrap_or(reference);

        let extension = std::path::Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        match extension {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => {
                Ok(LogoRef(reference.to_string()))
            }
            _ => Err(SubscriptionError::UnsupportedLogo(reference.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// SUBSCRIPTION
// ============================================================================

/// One recurring subscription.
///
/// Fields are private so the invariants checked in `new` hold for the whole
/// lifetime of the value: non-empty name, and a start date whose full
/// projection horizon stays inside the calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subscription {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    price: Price,
    start_date: NaiveDate,
    frequency: Frequency,
    #[serde(skip_serializing_if = "Option::is_none")]
    logo: Option<LogoRef>,
}

impl Subscription {
    pub fn new(
        name: &str,
        price: Price,
        start_date: NaiveDate,
        frequency: Frequency,
    ) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SubscriptionError::MissingField("name"));
        }

        if occurrence_date(start_date, frequency, HORIZON).is_none() {
            return Err(SubscriptionError::DateOutOfRange(start_date.to_string()));
        }

        Ok(Subscription {
            id: None,
            name: name.to_string(),
            price,
            start_date,
            frequency,
            logo: None,
        })
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.id = if id.trim().is_empty() { None } else { Some(id) };
        self
    }

    pub fn with_logo(mut self, logo: LogoRef) -> Self {
        self.logo = Some(logo);
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Identifier if set, otherwise the name.
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> &Price {
        &self.price
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn logo(&self) -> Option<&LogoRef> {
        self.logo.as_ref()
    }

    /// Average cost per month, used for the store total.
    pub fn monthly_cost(&self) -> f64 {
        self.price.amount() * self.frequency.charges_per_month()
    }
}
