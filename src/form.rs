// 📝 Add Subscription Form - Raw field values until submit turns them into a record
//
// Used by both front ends: the TUI modal edits the fields in place, the web
// server deserializes a JSON body straight into it. Validation happens in
// exactly one place, `submit`.

use crate::error::{Result, SubscriptionError};
use crate::subscription::{Frequency, LogoRef, Price, Subscription};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// FORM FIELDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Price,
    StartDate,
    Frequency,
    Logo,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Name,
        FormField::Price,
        FormField::StartDate,
        FormField::Frequency,
        FormField::Logo,
    ];

    pub fn next(&self) -> Self {
        match self {
            FormField::Name => FormField::Price,
            FormField::Price => FormField::StartDate,
            FormField::StartDate => FormField::Frequency,
            FormField::Frequency => FormField::Logo,
            FormField::Logo => FormField::Name,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            FormField::Name => FormField::Logo,
            FormField::Price => FormField::Name,
            FormField::StartDate => FormField::Price,
            FormField::Frequency => FormField::StartDate,
            FormField::Logo => FormField::Frequency,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Subscription Name",
            FormField::Price => "Price",
            FormField::StartDate => "Start Date",
            FormField::Frequency => "Billing Frequency",
            FormField::Logo => "Logo (Optional)",
        }
    }

    /// Key used in `SubscriptionError::field` and the JSON body.
    pub fn key(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Price => "price",
            FormField::StartDate => "start_date",
            FormField::Frequency => "frequency",
            FormField::Logo => "logo",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        FormField::ALL.into_iter().find(|field| field.key() == key)
    }
}

// ============================================================================
// FORM
// ============================================================================

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a zero-padded `YYYY-MM-DD` date.
///
/// chrono alone also takes `2024-1-5` and `+2024-01-05`; only the canonical
/// spelling of a date is accepted here.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let invalid = || SubscriptionError::InvalidDate(raw.to_string());
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| invalid())?;
    if date.format(DATE_FORMAT).to_string() != raw {
        return Err(invalid());
    }
    Ok(date)
}

/// Unvalidated form input. All fields are text, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionForm {
    pub name: String,
    pub price: String,
    /// `YYYY-MM-DD`
    pub start_date: String,
    pub frequency: String,
    pub logo: Option<String>,
}

impl SubscriptionForm {
    /// Blank form: start date today, monthly billing.
    pub fn new(today: NaiveDate) -> Self {
        SubscriptionForm {
            name: String::new(),
            price: String::new(),
            start_date: today.format(DATE_FORMAT).to_string(),
            frequency: Frequency::Monthly.as_str().to_string(),
            logo: None,
        }
    }

    /// Current text of a field, for rendering.
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Price => &self.price,
            FormField::StartDate => &self.start_date,
            FormField::Frequency => &self.frequency,
            FormField::Logo => self.logo.as_deref().unwrap_or(""),
        }
    }

    /// Append a typed character. Frequency is a select box and ignores typing.
    pub fn push_char(&mut self, field: FormField, c: char) {
        match field {
            FormField::Name => self.name.push(c),
            FormField::Price => self.price.push(c),
            FormField::StartDate => self.start_date.push(c),
            FormField::Frequency => {}
            FormField::Logo => self.logo.get_or_insert_with(String::new).push(c),
        }
    }

    pub fn pop_char(&mut self, field: FormField) {
        match field {
            FormField::Name => {
                self.name.pop();
            }
            FormField::Price => {
                self.price.pop();
            }
            FormField::StartDate => {
                self.start_date.pop();
            }
            FormField::Frequency => {}
            FormField::Logo => {
                if let Some(logo) = self.logo.as_mut() {
                    logo.pop();
                    if logo.is_empty() {
                        self.logo = None;
                    }
                }
            }
        }
    }

    /// Step the frequency select box. Unknown text restarts at monthly.
    pub fn cycle_frequency(&mut self, forward: bool) {
        let next = match self.frequency.parse::<Frequency>() {
            Ok(current) if forward => current.next(),
            Ok(current) => current.previous(),
            Err(_) => Frequency::Monthly,
        };
        self.frequency = next.as_str().to_string();
    }

    /// Validate every field and build the subscription.
    ///
    /// The record gets a fresh UUID so same-named subscriptions still produce
    /// distinct event identifiers.
    pub fn submit(&self, currency_symbol: &str) -> Result<Subscription> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(SubscriptionError::MissingField("name"));
        }

        let price = Price::parse(&self.price, currency_symbol)?;

        let start_raw = self.start_date.trim();
        if start_raw.is_empty() {
            return Err(SubscriptionError::MissingField("start_date"));
        }
        let start_date = parse_date(start_raw)?;

        if self.frequency.trim().is_empty() {
            return Err(SubscriptionError::MissingField("frequency"));
        }
        let frequency: Frequency = self.frequency.parse()?;

        let logo = match self.logo.as_deref().map(str::trim) {
            Some(reference) if !reference.is_empty() => Some(LogoRef::new(reference)?),
            _ => None,
        };

        let mut record = Subscription::new(name, price, start_date, frequency)?
            .with_id(uuid::Uuid::new_v4().to_string());
        if let Some(logo) = logo {
            record = record.with_logo(logo);
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn filled() -> SubscriptionForm {
        SubscriptionForm {
            name: "Netflix".to_string(),
            price: "15.99".to_string(),
            start_date: "2024-01-31".to_string(),
            frequency: "monthly".to_string(),
            logo: None,
        }
    }

    #[test]
    fn test_new_form_defaults() {
        let form = SubscriptionForm::new(date("2024-06-05"));
        assert_eq!(form.start_date, "2024-06-05");
        assert_eq!(form.frequency, "monthly");
        assert!(form.name.is_empty());
        assert!(form.price.is_empty());
        assert!(form.logo.is_none());
    }

    #[test]
    fn test_submit_valid_form() {
        let sub = filled().submit("$").unwrap();
        assert_eq!(sub.name(), "Netflix");
        assert_eq!(sub.price().to_string(), "$15.99");
        assert_eq!(sub.start_date(), date("2024-01-31"));
        assert_eq!(sub.frequency(), Frequency::Monthly);
        assert!(sub.id().is_some());
        assert_ne!(sub.key(), "Netflix");
    }

    #[test]
    fn test_submit_generates_distinct_ids() {
        let a = filled().submit("$").unwrap();
        let b = filled().submit("$").unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_submit_with_logo() {
        let mut form = filled();
        form.logo = Some("  ~/logos/netflix.png ".to_string());
        let sub = form.submit("$").unwrap();
        assert_eq!(sub.logo().unwrap().as_str(), "~/logos/netflix.png");

        form.logo = Some("   ".to_string());
        assert!(form.submit("$").unwrap().logo().is_none());
    }

    #[test]
    fn test_submit_rejects_each_bad_field() {
        let mut form = filled();
        form.name = "  ".to_string();
        assert_eq!(form.submit("$"), Err(SubscriptionError::MissingField("name")));

        let mut form = filled();
        form.price = String::new();
        assert_eq!(form.submit("$"), Err(SubscriptionError::MissingField("price")));

        let mut form = filled();
        form.price = "-5".to_string();
        assert_eq!(
            form.submit("$"),
            Err(SubscriptionError::NegativePrice("-5".to_string()))
        );

        let mut form = filled();
        form.start_date = "2024-02-30".to_string();
        assert_eq!(
            form.submit("$"),
            Err(SubscriptionError::InvalidDate("2024-02-30".to_string()))
        );

        let mut form = filled();
        form.start_date = "31/01/2024".to_string();
        assert!(matches!(form.submit("$"), Err(SubscriptionError::InvalidDate(_))));

        let mut form = filled();
        form.frequency = "fortnightly".to_string();
        assert_eq!(
            form.submit("$"),
            Err(SubscriptionError::UnsupportedFrequency("fortnightly".to_string()))
        );

        let mut form = filled();
        form.frequency = String::new();
        assert_eq!(form.submit("$"), Err(SubscriptionError::MissingField("frequency")));

        let mut form = filled();
        form.logo = Some("contract.pdf".to_string());
        assert_eq!(
            form.submit("$"),
            Err(SubscriptionError::UnsupportedLogo("contract.pdf".to_string()))
        );
    }

    #[test]
    fn test_submit_rejects_non_canonical_dates() {
        for raw in ["2024-1-5", "+2024-01-05", "2024-01-5", "2024-1-05", "02024-01-05"] {
            let mut form = filled();
            form.start_date = raw.to_string();
            assert_eq!(
                form.submit("$"),
                Err(SubscriptionError::InvalidDate(raw.to_string())),
                "accepted {}",
                raw
            );
        }

        let mut form = filled();
        form.start_date = " 2024-01-05 ".to_string();
        assert_eq!(form.submit("$").unwrap().start_date(), date("2024-01-05"));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-02-29"), Ok(date("2024-02-29")));
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("2024-01-05T00:00").is_err());
    }

    #[test]
    fn test_typing_edits_fields() {
        let mut form = SubscriptionForm::new(date("2024-01-01"));
        for c in "Hulu".chars() {
            form.push_char(FormField::Name, c);
        }
        form.push_char(FormField::Price, '7');
        form.push_char(FormField::Frequency, 'x');
        form.push_char(FormField::Logo, 'a');

        assert_eq!(form.value(FormField::Name), "Hulu");
        assert_eq!(form.value(FormField::Price), "7");
        assert_eq!(form.value(FormField::Frequency), "monthly");
        assert_eq!(form.value(FormField::Logo), "a");

        form.pop_char(FormField::Name);
        form.pop_char(FormField::Logo);
        assert_eq!(form.value(FormField::Name), "Hul");
        assert!(form.logo.is_none());
    }

    #[test]
    fn test_cycle_frequency() {
        let mut form = SubscriptionForm::new(date("2024-01-01"));
        form.cycle_frequency(true);
        assert_eq!(form.frequency, "yearly");
        form.cycle_frequency(true);
        assert_eq!(form.frequency, "daily");
        form.cycle_frequency(false);
        assert_eq!(form.frequency, "yearly");

        form.frequency = "bogus".to_string();
        form.cycle_frequency(true);
        assert_eq!(form.frequency, "monthly");
    }

    #[test]
    fn test_field_navigation() {
        let mut field = FormField::Name;
        for _ in 0..FormField::ALL.len() {
            field = field.next();
        }
        assert_eq!(field, FormField::Name);
        assert_eq!(FormField::Name.previous(), FormField::Logo);
        assert_eq!(FormField::from_key("start_date"), Some(FormField::StartDate));
        assert_eq!(FormField::from_key("nope"), None);
    }

    #[test]
    fn test_deserialize_partial_json() {
        let form: SubscriptionForm =
            serde_json::from_str(r#"{"name":"Hulu","price":"7.99"}"#).unwrap();
        assert_eq!(form.name, "Hulu");
        assert!(form.start_date.is_empty());
        assert_eq!(form.submit("$"), Err(SubscriptionError::MissingField("start_date")));
    }
}
