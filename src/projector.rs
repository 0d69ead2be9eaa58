// 📅 Billing-Date Projector - Subscription → calendar events
//
// Pure function: the same subscription always projects to the same 13 events.
//
// Date policy:
// - Every occurrence is computed from the start date, never from the previous
//   occurrence, so a Jan 31 start keeps landing on month ends.
// - Monthly/yearly overflow clamps to the last day of the target month:
//     2024-01-31 + 1 month = 2024-02-29
//     2024-02-29 + 1 year  = 2025-02-28

use crate::error::{Result, SubscriptionError};
use crate::subscription::{Frequency, Subscription};
use chrono::{Days, Months, NaiveDate};
use log::debug;
use serde::Serialize;

/// Number of future billing periods projected after the start date.
pub const HORIZON: u32 = 12;

/// One projected billing date, shown as an all-day calendar entry.
///
/// Borrows the subscription it came from; events are rebuilt whenever the
/// subscription set changes and never outlive it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingEvent<'a> {
    /// `"{key}-{index}"`, unique as long as subscription keys are unique
    pub id: String,
    /// `"{name} - {price}"`
    pub title: String,
    pub date: NaiveDate,
    pub all_day: bool,
    /// 0 is the start date, `HORIZON` the last projected occurrence
    pub index: u32,
    #[serde(rename = "resource")]
    pub subscription: &'a Subscription,
}

impl BillingEvent<'_> {
    /// All-day events start and end on the same date.
    pub fn start(&self) -> NaiveDate {
        self.date
    }

    pub fn end(&self) -> NaiveDate {
        self.date
    }
}

/// Date of occurrence `index` for a subscription starting on `start`.
///
/// Returns `None` only when the result falls outside chrono's calendar.
pub fn occurrence_date(start: NaiveDate, frequency: Frequency, index: u32) -> Option<NaiveDate> {
    match frequency {
        Frequency::Daily => start.checked_add_days(Days::new(u64::from(index))),
        Frequency::Weekly => start.checked_add_days(Days::new(u64::from(index) * 7)),
        Frequency::Monthly => start.checked_add_months(Months::new(index)),
        Frequency::Yearly => index
            .checked_mul(12)
            .and_then(|months| start.checked_add_months(Months::new(months))),
    }
}

/// Expand one subscription into `HORIZON + 1` billing events.
pub fn project(subscription: &Subscription) -> Result<Vec<BillingEvent<'_>>> {
    let start = subscription.start_date();
    let frequency = subscription.frequency();

    let events = (0..=HORIZON)
        .map(|index| {
            let date = occurrence_date(start, frequency, index)
                .ok_or_else(|| SubscriptionError::DateOutOfRange(start.to_string()))?;

            Ok(BillingEvent {
                id: format!("{}-{}", subscription.key(), index),
                title: format!("{} - {}", subscription.name(), subscription.price()),
                date,
                all_day: true,
                index,
                subscription,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "Projected {} events for '{}' ({} from {})",
        events.len(),
        subscription.key(),
        frequency,
        start
    );

    Ok(events)
}

/// Project every subscription, in order.
pub fn project_all(subscriptions: &[Subscription]) -> Result<Vec<BillingEvent<'_>>> {
    let mut events = Vec::with_capacity(subscriptions.len() * (HORIZON as usize + 1));
    for subscription in subscriptions {
        events.extend(project(subscription)?);
    }
    Ok(events)
}

/// Events whose date lies in `from..=to`.
pub fn events_between<'e, 'a>(
    events: &'e [BillingEvent<'a>],
    from: NaiveDate,
    to: NaiveDate,
) -> impl Iterator<Item = &'e BillingEvent<'a>> {
    events
        .iter()
        .filter(move |event| event.date >= from && event.date <= to)
}

/// First projected occurrence on or after `today`, if the horizon reaches it.
pub fn next_payment(subscription: &Subscription, today: NaiveDate) -> Option<NaiveDate> {
    (0..=HORIZON)
        .filter_map(|index| {
            occurrence_date(subscription.start_date(), subscription.frequency(), index)
        })
        .find(|date| *date >= today)
}
