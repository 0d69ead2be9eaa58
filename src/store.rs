// 🗂️ Subscription Store - Session-scoped, append-only list of subscriptions
//
// Insertion order is display order. No dedup, no update, no delete.
// The store is an explicit value handed to whoever needs it (TUI app,
// server state); there is no global instance.

use crate::error::Result;
use crate::form::SubscriptionForm;
use crate::projector::{self, BillingEvent};
use crate::subscription::Subscription;
use log::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct SubscriptionStore {
    records: Vec<Subscription>,
}

impl SubscriptionStore {
    pub fn new() -> Self {
        SubscriptionStore {
            records: Vec::new(),
        }
    }

    /// Add a subscription at the end. Identifiers are not checked for collisions.
    pub fn append(&mut self, record: Subscription) {
        info!(
            "Added subscription '{}' ({} {}, from {})",
            record.name(),
            record.price(),
            record.frequency(),
            record.start_date()
        );
        self.records.push(record);
    }

    /// Validate a submitted form and append the resulting record.
    ///
    /// On error the store is left untouched.
    pub fn submit(
        &mut self,
        form: &SubscriptionForm,
        currency_symbol: &str,
    ) -> Result<&Subscription> {
        let record = match form.submit(currency_symbol) {
            Ok(record) => record,
            Err(err) => {
                warn!("Rejected subscription '{}': {}", form.name.trim(), err);
                return Err(err);
            }
        };

        self.append(record);
        let index = self.records.len() - 1;
        Ok(&self.records[index])
    }

    /// Read-only snapshot in insertion order.
    pub fn list(&self) -> &[Subscription] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Re-project every record into billing events.
    pub fn project(&self) -> Result<Vec<BillingEvent<'_>>> {
        projector::project_all(&self.records)
    }

    /// Average monthly spend across all subscriptions.
    pub fn monthly_total(&self) -> f64 {
        self.records.iter().map(Subscription::monthly_cost).sum()
    }
}
