//! Lead-time rules for the event date.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::draft::EventDetails;
use crate::policy::PricingPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Event date {date} is before the earliest possible date {earliest}")]
    TooSoon { date: NaiveDate, earliest: NaiveDate },
}

/// Days between today and the earliest event date for a guest count.
pub fn lead_time_days(guest_count: u32, policy: &PricingPolicy) -> u32 {
    if guest_count >= policy.large_event_guests {
        policy.large_event_lead_days
    } else {
        policy.lead_days
    }
}

/// Earliest legal event date, counted from today's local midnight.
pub fn earliest_event_date(guest_count: u32, today: NaiveDate, policy: &PricingPolicy) -> NaiveDate {
    let days = u64::from(lead_time_days(guest_count, policy));
    today.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

/// Effect of a guest-count change on the chosen date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCountChange {
    pub earliest: NaiveDate,
    /// The date that was cleared because it no longer satisfies the lead time.
    pub cleared_date: Option<NaiveDate>,
}

/// Sets the guest count and clears an event date the new lead time rules out.
pub fn apply_guest_count(
    event: &mut EventDetails,
    guest_count: u32,
    today: NaiveDate,
    policy: &PricingPolicy,
) -> GuestCountChange {
    event.guest_count = guest_count;
    let earliest = earliest_event_date(guest_count, today, policy);

    let cleared_date = match event.date {
        Some(date) if date < earliest => {
            tracing::debug!(%date, %earliest, guest_count, "clearing event date after lead time change");
            event.date.take()
        }
        _ => None,
    };

    GuestCountChange {
        earliest,
        cleared_date,
    }
}

/// Sets the event date if it satisfies the lead time for the current guest count.
pub fn set_event_date(
    event: &mut EventDetails,
    date: NaiveDate,
    today: NaiveDate,
    policy: &PricingPolicy,
) -> Result<(), ScheduleError> {
    let earliest = earliest_event_date(event.guest_count, today, policy);
    if date < earliest {
        return Err(ScheduleError::TooSoon { date, earliest });
    }
    event.date = Some(date);
    Ok(())
}
