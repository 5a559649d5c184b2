//! Decides whether an event satisfies a rule filter.

use rulehook_core::EventData;

use crate::filter::{parse_filter, SearchFilter};

/// Parse `filter` and test it against `event`.
pub fn is_valid(filter: &str, event: &EventData) -> bool {
    matches(&parse_filter(filter), event)
}

/// Test an already-parsed filter against `event`.
///
/// A subscription requirement only passes when the event names a
/// subscription and it equals the filter value exactly (or the filter is
/// `*`). No case folding or trimming is applied.
pub fn matches(filter: &SearchFilter, event: &EventData) -> bool {
    let Some(required) = filter.subscription_filter.as_deref() else {
        return true;
    };

    match event.subscription.as_deref() {
        Some(actual) => required == "*" || required == actual,
        None => false,
    }
}
