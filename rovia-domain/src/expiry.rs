use chrono::{DateTime, Utc};

/// A deadline-carrying record whose status flips to an expired terminal
/// state the moment it is observed past its deadline.
///
/// Correctness never depends on a background job: every read or write that
/// touches an implementing record calls [`flip_if_expired`] first, so the
/// flip happens inside the same critical section as the requested action.
/// Periodic sweeps exist only to keep list views fresh.
pub trait LazyExpire {
    /// The deadline after which the record is stale.
    fn deadline(&self) -> DateTime<Utc>;

    /// Whether the record is currently in a state that expiry applies to.
    fn expirable(&self) -> bool;

    /// Flip the record into its expired state.
    fn expire(&mut self);
}

/// Expire the record if its deadline has passed. Returns true when a flip happened.
pub fn flip_if_expired<T: LazyExpire>(record: &mut T, now: DateTime<Utc>) -> bool {
    if record.expirable() && now > record.deadline() {
        record.expire();
        true
    } else {
        false
    }
}
