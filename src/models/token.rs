//! Visitor token and the persisted daily counter record.

use serde::{Deserialize, Serialize};

/// Persisted daily sequence record backing visitor tokens.
///
/// Serialized as JSON `{date, count}` under a fixed storage key; the only
/// durable state this crate owns. `count` resets to 1 when `date` no
/// longer matches the current calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCounter {
    /// Calendar day (local) the count belongs to.
    pub date: String,
    /// Sequence value issued within that day, starting at 1.
    pub count: u32,
}

/// Front-desk ticket issued to a visiting customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitorToken {
    /// Daily sequence number printed large on the ticket.
    pub number: u32,
    /// Issue date (local calendar day).
    pub date: String,
    /// Issue time of day.
    pub time: String,
    /// Customer display name printed on the ticket.
    pub customer_name: String,
}
