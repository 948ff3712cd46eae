//! Acknowledgment of machine ownership transfers.
//!
//! When a machine moves to another message loop, the sender waits for the
//! receiver to confirm under a well-known name. A transfer that is not
//! acknowledged within [`OWNER_CHANGE_ACK_TIMEOUT`] is reported as timed
//! out; recovering from that is up to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// How long a sender waits for an ownership ACK.
pub const OWNER_CHANGE_ACK_TIMEOUT: Duration = Duration::from_secs(2);

const OWNER_CHANGE_ACK_PREFIX: &str = "ownerChangeAck_";

/// Name under which the receiver acknowledges transfer `id`.
///
/// ```rust
/// use cmdr_action::ownership::owner_change_ack_name;
///
/// assert_eq!(owner_change_ack_name(17), "ownerChangeAck_17");
/// ```
pub fn owner_change_ack_name(id: impl fmt::Display) -> String {
    format!("{OWNER_CHANGE_ACK_PREFIX}{id}")
}

/// Identifier of a message posted to a loop.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub f64);

impl MessageId {
    /// Returned when a message could not be posted.
    pub const INVALID: Self = Self(-66.6);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OwnerChangeStatus {
    Acknowledged,
    Pending,
    TimedOut,
}

/// A transfer waiting for its ACK.
#[derive(Clone, Debug)]
pub struct PendingOwnerChange {
    message: MessageId,
    ack_name: String,
    sent_at: DateTime<Utc>,
    acked_at: Option<DateTime<Utc>>,
    timeout_reported: bool,
}

impl PendingOwnerChange {
    /// Start waiting for the ACK of `transfer`, sent at `sent_at` as `message`.
    pub fn new(transfer: impl fmt::Display, message: MessageId, sent_at: DateTime<Utc>) -> Self {
        Self {
            message,
            ack_name: owner_change_ack_name(transfer),
            sent_at,
            acked_at: None,
            timeout_reported: false,
        }
    }

    pub fn ack_name(&self) -> &str {
        &self.ack_name
    }

    pub fn message(&self) -> MessageId {
        self.message
    }

    pub fn sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }

    /// Arrival time of the ACK, if one has been recorded.
    pub fn acked_at(&self) -> Option<DateTime<Utc>> {
        self.acked_at
    }

    /// Record an ACK named `name` that arrived at `at`.
    ///
    /// Returns whether `name` belongs to this transfer. Only the first
    /// matching ACK is kept.
    pub fn acknowledge(&mut self, name: &str, at: DateTime<Utc>) -> bool {
        let matches = name == self.ack_name;
        if matches && self.acked_at.is_none() {
            self.acked_at = Some(at);
        }
        matches
    }

    /// Status at `now`. An ACK arriving after the timeout does not count.
    pub fn status(&self, now: DateTime<Utc>) -> OwnerChangeStatus {
        if let Some(at) = self.acked_at {
            if !self.expired_at(at) {
                return OwnerChangeStatus::Acknowledged;
            }
        }
        if self.expired_at(now) {
            OwnerChangeStatus::TimedOut
        } else {
            OwnerChangeStatus::Pending
        }
    }

    // A clock that went backwards reads as "just sent".
    fn expired_at(&self, at: DateTime<Utc>) -> bool {
        matches!((at - self.sent_at).to_std(), Ok(elapsed) if elapsed >= OWNER_CHANGE_ACK_TIMEOUT)
    }

    /// Like [`status`](Self::status), logging the first observed timeout.
    pub fn poll(&mut self, now: DateTime<Utc>) -> OwnerChangeStatus {
        let status = self.status(now);
        if status == OwnerChangeStatus::TimedOut && !self.timeout_reported {
            self.timeout_reported = true;
            warn!(
                ack = %self.ack_name,
                message = %self.message,
                waited_ms = (now - self.sent_at).num_milliseconds(),
                "ownership change was not acknowledged"
            );
        }
        status
    }
}
