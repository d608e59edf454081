use std::collections::BTreeMap;

use chrono::{Local, NaiveDateTime, SubsecRound, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::errors::BoardError;

/// Layout of store keys, e.g. `2024-05-01 13:37:00.123456`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// A single board submission, as sent over the datagram channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub username: String,
    pub message: String,
}

impl Message {
    /// Build a message from decoded form pairs.
    ///
    /// The first non-empty value of each key wins; blank values count as absent.
    pub fn from_form(pairs: &[(String, String)]) -> Result<Self, BoardError> {
        let first = |key: &'static str| {
            pairs
                .iter()
                .find(|(k, v)| k == key && !v.is_empty())
                .map(|(_, v)| v.clone())
                .ok_or(BoardError::MissingField(key))
        };

        Ok(Message {
            username: first("username")?,
            message: first("message")?,
        })
    }
}

/// One timestamp-keyed message destined for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub timestamp: String,
    pub message: Message,
}

/// Everything persisted so far. Keys sort chronologically.
pub type Store = BTreeMap<String, Message>;

/// Produces receive timestamps that strictly increase.
///
/// If the wall clock stalls or steps back, the previous stamp plus one
/// microsecond is used instead, so keys never collide within one receiver.
#[derive(Debug, Default)]
pub struct ReceiveClock {
    last: Option<NaiveDateTime>,
}

impl ReceiveClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stamp(&mut self) -> String {
        self.stamp_at(Local::now().naive_local())
    }

    fn stamp_at(&mut self, now: NaiveDateTime) -> String {
        let now = now.trunc_subsecs(6);
        let ts = match self.last {
            Some(last) if last >= now => last + TimeDelta::microseconds(1),
            _ => now,
        };
        self.last = Some(ts);
        ts.format(TIMESTAMP_FORMAT).to_string()
    }
}
