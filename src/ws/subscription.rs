//! Per-connection subscription manager.
//!
//! Tracks which streams a WebSocket client is subscribed to and provides
//! server-side event filtering.

use std::collections::HashSet;

use crate::domain::StreamKind;

/// Wildcard stream name.
pub const WILDCARD: &str = "*";

/// Manages the set of stream subscriptions for a single WebSocket
/// connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed streams. If `subscribe_all` is true, this set is ignored.
    streams: HashSet<StreamKind>,
    /// Whether the client subscribes to all streams (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds streams to the subscription set. `wildcard` enables all.
    pub fn subscribe(&mut self, streams: &[StreamKind], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.streams.extend(streams.iter().copied());
    }

    /// Removes streams from the subscription set. `wildcard` also drops
    /// the wildcard subscription.
    pub fn unsubscribe(&mut self, streams: &[StreamKind], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for stream in streams {
            self.streams.remove(stream);
        }
    }

    /// Returns `true` if an event of `stream` should be forwarded.
    /// Session-wide events (`None`) always are.
    #[must_use]
    pub fn matches(&self, stream: Option<StreamKind>) -> bool {
        match stream {
            None => true,
            Some(kind) => self.subscribe_all || self.streams.contains(&kind),
        }
    }

    /// Returns the number of explicitly subscribed streams.
    #[must_use]
    pub fn count(&self) -> usize {
        self.streams.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

/// Splits stream names into known kinds and the wildcard flag. Unknown
/// names are ignored.
#[must_use]
pub fn parse_streams(names: &[String]) -> (Vec<StreamKind>, bool) {
    let mut kinds = Vec::new();
    let mut wildcard = false;
    for name in names {
        if name == WILDCARD {
            wildcard = true;
        } else if let Some(kind) = StreamKind::from_name(name) {
            kinds.push(kind);
        }
    }
    (kinds, wildcard)
}
