//! Request sequencing for overlapping fetches of the same resource.
//!
//! Every request takes a ticket from a monotonic counter. A response is
//! applied only while its ticket is still the latest one issued, so a slow
//! response to a superseded request can never overwrite newer data.

use std::fmt::Display;

/// Position of a request in issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }

    pub fn latest(&self) -> Option<Ticket> {
        (self.latest > 0).then_some(Ticket(self.latest))
    }
}

/// Outcome of offering a response to a [`Latest`] slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// A newer request was issued; the response was dropped.
    Stale,
}

/// A fetched value with last-issued-wins semantics and an error banner.
///
/// A failed fetch keeps the previous value and records the error; a
/// successful one replaces the value and clears the error.
#[derive(Debug, Clone)]
pub struct Latest<T> {
    sequencer: RequestSequencer,
    value: Option<T>,
    error: Option<String>,
    resolved: Option<Ticket>,
}

impl<T> Default for Latest<T> {
    fn default() -> Self {
        Latest {
            sequencer: RequestSequencer::new(),
            value: None,
            error: None,
            resolved: None,
        }
    }
}

impl<T> Latest<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a new request.
    pub fn begin(&mut self) -> Ticket {
        self.sequencer.issue()
    }

    pub fn resolve<E: Display>(&mut self, ticket: Ticket, result: Result<T, E>) -> Resolution {
        if !self.sequencer.is_current(ticket) {
            tracing::debug!(
                ticket = ticket.value(),
                latest = self.sequencer.latest().map(Ticket::value),
                "dropping stale response"
            );
            return Resolution::Stale;
        }
        match result {
            Ok(value) => {
                self.value = Some(value);
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(ticket = ticket.value(), "fetch failed: {e}");
                self.error = Some(e.to_string());
            }
        }
        self.resolved = Some(ticket);
        Resolution::Applied
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The latest issued request has not resolved yet.
    pub fn is_loading(&self) -> bool {
        self.sequencer.latest() != self.resolved
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}
