use std::sync::atomic::{AtomicU64, Ordering};

use crate::ApiError;

/// Shared by every guard, so a view rebuilt for the same key never hands out
/// a generation an earlier instance already issued.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Load state of one remotely fetched piece of a view.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T> {
    Loading,
    Ready(T),
    NotFound,
    Failed(String),
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self::Loading
    }
}

impl<T> Resource<T> {
    /// Converts a fetch result into view state.
    ///
    /// A 404 becomes [`Resource::NotFound`]; any other failure becomes
    /// [`Resource::Failed`] with a user-facing message (see
    /// [`ApiError::user_message`]).
    pub fn from_result(result: Result<T, ApiError>, fallback: &str) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(err) if err.is_not_found() => Self::NotFound,
            Err(err) => Self::Failed(err.user_message(fallback)),
        }
    }

    /// Like [`Resource::from_result`], but a 404 counts as a failure. Used
    /// for collections, where "not found" has no meaning of its own.
    pub fn from_list_result(result: Result<T, ApiError>, fallback: &str) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(err) => Self::Failed(err.user_message(fallback)),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resource<U> {
        match self {
            Self::Loading => Resource::Loading,
            Self::Ready(value) => Resource::Ready(f(value)),
            Self::NotFound => Resource::NotFound,
            Self::Failed(message) => Resource::Failed(message),
        }
    }
}

/// Identifies the view load a response belongs to.
///
/// The key is the identifier the view was opened for (a group id, or a fixed
/// name for views without one). Generations are unique for the lifetime of
/// the process, across all guards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    key: String,
    generation: u64,
}

impl RequestTicket {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Drops responses that arrive after their view moved on.
///
/// Requests are never cancelled; instead every response is checked against
/// the ticket of the load that is current when it lands.
#[derive(Debug, Clone, Default)]
pub struct StaleGuard {
    current: Option<RequestTicket>,
}

impl StaleGuard {
    /// Starts a new load for `key`; every older ticket becomes stale.
    pub fn begin(&mut self, key: &str) -> RequestTicket {
        let ticket = RequestTicket {
            key: key.to_string(),
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        };
        self.current = Some(ticket.clone());
        ticket
    }

    /// Marks the view as gone: no ticket is accepted any more.
    pub fn close(&mut self) {
        self.current = None;
    }

    pub fn accepts(&self, ticket: &RequestTicket) -> bool {
        self.current.as_ref() == Some(ticket)
    }

    pub fn current(&self) -> Option<&RequestTicket> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_load_invalidates_older_tickets() {
        let mut guard = StaleGuard::default();
        let first = guard.begin("g1");
        let second = guard.begin("g1");

        assert!(!guard.accepts(&first));
        assert!(guard.accepts(&second));
    }

    #[test]
    fn key_is_part_of_the_ticket() {
        let mut guard = StaleGuard::default();
        let g1 = guard.begin("g1");
        let g2 = guard.begin("g2");

        assert_eq!(g1.key(), "g1");
        assert!(!guard.accepts(&g1));
        assert!(guard.accepts(&g2));
    }

    #[test]
    fn rebuilt_guard_rejects_tickets_of_its_predecessor() {
        let mut first = StaleGuard::default();
        let old = first.begin("g1");

        let mut rebuilt = StaleGuard::default();
        let fresh = rebuilt.begin("g1");

        assert_ne!(old.generation(), fresh.generation());
        assert!(!rebuilt.accepts(&old));
        assert!(rebuilt.accepts(&fresh));
    }

    #[test]
    fn closed_guard_accepts_nothing() {
        let mut guard = StaleGuard::default();
        let ticket = guard.begin("g1");
        guard.close();
        assert!(!guard.accepts(&ticket));
        assert!(guard.current().is_none());
    }

    #[test]
    fn not_found_is_distinct_from_failure() {
        let res: Resource<()> = Resource::from_result(
            Err(ApiError::NotFound { message: None }),
            "Failed to fetch group details",
        );
        assert_eq!(res, Resource::NotFound);

        let res: Resource<()> = Resource::from_result(
            Err(ApiError::Transport("timeout".to_string())),
            "Failed to fetch group details",
        );
        assert_eq!(res.error(), Some("Failed to fetch group details"));
    }
}
