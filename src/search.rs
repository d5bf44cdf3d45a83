use std::{
    collections::HashMap,
    future::Future,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tracing::debug;

/// Latest-request-wins coordination for live search.
///
/// Every request registers a new generation for its session, then waits out
/// the debounce delay. Only the newest generation of a session reaches the
/// CMS, and its result is dropped if a newer one arrived while it was in
/// flight.
pub struct SearchDebouncer {
    delay: Duration,
    generation: AtomicU64,
    latest: Mutex<HashMap<String, u64>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    session: String,
    generation: u64,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, generation: AtomicU64::new(0), latest: Mutex::default() }
    }

    /// Opaque id for a new search page.
    pub fn new_session(&self) -> String {
        format!("s{}", self.generation.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub fn issue(&self, session: &str) -> Ticket {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session.to_string(), generation);
        Ticket { session: session.to_string(), generation }
    }

    pub fn is_latest(&self, ticket: &Ticket) -> bool {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&ticket.session)
            .is_some_and(|g| *g == ticket.generation)
    }

    fn finish(&self, ticket: &Ticket) {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        if latest.get(&ticket.session) == Some(&ticket.generation) {
            latest.remove(&ticket.session);
        }
    }

    /// Runs `search` once the debounce delay passes without a newer request
    /// for `session`. `None` means this request was superseded.
    pub async fn run<F, Fut, T>(&self, session: &str, search: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = self.issue(session);
        let guard = FinishGuard { debouncer: self, ticket: &ticket };

        tokio::time::sleep(self.delay).await;
        if !self.is_latest(&ticket) {
            debug!(session, generation = ticket.generation, "search superseded before dispatch");
            return None;
        }

        let out = search().await;
        if !self.is_latest(&ticket) {
            debug!(session, generation = ticket.generation, "search superseded in flight");
            return None;
        }

        drop(guard);
        Some(out)
    }

    #[cfg(test)]
    fn sessions(&self) -> usize {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Forgets the session when its newest request ends, including when the
/// request future is dropped because the client went away.
struct FinishGuard<'a> {
    debouncer: &'a SearchDebouncer,
    ticket: &'a Ticket,
}

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        self.debouncer.finish(self.ticket);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn rapid_keystrokes_issue_one_search() {
        let debouncer = Arc::new(SearchDebouncer::new(Duration::from_millis(300)));
        let calls = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for term in ["b", "ba", "bat"] {
            let debouncer = debouncer.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                debouncer
                    .run("s1", || async move {
                        calls.lock().unwrap().push(term);
                        term
                    })
                    .await
            }));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        assert_eq!(results, vec![None, None, Some("bat")]);
        assert_eq!(*calls.lock().unwrap(), vec!["bat"]);
        assert_eq!(debouncer.sessions(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_keystrokes_each_search() {
        let debouncer = SearchDebouncer::new(Duration::from_millis(300));
        let first = debouncer.run("s1", || async { "b" }).await;
        let second = debouncer.run("s1", || async { "ba" }).await;
        assert_eq!(first, Some("b"));
        assert_eq!(second, Some("ba"));
    }

    #[tokio::test(start_paused = true)]
    async fn sessions_are_independent() {
        let debouncer = Arc::new(SearchDebouncer::new(Duration::from_millis(300)));
        let a = {
            let d = debouncer.clone();
            tokio::spawn(async move { d.run("a", || async { 1 }).await })
        };
        let b = {
            let d = debouncer.clone();
            tokio::spawn(async move { d.run("b", || async { 2 }).await })
        };
        assert_eq!(a.await.unwrap(), Some(1));
        assert_eq!(b.await.unwrap(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn result_superseded_in_flight_is_dropped() {
        let debouncer = Arc::new(SearchDebouncer::new(Duration::from_millis(10)));
        let slow = {
            let d = debouncer.clone();
            tokio::spawn(async move {
                d.run("s", || async {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    "slow"
                })
                .await
            })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        let fast = debouncer.run("s", || async { "fast" }).await;

        assert_eq!(fast, Some("fast"));
        assert_eq!(slow.await.unwrap(), None);
    }

    #[test]
    fn new_sessions_are_unique() {
        let debouncer = SearchDebouncer::new(Duration::ZERO);
        assert_ne!(debouncer.new_session(), debouncer.new_session());
    }

    #[test]
    fn only_newest_ticket_is_latest() {
        let debouncer = SearchDebouncer::new(Duration::ZERO);
        let old = debouncer.issue("s");
        let new = debouncer.issue("s");
        assert!(!debouncer.is_latest(&old));
        assert!(debouncer.is_latest(&new));
    }
}
