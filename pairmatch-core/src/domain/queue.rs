use crate::domain::session::SessionId;
use std::collections::VecDeque;

/// Ordered waiting list of sessions awaiting a peer.
///
/// Insertion order is arrival order and is preserved across removals;
/// a session appears at most once.
#[derive(Debug, Default)]
pub struct MatchQueue {
    ids: VecDeque<SessionId>,
}

impl MatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail; no-op when already present.
    pub fn enqueue(&mut self, id: SessionId) {
        if !self.contains(&id) {
            self.ids.push_back(id);
        }
    }

    /// Drop an entry; no-op when absent. Remaining order is untouched.
    pub fn remove(&mut self, id: &SessionId) {
        self.ids.retain(|queued| queued != id);
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.ids.iter().any(|queued| queued == id)
    }

    /// Front-to-back scan for the pairing engine.
    pub fn iter(&self) -> impl Iterator<Item = &SessionId> {
        self.ids.iter()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> SessionId {
        SessionId::from(s)
    }

    #[test]
    fn preserves_fifo_order() {
        let mut queue = MatchQueue::new();
        queue.enqueue(id("a"));
        queue.enqueue(id("b"));
        queue.enqueue(id("c"));

        let order: Vec<_> = queue.iter().map(SessionId::as_str).collect();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[test]
    fn enqueue_is_idempotent() {
        let mut queue = MatchQueue::new();
        queue.enqueue(id("a"));
        queue.enqueue(id("a"));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn removal_keeps_remaining_order() {
        let mut queue = MatchQueue::new();
        queue.enqueue(id("a"));
        queue.enqueue(id("b"));
        queue.enqueue(id("c"));
        queue.remove(&id("b"));

        let order: Vec<_> = queue.iter().map(SessionId::as_str).collect();
        assert_eq!(order, ["a", "c"]);
    }

    #[test]
    fn removing_absent_id_is_a_no_op() {
        let mut queue = MatchQueue::new();
        queue.enqueue(id("a"));
        queue.remove(&id("ghost"));
        assert_eq!(queue.len(), 1);
    }
}
