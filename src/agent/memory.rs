//! Session memory
//!
//! Sliding window of prior human/assistant exchanges that seeds each new run.

use std::collections::VecDeque;

use crate::core::Turn;

/// Default cap: 20 exchanges
pub const DEFAULT_HISTORY_CAP: usize = 40;

/// Bounded history of one interactive session
#[derive(Debug, Clone)]
pub struct SessionMemory {
    turns: VecDeque<Turn>,
    cap: usize,
}

impl SessionMemory {
    pub fn new(cap: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            cap,
        }
    }

    /// Remember one exchange, dropping the oldest exchanges beyond the cap.
    /// Whole exchanges go together so the window always opens on a human turn.
    pub fn record(&mut self, human: impl Into<String>, answer: impl Into<String>) {
        self.turns.push_back(Turn::human(human));
        self.turns.push_back(Turn::assistant(answer));

        while self.turns.len() > self.cap {
            self.turns.drain(..2.min(self.turns.len()));
        }
    }

    /// Remembered turns, oldest first
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for SessionMemory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Role;

    #[test]
    fn test_prunes_from_front() {
        let mut memory = SessionMemory::new(4);
        memory.record("1", "one");
        memory.record("2", "two");
        memory.record("3", "three");

        assert_eq!(memory.len(), 4);
        let first = memory.turns().next().unwrap();
        assert_eq!(first.role, Role::Human);
        assert_eq!(first.content, "2");
    }

    #[test]
    fn test_odd_cap_keeps_whole_exchanges() {
        let mut memory = SessionMemory::new(5);
        memory.record("1", "one");
        memory.record("2", "two");
        memory.record("3", "three");

        let roles: Vec<Role> = memory.turns().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![Role::Human, Role::Assistant, Role::Human, Role::Assistant]
        );
        assert_eq!(memory.turns().next().unwrap().content, "2");

        let mut tiny = SessionMemory::new(1);
        tiny.record("1", "one");
        assert!(tiny.is_empty());
    }

    #[test]
    fn test_default_cap() {
        let mut memory = SessionMemory::default();
        for i in 0..30 {
            memory.record(i.to_string(), "ok");
        }
        assert_eq!(memory.len(), DEFAULT_HISTORY_CAP);
    }
}
