use std::{collections::VecDeque, fmt};

// UserKey
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct UserKey(u64);

impl UserKey {
    pub fn to_u64(&self) -> u64 {
        self.0
    }

    pub fn from_u64(value: u64) -> Self {
        UserKey(value)
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user {}", self.0)
    }
}

// User

/// A connected observer and the messages waiting to be delivered to it.
pub(crate) struct User {
    outgoing: VecDeque<Vec<u8>>,
    dropped: usize,
}

impl User {
    pub(crate) fn new() -> Self {
        Self {
            outgoing: VecDeque::new(),
            dropped: 0,
        }
    }

    /// Queues `message`, discarding the oldest pending one beyond `limit`.
    /// Returns true if a message was discarded.
    pub(crate) fn push(&mut self, message: Vec<u8>, limit: usize) -> bool {
        self.outgoing.push_back(message);
        if self.outgoing.len() > limit.max(1) {
            self.outgoing.pop_front();
            self.dropped += 1;
            return true;
        }
        false
    }

    pub(crate) fn take(&mut self) -> Vec<Vec<u8>> {
        self.outgoing.drain(..).collect()
    }

    pub(crate) fn pending(&self) -> usize {
        self.outgoing.len()
    }

    pub(crate) fn dropped(&self) -> usize {
        self.dropped
    }
}
