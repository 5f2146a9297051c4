use std::cell::Cell;
use std::rc::Rc;

/// Monotonic request counter; results captured under an older ticket are stale
#[derive(Debug, Clone, Default)]
pub struct RequestGeneration {
    current: Rc<Cell<u64>>,
}

/// Generation captured when a request was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTicket(u64);

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, invalidating every earlier ticket
    pub fn advance(&self) -> GenerationTicket {
        let next = self.current.get() + 1;
        self.current.set(next);
        GenerationTicket(next)
    }

    pub fn is_current(&self, ticket: GenerationTicket) -> bool {
        self.current.get() == ticket.0
    }

    pub fn current(&self) -> u64 {
        self.current.get()
    }
}
