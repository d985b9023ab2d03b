use serde::{Deserialize, Serialize};

/// Monotonic identifier, unique within one allocator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Id(u64);

impl Id {
    pub fn new(n: u64) -> Self {
        Id(n)
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out ids starting at 1; ids are never reused.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> Id {
        let id = Id(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::{Id, IdAllocator};

    #[test]
    fn allocates_increasing_ids() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next_id(), Id::new(1));
        assert_eq!(ids.next_id(), Id::new(2));
        assert!(ids.next_id() > Id::new(2));
    }
}
