use std::collections::VecDeque;

use crate::arena::Handle;

/// FIFO of handles waiting to be processed.
#[derive(Debug, Default, Clone)]
pub struct PendingQueue {
    items: VecDeque<Handle>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, handle: Handle) {
        self.items.push_back(handle);
    }

    pub fn dequeue(&mut self) -> Option<Handle> {
        self.items.pop_front()
    }

    pub fn front(&self) -> Option<Handle> {
        self.items.front().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Front-to-back.
    pub fn iter(&self) -> impl Iterator<Item = Handle> + '_ {
        self.items.iter().copied()
    }

    /// Excises the first handle (front to back) whose resolved key equals
    /// `key`. Handles the resolver cannot resolve never match.
    pub fn remove_by_key<'a, F>(&mut self, key: &str, resolve: F) -> Option<Handle>
    where
        F: Fn(Handle) -> Option<&'a str>,
    {
        let pos = self
            .items
            .iter()
            .position(|handle| resolve(*handle) == Some(key))?;
        self.items.remove(pos)
    }
}
