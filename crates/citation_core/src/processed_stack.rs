use crate::arena::Handle;

/// LIFO of handles that finished processing.
#[derive(Debug, Default, Clone)]
pub struct ProcessedStack {
    // Top of the stack is the last element.
    items: Vec<Handle>,
}

impl ProcessedStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handle: Handle) {
        self.items.push(handle);
    }

    pub fn pop(&mut self) -> Option<Handle> {
        self.items.pop()
    }

    pub fn peek(&self) -> Option<Handle> {
        self.items.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Top-to-bottom, i.e. the order `pop` would return.
    pub fn iter(&self) -> impl Iterator<Item = Handle> + '_ {
        self.items.iter().rev().copied()
    }

    /// Excises the first handle from the top whose resolved key equals `key`.
    pub fn remove_by_key<'a, F>(&mut self, key: &str, resolve: F) -> Option<Handle>
    where
        F: Fn(Handle) -> Option<&'a str>,
    {
        let pos = self
            .items
            .iter()
            .rposition(|handle| resolve(*handle) == Some(key))?;
        Some(self.items.remove(pos))
    }
}
