use crate::arena::Handle;
use crate::pending_queue::PendingQueue;

/// Handles kept in descending byte-wise order of their derived sort key.
///
/// Built fresh for every sort pass: filled from the pending queue, then
/// drained back into it.
#[derive(Debug, Default)]
pub struct OrderedIndex {
    items: Vec<Handle>,
}

impl OrderedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Handle> + '_ {
        self.items.iter().copied()
    }

    /// Inserts `handle` in front of the first element whose key sorts below
    /// the new key. Equal keys keep their encounter order.
    pub fn insert_sorted<'a, F>(&mut self, handle: Handle, sort_key: F)
    where
        F: Fn(Handle) -> &'a str,
    {
        let new_key = sort_key(handle).as_bytes();

        let Some(head) = self.items.first().copied() else {
            self.items.push(handle);
            return;
        };
        if new_key > sort_key(head).as_bytes() {
            self.items.insert(0, handle);
            return;
        }

        let pos = self
            .items
            .iter()
            .skip(1)
            .position(|existing| new_key > sort_key(*existing).as_bytes())
            .map(|offset| offset + 1)
            .unwrap_or(self.items.len());
        self.items.insert(pos, handle);
    }

    /// Empties the index into `queue` in sorted order. Returns how many
    /// handles were moved.
    pub fn drain_to_queue(&mut self, queue: &mut PendingQueue) -> usize {
        let moved = self.items.len();
        for handle in self.items.drain(..) {
            queue.enqueue(handle);
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::RecordArena;
    use crate::record::{PartialRecord, Record};
    use chrono::NaiveDate;

    fn arena_with(entries: &[(&str, Option<&str>, Option<&str>)]) -> (RecordArena, Vec<Handle>) {
        let mut arena = RecordArena::new();
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let handles = entries
            .iter()
            .map(|(url, author, title)| {
                let mut record = Record::new(*url, date);
                record.apply(&PartialRecord {
                    author: author.map(str::to_owned),
                    title: title.map(str::to_owned),
                    year: None,
                });
                arena.create(record).unwrap()
            })
            .collect();
        (arena, handles)
    }

    fn sorted(arena: &RecordArena, handles: &[Handle]) -> Vec<Handle> {
        let mut index = OrderedIndex::new();
        let key = |h: Handle| arena.get(h).map(Record::sort_key).unwrap_or_default();
        for handle in handles {
            index.insert_sorted(*handle, key);
        }
        index.iter().collect()
    }

    #[test]
    fn orders_descending_with_fallback_keys() {
        let (arena, h) = arena_with(&[
            ("https://a.com", Some("Smith"), None),
            ("https://b.com", None, Some("Guide")),
            ("https://www.zeta.org", None, None),
        ]);

        assert_eq!(sorted(&arena, &h), vec![h[2], h[0], h[1]]);
    }

    #[test]
    fn equal_keys_keep_encounter_order() {
        let (arena, h) = arena_with(&[
            ("https://1.com", Some("Same"), None),
            ("https://2.com", Some("Same"), None),
            ("https://3.com", Some("Other"), None),
            ("https://4.com", Some("Same"), None),
        ]);

        assert_eq!(sorted(&arena, &h), vec![h[0], h[1], h[3], h[2]]);
    }

    #[test]
    fn prefix_sorts_after_longer_key() {
        let (arena, h) = arena_with(&[
            ("https://1.com", Some("Ab"), None),
            ("https://2.com", Some("Abc"), None),
        ]);

        assert_eq!(sorted(&arena, &h), vec![h[1], h[0]]);
    }

    #[test]
    fn drain_moves_everything_in_order() {
        let (arena, h) = arena_with(&[
            ("https://1.com", Some("a"), None),
            ("https://2.com", Some("c"), None),
            ("https://3.com", Some("b"), None),
        ]);
        let mut index = OrderedIndex::new();
        let key = |h: Handle| arena.get(h).map(Record::sort_key).unwrap_or_default();
        for handle in &h {
            index.insert_sorted(*handle, key);
        }

        let mut queue = PendingQueue::new();
        assert_eq!(index.drain_to_queue(&mut queue), 3);
        assert!(index.is_empty());
        assert_eq!(queue.iter().collect::<Vec<_>>(), vec![h[1], h[2], h[0]]);
    }
}
