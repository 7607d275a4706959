//! Byte-Budgeted LRU Cache
//!
//! A least-recently-used cache whose capacity is measured in bytes (`len(key) + size(value)`)
//! rather than entry count. Recency is tracked by an intrusive doubly-linked list stored in a
//! slot vector: `head` is the most recently used entry, `tail` the least.
//!
//! Not thread-safe on its own: the list and the index must move together, so the owner wraps
//! the whole cache in one lock (see [`Store`](super::cache::Store)).

use std::collections::HashMap;

/// Anything stored in the cache reports its size in bytes.
pub trait ByteSize {
    fn byte_size(&self) -> usize;
}

impl ByteSize for String {
    fn byte_size(&self) -> usize {
        self.len()
    }
}

impl ByteSize for Vec<u8> {
    fn byte_size(&self) -> usize {
        self.len()
    }
}

/// Invoked synchronously with every entry that leaves the cache.
pub type EvictionCallback<V> = Box<dyn FnMut(&str, &V) + Send>;

struct Slot<V> {
    key: String,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

pub struct LruCache<V: ByteSize> {
    /// `0` means unbounded.
    max_bytes: usize,
    used_bytes: usize,
    slots: Vec<Option<Slot<V>>>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    on_evicted: Option<EvictionCallback<V>>,
    evictions: u64,
}

impl<V: ByteSize> LruCache<V> {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            used_bytes: 0,
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            on_evicted: None,
            evictions: 0,
        }
    }

    pub fn with_eviction_callback<F>(max_bytes: usize, on_evicted: F) -> Self
    where
        F: FnMut(&str, &V) + Send + 'static,
    {
        let mut cache = Self::new(max_bytes);
        cache.on_evicted = Some(Box::new(on_evicted));
        cache
    }

    /// Inserts or updates `key`, marks it most recently used, then evicts from the tail
    /// until the byte budget holds. An entry larger than the whole budget is inserted and
    /// immediately evicted.
    pub fn add(&mut self, key: &str, value: V) {
        if let Some(&idx) = self.index.get(key) {
            self.move_to_front(idx);
            if let Some(slot) = self.slots[idx].as_mut() {
                self.used_bytes = self.used_bytes - slot.value.byte_size() + value.byte_size();
                slot.value = value;
            }
        } else {
            self.used_bytes += key.len() + value.byte_size();
            let slot = Slot {
                key: key.to_string(),
                value,
                prev: None,
                next: None,
            };
            let idx = match self.free.pop() {
                Some(idx) => {
                    self.slots[idx] = Some(slot);
                    idx
                }
                None => {
                    self.slots.push(Some(slot));
                    self.slots.len() - 1
                }
            };
            self.link_front(idx);
            self.index.insert(key.to_string(), idx);
        }

        while self.max_bytes != 0 && self.used_bytes > self.max_bytes {
            if !self.remove_oldest() {
                break;
            }
        }
    }

    /// Looks up `key` and marks it most recently used on a hit.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.move_to_front(idx);
        self.slots[idx].as_ref().map(|slot| &slot.value)
    }

    /// Looks up `key` without touching recency.
    pub fn peek(&self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.slots[idx].as_ref().map(|slot| &slot.value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        match self.index.get(key) {
            Some(&idx) => {
                self.remove_slot(idx);
                true
            }
            None => false,
        }
    }

    /// Evicts the least recently used entry. Returns `false` when the cache is empty.
    pub fn remove_oldest(&mut self) -> bool {
        match self.tail {
            Some(idx) => {
                self.remove_slot(idx);
                self.evictions += 1;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Entries evicted to honor the byte budget (explicit removals are not counted).
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            match self.slots[idx].as_ref() {
                Some(slot) => {
                    keys.push(slot.key.clone());
                    cursor = slot.next;
                }
                None => break,
            }
        }
        keys
    }

    /// Drops every entry, notifying the eviction callback for each, and resets byte
    /// accounting. The byte budget itself is kept.
    pub fn clear(&mut self) {
        let slots = std::mem::take(&mut self.slots);
        if let Some(on_evicted) = self.on_evicted.as_mut() {
            for slot in slots.into_iter().flatten() {
                on_evicted(&slot.key, &slot.value);
            }
        }
        self.free.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
        self.used_bytes = 0;
    }

    fn remove_slot(&mut self, idx: usize) {
        self.unlink(idx);
        if let Some(slot) = self.slots[idx].take() {
            self.index.remove(&slot.key);
            self.used_bytes -= slot.key.len() + slot.value.byte_size();
            self.free.push(idx);
            if let Some(on_evicted) = self.on_evicted.as_mut() {
                on_evicted(&slot.key, &slot.value);
            }
        }
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.link_front(idx);
    }

    fn link_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(slot) = self.slots[idx].as_mut() {
            slot.prev = None;
            slot.next = old_head;
        }
        match old_head.and_then(|h| self.slots[h].as_mut()) {
            Some(head) => head.prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match self.slots[idx].as_ref() {
            Some(slot) => (slot.prev, slot.next),
            None => return,
        };

        match prev.and_then(|p| self.slots[p].as_mut()) {
            Some(p) => p.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.slots[n].as_mut()) {
            Some(n) => n.prev = prev,
            None => self.tail = prev,
        }

        if let Some(slot) = self.slots[idx].as_mut() {
            slot.prev = None;
            slot.next = None;
        }
    }
}
