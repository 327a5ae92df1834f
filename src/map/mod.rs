//! [`TetraMap`], an ordered map backed by a 2-3-4 tree.
//!
//! # Differences compared to [`std::collections::BTreeMap`]
//!
//! Every node holds one to three pairs and carries a parent link, so
//! cursors step to the next or previous key without a path stack and
//! without allocating. Nodes live in a pool owned by the map; child and
//! parent links are indices into that pool, which makes [`Clone`] a
//! faithful deep copy and keeps allocation amortized over batches.
//!
//! There is no key removal. The map grows until it is [`clear`]ed or
//! dropped as a whole, which is what keeps the pool free of a free list.
//!
//! [`clear`]: TetraMap::clear
//!
//! # Example
//!
//! ```
//!     use tetratree::TetraMap;
//!     let mut capitals = TetraMap::new();
//!     capitals.put("England", "London");
//!     capitals.put("France", "Paris");
//!     assert_eq!(capitals.get("France"), Some(&"Paris"));
//! ```
//!
//!# Features
//!
//! This crate supports the following cargo features:
//! - `serde` : enables serialisation of [`TetraMap`] via serde crate.

use std::{borrow::Borrow, fmt, fmt::Debug, iter::FusedIterator, mem};

mod node;
use node::{Arena, Node, NodeId, Pos, NODE_PAIRS};


/// An ordered map backed by a 2-3-4 tree.
///
/// Keys need [`Ord`]; insertion, lookup and update run in O(log n). The
/// ascending pair sequence is the same for every construction order, even
/// though the node shape may differ.
///
/// General guide to implementation:
///
/// All nodes live in an arena owned by the map, linked by index in both
/// directions. Search and insertion descend with a
/// three-way comparison per resident pair. A full node accepting one more
/// pair splits around a promoted separator, and the split cascades toward
/// the root through an explicit loop; reaching the root grows the tree by
/// exactly one level. Cursors and iterators walk the parent links instead
/// of keeping a stack.
///
/// # Example
///
/// ```
///     use tetratree::TetraMap;
///     let mut mymap = TetraMap::new();
///     mymap.put("England", "London");
///     mymap.put("France", "Paris");
///     assert_eq!(mymap.len(), 2);
/// ```
#[derive(Clone)]
pub struct TetraMap<K, V> {
    arena: Arena<K, V>,
    root: Option<NodeId>,
}

/// Where a key lives, or would land, in the tree.
enum Place {
    /// The map has no nodes at all.
    Empty,
    /// The key is resident at this position.
    Here(Pos),
    /// The key is absent; this is the leaf gap where it belongs.
    Gap(Pos),
}

impl<K, V> TetraMap<K, V> {
    /// Returns a new, empty map.
    #[must_use]
    pub fn new() -> Self {
        TetraMap {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Returns a new, empty map with node storage reserved for roughly
    /// `keys` keys, so early inserts skip pool growth.
    #[must_use]
    pub fn with_capacity(keys: usize) -> Self {
        TetraMap {
            arena: Arena::with_node_capacity(keys / 2 + 1),
            root: None,
        }
    }

    /// Get the number of keys in the map.
    ///
    /// No running count is kept; the answer is summed over the node pool
    /// in O(n).
    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.pair_total()
    }

    /// Is the map empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Discard all entries, releasing the node pool as one unit.
    pub fn clear(&mut self) {
        self.root = None;
        self.arena.clear();
    }

    /// Descend from the root with a three-way comparison per resident
    /// pair. Interior nodes always have a child per gap, so an absent key
    /// resolves to a leaf gap.
    fn place<Q>(&self, key: &Q) -> Place
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(mut id) = self.root else {
            return Place::Empty;
        };
        loop {
            let node = &self.arena[id];
            match node.pairs.binary_search_by(|(k, _)| k.borrow().cmp(key)) {
                Ok(slot) => return Place::Here(Pos { node: id, slot }),
                Err(slot) => match node.kids.get(slot) {
                    Some(&kid) => id = kid,
                    None => return Place::Gap(Pos { node: id, slot }),
                },
            }
        }
    }

    /// Get a reference to the value assigned to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.place(key) {
            Place::Here(pos) => Some(&self.arena[pos.node].pairs[pos.slot].1),
            _ => None,
        }
    }

    /// Get a mutable reference to the value assigned to the key, for
    /// mutation in place.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.place(key) {
            Place::Here(pos) => Some(&mut self.arena[pos.node].pairs[pos.slot].1),
            _ => None,
        }
    }

    /// Does the map have an entry for the key?
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        matches!(self.place(key), Place::Here(_))
    }

    /// Assign the value to the key if and only if the key is absent.
    /// Returns whether the pair was inserted; `false` leaves the map
    /// untouched.
    pub fn insert(&mut self, key: K, value: V) -> bool
    where
        K: Ord,
    {
        match self.place(&key) {
            Place::Here(_) => false,
            Place::Empty => {
                let root = self.arena.alloc(Node::leaf(None, (key, value)));
                self.root = Some(root);
                true
            }
            Place::Gap(pos) => {
                self.wedge(pos, (key, value));
                true
            }
        }
    }

    /// Assign the value to the key whether the key is present or not. The
    /// result is equivalent to `m.insert(k, v) || m.update(&k, v)` in
    /// either order.
    pub fn put(&mut self, key: K, value: V)
    where
        K: Ord,
    {
        match self.place(&key) {
            Place::Here(pos) => self.arena[pos.node].pairs[pos.slot].1 = value,
            Place::Empty => {
                let root = self.arena.alloc(Node::leaf(None, (key, value)));
                self.root = Some(root);
            }
            Place::Gap(pos) => self.wedge(pos, (key, value)),
        }
    }

    /// Assign the value to the key if and only if the key is present.
    /// Returns whether the value was replaced. Never restructures the
    /// tree.
    pub fn update<Q>(&mut self, key: &Q, value: V) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.get_mut(key) {
            Some(v) => {
                *v = value;
                true
            }
            None => false,
        }
    }

    /// Land a new pair in a leaf gap, splitting on overflow.
    fn wedge(&mut self, pos: Pos, pair: (K, V)) {
        let leaf = &mut self.arena[pos.node];
        if leaf.pairs.len() < NODE_PAIRS {
            leaf.pairs.insert(pos.slot, pair);
            return;
        }
        self.bubble(pos.node, pos.slot, pair, None);
    }

    /// Split the full node `at` around the pair arriving at `slot` and
    /// carry the promoted separator plus fresh right sibling up the
    /// parent chain. Each ancestor with room absorbs the pair; each full
    /// ancestor splits again. Running out of ancestors grows a new root,
    /// the only way the tree gains a level.
    fn bubble(
        &mut self,
        mut at: NodeId,
        mut slot: usize,
        mut pair: (K, V),
        mut right: Option<NodeId>,
    ) {
        loop {
            let (promoted, fresh) = self.split(at, slot, pair, right);
            match self.arena[at].parent {
                Some(up) => {
                    let at_slot = self.arena.kid_slot(up, at);
                    if self.arena[up].pairs.len() < NODE_PAIRS {
                        let node = &mut self.arena[up];
                        node.pairs.insert(at_slot, promoted);
                        node.kids.insert(at_slot + 1, fresh);
                        return;
                    }
                    at = up;
                    slot = at_slot;
                    pair = promoted;
                    right = Some(fresh);
                }
                None => {
                    let mut top = Node::empty(None);
                    top.pairs.push(promoted);
                    top.kids.push(at);
                    top.kids.push(fresh);
                    let top = self.arena.alloc(top);
                    self.arena[at].parent = Some(top);
                    self.arena[fresh].parent = Some(top);
                    self.root = Some(top);
                    return;
                }
            }
        }
    }

    /// Split the full node `at`: the incoming pair conceptually occupies
    /// `slot` of a four-pair sequence, with `right` as the child link
    /// just past it on interior levels. The promoted separator sits next
    /// to the insertion point (sequence index 1 for slots 0 and 1, index
    /// 2 for slots 2 and 3), the lesser pairs stay in `at`, and the
    /// greater pairs move to a fresh right sibling along with the child
    /// links past the boundary, reparented.
    fn split(
        &mut self,
        at: NodeId,
        slot: usize,
        pair: (K, V),
        right: Option<NodeId>,
    ) -> ((K, V), NodeId) {
        let mid = if slot <= 1 { 1 } else { 2 };

        let node = &mut self.arena[at];
        let parent = node.parent;

        let mut seq: arrayvec::ArrayVec<(K, V), 4> = node.pairs.drain(..).collect();
        seq.insert(slot, pair);
        let mut kids: arrayvec::ArrayVec<NodeId, 5> = node.kids.drain(..).collect();
        if let Some(extra) = right {
            kids.insert(slot + 1, extra);
        }

        let mut spill = Node::empty(parent);
        spill.pairs.extend(seq.drain(mid + 1..));
        let promoted = seq.remove(mid);
        node.pairs.extend(seq);
        if !kids.is_empty() {
            spill.kids.extend(kids.drain(mid + 1..));
            node.kids.extend(kids);
        }

        let fresh = self.arena.alloc(spill);
        for i in 0..self.arena[fresh].kids.len() {
            let kid = self.arena[fresh].kids[i];
            self.arena[kid].parent = Some(fresh);
        }
        (promoted, fresh)
    }

    /// Get a cursor at the least key, or `None` when the map is empty.
    ///
    /// # Example
    ///
    /// ```
    ///     use tetratree::TetraMap;
    ///     let mut m = TetraMap::new();
    ///     m.put(2, "two");
    ///     m.put(1, "one");
    ///     let mut c = m.least().unwrap();
    ///     assert_eq!(*c.key(), 1);
    ///     assert!(c.ascend());
    ///     assert_eq!(*c.key(), 2);
    ///     assert!(!c.ascend());
    /// ```
    pub fn least(&self) -> Option<Cursor<'_, K, V>> {
        let root = self.root?;
        Some(Cursor {
            map: self,
            pos: self.arena.first_below(root),
        })
    }

    /// Get a cursor at the greatest key, or `None` when the map is empty.
    pub fn most(&self) -> Option<Cursor<'_, K, V>> {
        let root = self.root?;
        Some(Cursor {
            map: self,
            pos: self.arena.last_below(root),
        })
    }

    /// Get a cursor at the key, or `None` when the key is absent.
    pub fn at<Q>(&self, key: &Q) -> Option<Cursor<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.place(key) {
            Place::Here(pos) => Some(Cursor { map: self, pos }),
            _ => None,
        }
    }

    /// Get a mutating cursor at the least key, or `None` when the map is
    /// empty.
    pub fn least_mut(&mut self) -> Option<CursorMut<'_, K, V>> {
        let root = self.root?;
        let pos = self.arena.first_below(root);
        Some(CursorMut { map: self, pos })
    }

    /// Get a mutating cursor at the greatest key, or `None` when the map
    /// is empty.
    pub fn most_mut(&mut self) -> Option<CursorMut<'_, K, V>> {
        let root = self.root?;
        let pos = self.arena.last_below(root);
        Some(CursorMut { map: self, pos })
    }

    /// Get a mutating cursor at the key, or `None` when the key is
    /// absent.
    pub fn at_mut<Q>(&mut self, key: &Q) -> Option<CursorMut<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.place(key) {
            Place::Here(pos) => Some(CursorMut { map: self, pos }),
            _ => None,
        }
    }

    /// Get an iterator of references to key-value pairs in ascending key
    /// order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            map: self,
            next: self.root.map(|root| self.arena.first_below(root)),
        }
    }

    /// Get an iterator of references to keys in ascending order.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.iter())
    }

    /// Get an iterator of references to values, in ascending order of the
    /// matching keys.
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.iter())
    }

    /// Append clones of all pairs to `dst`, ascending by key.
    pub fn append_pairs(&self, dst: &mut Vec<(K, V)>)
    where
        K: Clone,
        V: Clone,
    {
        dst.extend(self.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Append clones of all keys to `dst`, ascending.
    pub fn append_keys(&self, dst: &mut Vec<K>)
    where
        K: Clone,
    {
        dst.extend(self.keys().cloned());
    }

    /// Append clones of all values to `dst`, in ascending order of the
    /// matching keys.
    pub fn append_values(&self, dst: &mut Vec<V>)
    where
        V: Clone,
    {
        dst.extend(self.values().cloned());
    }
}

impl<K, V> Default for TetraMap<K, V> {
    /// Creates an empty map.
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Debug, V: Debug> Debug for TetraMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for TetraMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = TetraMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for TetraMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a TetraMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

/// A position in a [`TetraMap`], stepping in either direction.
///
/// The cursor borrows the map, so the borrow checker rules out mutation
/// for as long as the cursor lives. Obtained from [`TetraMap::least`],
/// [`TetraMap::most`] or [`TetraMap::at`].
pub struct Cursor<'a, K, V> {
    map: &'a TetraMap<K, V>,
    pos: Pos,
}

impl<'a, K, V> Cursor<'a, K, V> {
    /// The key at the current position.
    #[must_use]
    pub fn key(&self) -> &'a K {
        &self.map.arena[self.pos.node].pairs[self.pos.slot].0
    }

    /// The value at the current position.
    #[must_use]
    pub fn value(&self) -> &'a V {
        &self.map.arena[self.pos.node].pairs[self.pos.slot].1
    }

    /// The key and value at the current position.
    #[must_use]
    pub fn key_value(&self) -> (&'a K, &'a V) {
        let (k, v) = &self.map.arena[self.pos.node].pairs[self.pos.slot];
        (k, v)
    }

    /// Move one key greater. Returns `false`, without moving, from the
    /// greatest key. O(1) amortized, allocation free.
    pub fn ascend(&mut self) -> bool {
        match self.map.arena.ascend(self.pos) {
            Some(pos) => {
                self.pos = pos;
                true
            }
            None => false,
        }
    }

    /// Move one key lesser. Returns `false`, without moving, from the
    /// least key. O(1) amortized, allocation free.
    pub fn descend(&mut self) -> bool {
        match self.map.arena.descend(self.pos) {
            Some(pos) => {
                self.pos = pos;
                true
            }
            None => false,
        }
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        Cursor {
            map: self.map,
            pos: self.pos,
        }
    }
}

/// A [`Cursor`] with exclusive access, allowing value replacement at the
/// current position. Obtained from [`TetraMap::least_mut`],
/// [`TetraMap::most_mut`] or [`TetraMap::at_mut`].
///
/// Values can be replaced; keys and tree shape cannot, which is what
/// keeps the position valid across [`swap`](CursorMut::swap).
pub struct CursorMut<'a, K, V> {
    map: &'a mut TetraMap<K, V>,
    pos: Pos,
}

impl<K, V> CursorMut<'_, K, V> {
    /// The key at the current position.
    #[must_use]
    pub fn key(&self) -> &K {
        &self.map.arena[self.pos.node].pairs[self.pos.slot].0
    }

    /// The value at the current position.
    #[must_use]
    pub fn value(&self) -> &V {
        &self.map.arena[self.pos.node].pairs[self.pos.slot].1
    }

    /// A mutable reference to the value at the current position.
    #[must_use]
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.map.arena[self.pos.node].pairs[self.pos.slot].1
    }

    /// Replace the value at the current position, returning the previous
    /// value.
    pub fn swap(&mut self, value: V) -> V {
        mem::replace(self.value_mut(), value)
    }

    /// Move one key greater. Returns `false`, without moving, from the
    /// greatest key.
    pub fn ascend(&mut self) -> bool {
        match self.map.arena.ascend(self.pos) {
            Some(pos) => {
                self.pos = pos;
                true
            }
            None => false,
        }
    }

    /// Move one key lesser. Returns `false`, without moving, from the
    /// least key.
    pub fn descend(&mut self) -> bool {
        match self.map.arena.descend(self.pos) {
            Some(pos) => {
                self.pos = pos;
                true
            }
            None => false,
        }
    }
}

/// Iterator of references to key-value pairs, ascending by key. Walks the
/// parent links the same way a [`Cursor`] does.
pub struct Iter<'a, K, V> {
    map: &'a TetraMap<K, V>,
    next: Option<Pos>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.next?;
        self.next = self.map.arena.ascend(pos);
        let (k, v) = &self.map.arena[pos.node].pairs[pos.slot];
        Some((k, v))
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            map: self.map,
            next: self.next,
        }
    }
}

/// Iterator of references to keys, ascending.
pub struct Keys<'a, K, V>(Iter<'a, K, V>);

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys(self.0.clone())
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.0.next().map(|(k, _)| k)
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// Iterator of references to values, in ascending order of the matching
/// keys.
pub struct Values<'a, K, V>(Iter<'a, K, V>);

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values(self.0.clone())
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.0.next().map(|(_, v)| v)
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

#[cfg(feature = "serde")]
use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

#[cfg(feature = "serde")]
use std::marker::PhantomData;

#[cfg(feature = "serde")]
impl<K: Serialize, V: Serialize> Serialize for TetraMap<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct TetraMapVisitor<K, V> {
    marker: PhantomData<fn() -> TetraMap<K, V>>,
}

#[cfg(feature = "serde")]
impl<'de, K, V> Visitor<'de> for TetraMapVisitor<K, V>
where
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
{
    type Value = TetraMap<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("TetraMap")
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut map = match access.size_hint() {
            Some(n) => TetraMap::with_capacity(n),
            None => TetraMap::new(),
        };
        while let Some((k, v)) = access.next_entry()? {
            map.put(k, v);
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> Deserialize<'de> for TetraMap<K, V>
where
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(TetraMapVisitor {
            marker: PhantomData,
        })
    }
}
