//! [`TetraSet`], an ordered set backed by a 2-3-4 tree.

use std::borrow::Borrow;
use std::fmt::{self, Debug};
use std::iter::FusedIterator;

use crate::map;
use crate::map::TetraMap;

/// An ordered set backed by a 2-3-4 tree.
///
/// A thin projection of [`TetraMap`] with a unit value, exposing key-only
/// operations. The ascending key sequence is the same for every
/// construction order.
///
/// # Example
///
/// ```
///     use tetratree::TetraSet;
///     let mut locales = TetraSet::new();
///     assert!(locales.insert("de"));
///     assert!(!locales.insert("de"));
///     assert!(locales.insert("de_CH"));
///     assert_eq!(locales.len(), 2);
///     assert!(locales.contains("de"));
///     assert!(!locales.contains("de_AT"));
/// ```
#[derive(Clone)]
pub struct TetraSet<K> {
    map: TetraMap<K, ()>,
}

impl<K> TetraSet<K> {
    /// Returns a new, empty set.
    #[must_use]
    pub fn new() -> Self {
        TetraSet {
            map: TetraMap::new(),
        }
    }

    /// Returns a new, empty set with node storage reserved for roughly
    /// `keys` keys.
    #[must_use]
    pub fn with_capacity(keys: usize) -> Self {
        TetraSet {
            map: TetraMap::with_capacity(keys),
        }
    }

    /// Get the number of keys in the set. O(n), like
    /// [`TetraMap::len`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Is the set empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Discard all keys, releasing the node pool as one unit.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Add the key to the set if and only if the key is absent. Returns
    /// whether the key was added.
    pub fn insert(&mut self, key: K) -> bool
    where
        K: Ord,
    {
        self.map.insert(key, ())
    }

    /// Is the key present in the set?
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Get a cursor at the least key, or `None` when the set is empty.
    pub fn least(&self) -> Option<Cursor<'_, K>> {
        Some(Cursor(self.map.least()?))
    }

    /// Get a cursor at the greatest key, or `None` when the set is empty.
    pub fn most(&self) -> Option<Cursor<'_, K>> {
        Some(Cursor(self.map.most()?))
    }

    /// Get a cursor at the key, or `None` when the key is absent.
    pub fn at<Q>(&self, key: &Q) -> Option<Cursor<'_, K>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Some(Cursor(self.map.at(key)?))
    }

    /// Get an iterator of references to the keys in ascending order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K> {
        Iter(self.map.keys())
    }

    /// Append clones of all keys to `dst`, ascending.
    pub fn append_keys(&self, dst: &mut Vec<K>)
    where
        K: Clone,
    {
        self.map.append_keys(dst);
    }
}

impl<K> Default for TetraSet<K> {
    /// Creates an empty set.
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Debug> Debug for TetraSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: Ord> FromIterator<K> for TetraSet<K> {
    fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
        let mut set = TetraSet::new();
        set.extend(iter);
        set
    }
}

impl<K: Ord> Extend<K> for TetraSet<K> {
    fn extend<T: IntoIterator<Item = K>>(&mut self, iter: T) {
        for k in iter {
            self.insert(k);
        }
    }
}

impl<'a, K> IntoIterator for &'a TetraSet<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

/// A position in a [`TetraSet`], stepping in either direction. Obtained
/// from [`TetraSet::least`], [`TetraSet::most`] or [`TetraSet::at`].
pub struct Cursor<'a, K>(map::Cursor<'a, K, ()>);

impl<K> Clone for Cursor<'_, K> {
    fn clone(&self) -> Self {
        Cursor(self.0.clone())
    }
}

impl<'a, K> Cursor<'a, K> {
    /// The key at the current position.
    #[must_use]
    pub fn key(&self) -> &'a K {
        self.0.key()
    }

    /// Move one key greater. Returns `false`, without moving, from the
    /// greatest key.
    pub fn ascend(&mut self) -> bool {
        self.0.ascend()
    }

    /// Move one key lesser. Returns `false`, without moving, from the
    /// least key.
    pub fn descend(&mut self) -> bool {
        self.0.descend()
    }
}

/// Iterator of references to keys, ascending.
pub struct Iter<'a, K>(map::Keys<'a, K, ()>);

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Iter(self.0.clone())
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.0.next()
    }
}

impl<K> FusedIterator for Iter<'_, K> {}

#[cfg(feature = "serde")]
use serde::{
    de::{SeqAccess, Visitor},
    ser::SerializeSeq,
    Deserialize, Deserializer, Serialize, Serializer,
};

#[cfg(feature = "serde")]
use std::marker::PhantomData;

#[cfg(feature = "serde")]
impl<K: Serialize> Serialize for TetraSet<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for k in self {
            seq.serialize_element(k)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
struct TetraSetVisitor<K> {
    marker: PhantomData<fn() -> TetraSet<K>>,
}

#[cfg(feature = "serde")]
impl<'de, K> Visitor<'de> for TetraSetVisitor<K>
where
    K: Deserialize<'de> + Ord,
{
    type Value = TetraSet<K>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("TetraSet")
    }

    fn visit_seq<S>(self, mut access: S) -> Result<Self::Value, S::Error>
    where
        S: SeqAccess<'de>,
    {
        let mut set = match access.size_hint() {
            Some(n) => TetraSet::with_capacity(n),
            None => TetraSet::new(),
        };
        while let Some(k) = access.next_element()? {
            set.insert(k);
        }
        Ok(set)
    }
}

#[cfg(feature = "serde")]
impl<'de, K> Deserialize<'de> for TetraSet<K>
where
    K: Deserialize<'de> + Ord,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(TetraSetVisitor {
            marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::TetraSet;

    #[test]
    fn script() {
        let mut locales = TetraSet::new();
        assert_eq!(locales.len(), 0, "empty set size");
        assert!(!locales.contains("de"), "found string in empty set");
        assert!(locales.insert("de"), "new insert");
        assert_eq!(locales.len(), 1, "size after insert");
        assert!(locales.contains("de"), "single insert not found");
        assert!(!locales.insert("de"), "duplicate insert");
        assert_eq!(locales.len(), 1, "size after duplicate insert");

        assert!(
            !locales.contains("de_CH"),
            "found absent string with matching prefix"
        );
        assert!(locales.insert("de_CH"), "second insert");
        assert!(locales.contains("de_CH"), "second insert not found");
        assert!(
            locales.contains("de"),
            "first insert lost after second insert"
        );
        assert_eq!(locales.len(), 2, "size after second insert");
        assert!(!locales.contains("de_AT"), "found absent sibling key");
    }

    #[test]
    fn cursor_walk() {
        let mut primes = TetraSet::new();
        for p in [11, 2, 7, 3, 5] {
            assert!(primes.insert(p));
        }

        let mut c = primes.least().expect("least of non-empty set");
        let mut got = vec![*c.key()];
        while c.ascend() {
            got.push(*c.key());
        }
        assert_eq!(got, [2, 3, 5, 7, 11]);
        assert!(!c.ascend(), "ascend past the greatest key");

        let mut c = primes.most().expect("most of non-empty set");
        got.clear();
        got.push(*c.key());
        while c.descend() {
            got.push(*c.key());
        }
        assert_eq!(got, [11, 7, 5, 3, 2]);

        let mut c = primes.at(&5).expect("cursor at resident key");
        assert_eq!(*c.key(), 5);
        assert!(c.descend());
        assert_eq!(*c.key(), 3);
        assert!(primes.at(&4).is_none(), "cursor at absent key");
    }

    #[test]
    fn empty() {
        let nothing = TetraSet::<u64>::new();
        assert!(nothing.least().is_none());
        assert!(nothing.most().is_none());
        assert!(nothing.at(&42).is_none());
        assert_eq!(nothing.iter().count(), 0);
    }

    #[test]
    fn collected() {
        let words: TetraSet<&str> = ["to", "be", "or", "not", "to", "be"].into_iter().collect();
        assert_eq!(words.len(), 4);
        let got: Vec<&str> = words.iter().copied().collect();
        assert_eq!(got, ["be", "not", "or", "to"]);
        assert_eq!(format!("{words:?}"), r#"{"be", "not", "or", "to"}"#);

        let mut keys = Vec::new();
        words.append_keys(&mut keys);
        assert_eq!(keys, ["be", "not", "or", "to"]);
    }
}
