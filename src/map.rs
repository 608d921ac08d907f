//! Insertion-ordered map represented as an ordered mapping (`!!omap`).
//!
//! Plain mappings make no promise about key order. [`OrderedMap`] is written
//! as a sequence of single-pair mappings so the order survives a round trip,
//! and rejects repeated keys when it is built back.
//!
//! ## Examples
//!
//! ```rust
//! use yaml_bind::{construct, represent, OrderedMap, RepresentOptions, TagLibrary};
//!
//! let mut map = OrderedMap::new();
//! map.insert("zeta".to_string(), 1u32);
//! map.insert("alpha".to_string(), 2u32);
//!
//! let mut tags = TagLibrary::extended();
//! let mut stream = represent(&map, &mut tags, &RepresentOptions::new()).unwrap();
//! let back: OrderedMap<String, u32> = construct(&mut stream, &mut tags).unwrap();
//!
//! let keys: Vec<_> = back.keys().cloned().collect();
//! assert_eq!(keys, vec!["zeta", "alpha"]);
//! ```

use crate::construct::{Construct, Constructor};
use crate::event::EventSink;
use crate::represent::{Represent, Representer};
use crate::tag::{composite_uri, TypeTag};
use crate::Result;
use indexmap::IndexMap;
use std::borrow::{Borrow, Cow};
use std::hash::Hash;

/// A map that keeps its entries in insertion order.
///
/// This is a thin wrapper around [`IndexMap`].
///
/// # Examples
///
/// ```rust
/// use yaml_bind::OrderedMap;
///
/// let mut map = OrderedMap::new();
/// map.insert("first", 1);
/// map.insert("second", 2);
///
/// let keys: Vec<_> = map.keys().copied().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<K: Hash + Eq, V>(IndexMap<K, V>);

impl<K: Hash + Eq, V> OrderedMap<K, V> {
    /// Creates an empty `OrderedMap`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use yaml_bind::OrderedMap;
    ///
    /// let map: OrderedMap<String, i32> = OrderedMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        OrderedMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        OrderedMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained this key, the old value is returned and the
    /// key keeps its original position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use yaml_bind::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// assert!(map.insert("key", 42).is_none());
    /// assert_eq!(map.insert("key", 43), Some(42));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, K, V> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, K, V> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs of the map, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, K, V> {
        self.0.iter()
    }
}

impl<K: Hash + Eq, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V> From<IndexMap<K, V>> for OrderedMap<K, V> {
    fn from(map: IndexMap<K, V>) -> Self {
        OrderedMap(map)
    }
}

impl<K: Hash + Eq, V> From<OrderedMap<K, V>> for IndexMap<K, V> {
    fn from(map: OrderedMap<K, V>) -> Self {
        map.0
    }
}

impl<K: Hash + Eq, V> IntoIterator for OrderedMap<K, V> {
    type Item = (K, V);
    type IntoIter = indexmap::map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'m, K: Hash + Eq, V> IntoIterator for &'m OrderedMap<K, V> {
    type Item = (&'m K, &'m V);
    type IntoIter = indexmap::map::Iter<'m, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        OrderedMap(IndexMap::from_iter(iter))
    }
}

impl<K: TypeTag + Hash + Eq, V: TypeTag> TypeTag for OrderedMap<K, V> {
    fn type_uri() -> Cow<'static, str> {
        composite_uri("omap", &[K::type_uri(), V::type_uri()])
    }
}

impl<K, V> Construct for OrderedMap<K, V>
where
    K: Construct + Hash + Eq,
    V: Construct,
{
    fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
        c.expect_start_sequence::<Self>()?;
        let mut map = IndexMap::new();
        while !c.at_end_of_sequence()? {
            c.expect_start_mapping::<IndexMap<K, V>>()?;
            if c.at_end_of_mapping()? {
                return Err(c.error::<Self>("expected a single key-value pair"));
            }
            let key: K = c.construct()?;
            if map.contains_key(&key) {
                return Err(c.error::<Self>("duplicate key"));
            }
            let value: V = c.construct()?;
            if !c.at_end_of_mapping()? {
                return Err(c.error::<Self>("expected a single key-value pair"));
            }
            c.expect_end_mapping::<IndexMap<K, V>>()?;
            map.insert(key, value);
        }
        c.expect_end_sequence::<Self>()?;
        Ok(OrderedMap(map))
    }
}

impl<K, V> Represent for OrderedMap<K, V>
where
    K: Represent + Hash + Eq,
    V: Represent,
{
    fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
        r.start_sequence(&Self::type_uri())?;
        for (key, value) in self {
            r.start_mapping(&IndexMap::<K, V>::type_uri())?;
            key.represent(r)?;
            value.represent(r)?;
            r.end_mapping()?;
        }
        r.end_sequence()
    }
}
