//! Tag registry.
//!
//! A [`TagLibrary`] maps canonical tag URIs to compact [`TagId`]s and back.
//! Libraries are seeded with one of three fixed schemas and grow as composite
//! type URIs (such as "sequence of int") are interned on demand.
//!
//! Tag ids are only meaningful inside the library that produced them; two
//! libraries may hand out different ids for the same URI.
//!
//! ## Examples
//!
//! ```rust
//! use yaml_bind::{TagLibrary, TypeTag};
//!
//! let mut tags = TagLibrary::core();
//! let first = <Vec<i32>>::type_tag(&mut tags);
//! let second = <Vec<i32>>::type_tag(&mut tags);
//! assert_eq!(first, second);
//! assert_eq!(tags.uri(first).unwrap(), "tag:yaml-bind.rs,2024:seq(tag:yaml.org,2002:int)");
//! ```

use crate::{Error, Result};
use indexmap::IndexMap;
use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;

/// Well-known tag URIs.
pub mod uri {
    pub const QUESTION_MARK: &str = "?";
    pub const EXCLAMATION_MARK: &str = "!";

    pub const STR: &str = "tag:yaml.org,2002:str";
    pub const SEQ: &str = "tag:yaml.org,2002:seq";
    pub const MAP: &str = "tag:yaml.org,2002:map";

    pub const NULL: &str = "tag:yaml.org,2002:null";
    pub const BOOL: &str = "tag:yaml.org,2002:bool";
    pub const INT: &str = "tag:yaml.org,2002:int";
    pub const FLOAT: &str = "tag:yaml.org,2002:float";

    pub const OMAP: &str = "tag:yaml.org,2002:omap";
    pub const PAIRS: &str = "tag:yaml.org,2002:pairs";
    pub const SET: &str = "tag:yaml.org,2002:set";
    pub const BINARY: &str = "tag:yaml.org,2002:binary";
    pub const MERGE: &str = "tag:yaml.org,2002:merge";
    pub const TIMESTAMP: &str = "tag:yaml.org,2002:timestamp";
    pub const VALUE: &str = "tag:yaml.org,2002:value";
    pub const YAML: &str = "tag:yaml.org,2002:yaml";

    /// Prefix of every composite and record tag produced by this crate.
    pub const PREFIX: &str = "tag:yaml-bind.rs,2024:";
}

/// Identifier of an interned tag URI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId(u32);

impl TagId {
    /// The non-specific `?` tag: the node's type is still to be resolved.
    pub const QUESTION_MARK: TagId = TagId(0);
    /// The non-specific `!` tag: the node is untyped (quoted scalars, plain collections).
    pub const EXCLAMATION_MARK: TagId = TagId(1);

    /// First id handed out to URIs outside the built-in schemas.
    pub const FIRST_CUSTOM: u32 = 1000;

    /// Returns `true` for the `?` and `!` tags.
    #[must_use]
    pub const fn is_non_specific(self) -> bool {
        self.0 == Self::QUESTION_MARK.0 || self.0 == Self::EXCLAMATION_MARK.0
    }

    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl Default for TagId {
    fn default() -> Self {
        TagId::QUESTION_MARK
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const FAILSAFE: &[&str] = &[
    uri::QUESTION_MARK,
    uri::EXCLAMATION_MARK,
    uri::STR,
    uri::SEQ,
    uri::MAP,
];

const CORE: &[&str] = &[uri::NULL, uri::BOOL, uri::INT, uri::FLOAT];

const EXTENDED: &[&str] = &[
    uri::OMAP,
    uri::PAIRS,
    uri::SET,
    uri::BINARY,
    uri::MERGE,
    uri::TIMESTAMP,
    uri::VALUE,
    uri::YAML,
];

/// Bidirectional mapping between tag URIs and [`TagId`]s.
#[derive(Debug, Clone)]
pub struct TagLibrary {
    ids: HashMap<String, TagId>,
    uris: HashMap<TagId, String>,
    next_custom: u32,
}

impl TagLibrary {
    fn seeded(schemas: &[&[&str]]) -> Self {
        let mut library = TagLibrary {
            ids: HashMap::new(),
            uris: HashMap::new(),
            next_custom: TagId::FIRST_CUSTOM,
        };
        // Built-ins occupy fixed ids below FIRST_CUSTOM in schema order.
        for (index, uri) in schemas.iter().flat_map(|s| s.iter()).enumerate() {
            library.register(uri, TagId(index as u32));
        }
        library
    }

    fn register(&mut self, uri: &str, id: TagId) {
        self.ids.insert(uri.to_string(), id);
        self.uris.insert(id, uri.to_string());
    }

    /// Library with the failsafe schema: `?`, `!`, str, seq, map.
    #[must_use]
    pub fn failsafe() -> Self {
        Self::seeded(&[FAILSAFE])
    }

    /// Library with the core schema: failsafe plus null, bool, int, float.
    #[must_use]
    pub fn core() -> Self {
        Self::seeded(&[FAILSAFE, CORE])
    }

    /// Library with the extended schema: core plus omap, pairs, set, binary,
    /// merge, timestamp, value and yaml.
    #[must_use]
    pub fn extended() -> Self {
        Self::seeded(&[FAILSAFE, CORE, EXTENDED])
    }

    /// Returns the id of `uri`, allocating a fresh one if the URI is new.
    pub fn intern(&mut self, uri: &str) -> TagId {
        if let Some(id) = self.ids.get(uri) {
            return *id;
        }
        let id = TagId(self.next_custom);
        self.next_custom += 1;
        self.register(uri, id);
        id
    }

    /// Looks up the id of `uri` without interning it.
    #[must_use]
    pub fn get(&self, uri: &str) -> Option<TagId> {
        self.ids.get(uri).copied()
    }

    /// Resolves an id back to its URI.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTag`] if `id` was not interned in this library.
    pub fn uri(&self, id: TagId) -> Result<&str> {
        self.uris
            .get(&id)
            .map(String::as_str)
            .ok_or(Error::UnknownTag(id))
    }

    /// Number of URIs known to this library.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for TagLibrary {
    fn default() -> Self {
        Self::extended()
    }
}

/// Types with a canonical tag URI.
///
/// Composite types build their URI from the URIs of their element types, so
/// structurally identical types always intern to the same id within a library.
pub trait TypeTag {
    /// Canonical URI for this type.
    fn type_uri() -> Cow<'static, str>;

    /// Interns [`TypeTag::type_uri`] in `tags`.
    fn type_tag(tags: &mut TagLibrary) -> TagId {
        tags.intern(&Self::type_uri())
    }
}

/// Builds `<prefix><name>(<arg>;<arg>...)`.
pub(crate) fn composite_uri(name: &str, args: &[Cow<'static, str>]) -> Cow<'static, str> {
    let mut uri = String::with_capacity(uri::PREFIX.len() + name.len() + 2);
    uri.push_str(uri::PREFIX);
    uri.push_str(name);
    uri.push('(');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            uri.push(';');
        }
        uri.push_str(arg);
    }
    uri.push(')');
    Cow::Owned(uri)
}

macro_rules! scalar_type_tag {
    ($uri:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl TypeTag for $ty {
                fn type_uri() -> Cow<'static, str> {
                    Cow::Borrowed($uri)
                }
            }
        )+
    };
}

scalar_type_tag!(uri::STR => String, str);
scalar_type_tag!(uri::BOOL => bool);
scalar_type_tag!(uri::INT => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
scalar_type_tag!(uri::FLOAT => f32, f64);
scalar_type_tag!(uri::NULL => ());

impl TypeTag for char {
    fn type_uri() -> Cow<'static, str> {
        Cow::Owned(format!("{}char", uri::PREFIX))
    }
}

macro_rules! sequence_type_tag {
    ($name:literal => $($ty:ident),+) => {
        $(
            impl<T: TypeTag> TypeTag for $ty<T> {
                fn type_uri() -> Cow<'static, str> {
                    composite_uri($name, &[T::type_uri()])
                }
            }
        )+
    };
}

sequence_type_tag!("seq" => Vec, VecDeque);
sequence_type_tag!("set" => BTreeSet);

impl<T: TypeTag, S> TypeTag for HashSet<T, S> {
    fn type_uri() -> Cow<'static, str> {
        composite_uri("set", &[T::type_uri()])
    }
}

impl<T: TypeTag> TypeTag for [T] {
    fn type_uri() -> Cow<'static, str> {
        composite_uri("seq", &[T::type_uri()])
    }
}

impl<T: TypeTag, const N: usize> TypeTag for [T; N] {
    fn type_uri() -> Cow<'static, str> {
        composite_uri("array", &[Cow::Owned(N.to_string()), T::type_uri()])
    }
}

macro_rules! map_type_tag {
    ($($ty:ident),+) => {
        $(
            impl<K: TypeTag, V: TypeTag, S> TypeTag for $ty<K, V, S> {
                fn type_uri() -> Cow<'static, str> {
                    composite_uri("map", &[K::type_uri(), V::type_uri()])
                }
            }
        )+
    };
}

map_type_tag!(HashMap, IndexMap);

impl<K: TypeTag, V: TypeTag> TypeTag for BTreeMap<K, V> {
    fn type_uri() -> Cow<'static, str> {
        composite_uri("map", &[K::type_uri(), V::type_uri()])
    }
}

macro_rules! tuple_type_tag {
    ($($name:ident)+) => {
        impl<$($name: TypeTag),+> TypeTag for ($($name,)+) {
            fn type_uri() -> Cow<'static, str> {
                composite_uri("tuple", &[$($name::type_uri()),+])
            }
        }
    };
}

tuple_type_tag!(A);
tuple_type_tag!(A B);
tuple_type_tag!(A B C);
tuple_type_tag!(A B C D);
tuple_type_tag!(A B C D E);
tuple_type_tag!(A B C D E F);

// Wrappers carry the tag of what they wrap.

impl<T: TypeTag> TypeTag for Option<T> {
    fn type_uri() -> Cow<'static, str> {
        T::type_uri()
    }
}

impl<T: TypeTag + ?Sized> TypeTag for Box<T> {
    fn type_uri() -> Cow<'static, str> {
        T::type_uri()
    }
}

impl<T: TypeTag> TypeTag for Rc<RefCell<T>> {
    fn type_uri() -> Cow<'static, str> {
        T::type_uri()
    }
}

impl<T: TypeTag + ?Sized> TypeTag for &T {
    fn type_uri() -> Cow<'static, str> {
        T::type_uri()
    }
}
