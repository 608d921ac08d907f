//! Construction: building native values from an event stream.
//!
//! Every constructible type implements [`Construct`], which pulls exactly the
//! events of one node from a [`Constructor`]. The constructor owns the
//! per-document anchor table used to resolve aliases to shared references.
//!
//! ## Shared references
//!
//! `Rc<RefCell<T>>` is the reference type that can be anchored and aliased.
//! The cell is allocated and registered under its anchor *before* its content
//! is built, so content may alias back to the cell itself or to any ancestor.
//! Cells are registered per content type: a reference whose content starts
//! with another reference shares that node, and so its anchor, with it.
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use yaml_bind::{construct, notation, TagLibrary};
//!
//! let mut tags = TagLibrary::core();
//! let mut stream = notation::parse(
//!     "+DOC\n+SEQ\n=VAL &a1 :shared\n=ALI *a1\n-SEQ\n-DOC",
//!     &mut tags,
//! )
//! .unwrap();
//!
//! let items: Vec<Rc<RefCell<String>>> = construct(&mut stream, &mut tags).unwrap();
//! assert!(Rc::ptr_eq(&items[0], &items[1]));
//! ```

use crate::event::{AnchorId, Event, EventStream};
use crate::hint::{guess_type, ScalarHint};
use crate::options::{ConstructOptions, UnknownFields};
use crate::tag::{uri, TagId, TagLibrary, TypeTag};
use crate::{Error, Result};
use indexmap::IndexMap;
use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;
use std::str::FromStr;
use tracing::{debug, trace};

/// Types that can be built from the events of a single node.
pub trait Construct: TypeTag + Sized {
    fn construct(c: &mut Constructor<'_, '_>) -> Result<Self>;

    /// Whether the node of this type may open with an alias: true for shared
    /// references and for the wrappers that forward to them.
    fn opens_with_reference() -> bool {
        false
    }
}

/// Construction context for one document.
pub struct Constructor<'s, 'a> {
    stream: &'s mut EventStream<'a>,
    tags: &'s mut TagLibrary,
    options: ConstructOptions,
    /// Cells by anchor and content type.
    refs: HashMap<(AnchorId, TypeId), Rc<dyn Any>>,
}

impl<'s, 'a> Constructor<'s, 'a> {
    pub fn new(
        stream: &'s mut EventStream<'a>,
        tags: &'s mut TagLibrary,
        options: ConstructOptions,
    ) -> Self {
        Constructor {
            stream,
            tags,
            options,
            refs: HashMap::new(),
        }
    }

    /// Constructs the next node as a `T`.
    pub fn construct<T: Construct>(&mut self) -> Result<T> {
        T::construct(self)
    }

    pub fn next_event(&mut self) -> Result<Event> {
        self.stream.next()
    }

    pub fn peek_event(&mut self) -> Result<&Event> {
        self.stream.peek()
    }

    pub fn tags(&mut self) -> &mut TagLibrary {
        self.tags
    }

    #[must_use]
    pub fn options(&self) -> &ConstructOptions {
        &self.options
    }

    /// Construction error for target type `R`, positioned at the current event.
    pub fn error<R: ?Sized>(&self, msg: &str) -> Error {
        Error::construction(type_name::<R>(), msg, self.stream.mark())
    }

    fn unexpected<R: ?Sized>(&self, expected: &str, found: &Event) -> Error {
        match found {
            Event::Alias { target } => self.error::<R>(&format!(
                "unexpected alias *{}; only shared references can be aliased",
                target
            )),
            other => self.error::<R>(&format!("expected {}, found {}", expected, other.kind())),
        }
    }

    fn check_tag<R: TypeTag + ?Sized>(&mut self, tag: TagId) -> Result<()> {
        if tag.is_non_specific() || tag == R::type_tag(self.tags) {
            return Ok(());
        }
        let found = self
            .tags
            .uri(tag)
            .map(str::to_string)
            .unwrap_or_else(|_| tag.to_string());
        Err(self.error::<R>(&format!("wrong tag `{}`", found)))
    }

    /// Consumes a scalar tagged `?`, `!` or `R`'s own tag and returns its content.
    pub fn expect_scalar<R: TypeTag + ?Sized>(&mut self) -> Result<String> {
        match self.stream.next()? {
            Event::Scalar { tag, content, .. } => {
                self.check_tag::<R>(tag)?;
                Ok(content)
            }
            other => Err(self.unexpected::<R>("scalar", &other)),
        }
    }

    pub fn expect_start_sequence<R: TypeTag + ?Sized>(&mut self) -> Result<()> {
        match self.stream.next()? {
            Event::StartSequence { tag, .. } => self.check_tag::<R>(tag),
            other => Err(self.unexpected::<R>("sequence start", &other)),
        }
    }

    pub fn expect_end_sequence<R: ?Sized>(&mut self) -> Result<()> {
        match self.stream.next()? {
            Event::EndSequence => Ok(()),
            other => Err(self.unexpected::<R>("sequence end", &other)),
        }
    }

    pub fn expect_start_mapping<R: TypeTag + ?Sized>(&mut self) -> Result<()> {
        match self.stream.next()? {
            Event::StartMapping { tag, .. } => self.check_tag::<R>(tag),
            other => Err(self.unexpected::<R>("mapping start", &other)),
        }
    }

    pub fn expect_end_mapping<R: ?Sized>(&mut self) -> Result<()> {
        match self.stream.next()? {
            Event::EndMapping => Ok(()),
            other => Err(self.unexpected::<R>("mapping end", &other)),
        }
    }

    pub fn at_end_of_sequence(&mut self) -> Result<bool> {
        Ok(matches!(self.stream.peek()?, Event::EndSequence))
    }

    pub fn at_end_of_mapping(&mut self) -> Result<bool> {
        Ok(matches!(self.stream.peek()?, Event::EndMapping))
    }

    /// Returns `true` if the next node is a null scalar, by tag or by content.
    pub fn null_ahead(&mut self) -> Result<bool> {
        let null = self.tags.intern(uri::NULL);
        Ok(match self.stream.peek()? {
            Event::Scalar { tag, content, .. } => {
                *tag == null
                    || (*tag == TagId::QUESTION_MARK && guess_type(content) == ScalarHint::Null)
            }
            _ => false,
        })
    }

    /// Consumes a record key and returns the field name it spells.
    pub fn field_name<R: ?Sized>(&mut self) -> Result<String> {
        match self.stream.next()? {
            Event::Scalar { tag, content, .. } => {
                if tag.is_non_specific() || tag == self.tags.intern(uri::STR) {
                    Ok(content)
                } else {
                    Err(self.error::<R>("field names must be strings"))
                }
            }
            other => Err(self.unexpected::<R>("field name", &other)),
        }
    }

    /// Constructs the value of field `name` into `slot`, rejecting repeats.
    pub fn construct_field<R: ?Sized, T: Construct>(
        &mut self,
        name: &str,
        slot: &mut Option<T>,
    ) -> Result<()> {
        if slot.is_some() {
            return Err(self.error::<R>(&format!("duplicate field `{}`", name)));
        }
        *slot = Some(self.construct::<T>()?);
        Ok(())
    }

    /// Unwraps a field slot once the whole mapping has been read.
    pub fn take_field<R: ?Sized, T>(&self, name: &str, slot: Option<T>) -> Result<T> {
        slot.ok_or_else(|| self.error::<R>(&format!("missing field `{}`", name)))
    }

    /// Handles a key that matches no field of record `R`.
    pub fn unknown_field<R: ?Sized>(&mut self, name: &str) -> Result<()> {
        match self.options.unknown_fields {
            UnknownFields::Reject => Err(self.error::<R>(&format!("unknown field `{}`", name))),
            UnknownFields::Ignore => {
                debug!(field = name, record = type_name::<R>(), "skipping unknown field");
                self.skip_node()
            }
        }
    }

    /// Consumes one complete node, whatever its shape.
    pub fn skip_node(&mut self) -> Result<()> {
        let mut depth = 0usize;
        loop {
            match self.stream.next()? {
                Event::StartMapping { .. } | Event::StartSequence { .. } => depth += 1,
                Event::EndMapping | Event::EndSequence => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| Error::stream("unbalanced collection end"))?;
                }
                Event::Scalar { .. } | Event::Alias { .. } => {}
                other => {
                    return Err(Error::stream(&format!(
                        "unexpected {} inside a node",
                        other.kind()
                    )))
                }
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }

    /// Constructs a shared reference, resolving aliases against the anchor table.
    ///
    /// An alias that names no cell of type `T` but does name a cell of another
    /// type is the first node of this reference's content when `T` can open
    /// with a reference; the new cell is then bound to that anchor as well.
    pub fn construct_shared<T>(&mut self) -> Result<Rc<RefCell<T>>>
    where
        T: Construct + Default + 'static,
    {
        let anchor = match self.stream.peek()? {
            Event::Alias { target } => {
                let target = *target;
                if let Some(cell) = self.registered::<T>(target)? {
                    trace!(%target, "resolved alias");
                    self.stream.next()?;
                    return Ok(cell);
                }
                if !self.refs.keys().any(|(anchor, _)| *anchor == target) {
                    self.stream.next()?;
                    return Err(Error::UnknownAnchor(target));
                }
                if !T::opens_with_reference() {
                    let err = self.error::<T>(&format!(
                        "alias *{} refers to a value of a different type",
                        target
                    ));
                    self.stream.next()?;
                    return Err(err);
                }
                Some(target)
            }
            event => event.anchor(),
        };

        // Register before recursing so the content can refer back to this cell.
        let cell = Rc::new(RefCell::new(T::default()));
        if let Some(anchor) = anchor {
            debug!(%anchor, type_name = type_name::<T>(), "registered anchor");
            let any: Rc<dyn Any> = cell.clone();
            self.refs.insert((anchor, TypeId::of::<T>()), any);
        }

        let value = T::construct(self)?;
        *cell.borrow_mut() = value;
        Ok(cell)
    }

    fn registered<T: 'static>(&self, anchor: AnchorId) -> Result<Option<Rc<RefCell<T>>>> {
        match self.refs.get(&(anchor, TypeId::of::<T>())) {
            Some(any) => any
                .clone()
                .downcast::<RefCell<T>>()
                .map(Some)
                .map_err(|_| {
                    self.error::<T>(&format!("anchor {} holds a mismatched cell", anchor))
                }),
            None => Ok(None),
        }
    }

    fn construct_document<T: Construct>(&mut self) -> Result<T> {
        match self.stream.next()? {
            Event::StartDocument => {}
            other => return Err(self.unexpected::<T>("document start", &other)),
        }
        self.refs.clear();
        let value = T::construct(self)?;
        match self.stream.next()? {
            Event::EndDocument => Ok(value),
            other => Err(self.unexpected::<T>("document end", &other)),
        }
    }
}

/// Constructs one document's value from `stream`.
///
/// # Errors
///
/// Fails with [`Error::Construction`] if the events do not fit `T`, and with
/// [`Error::Stream`] if the stream itself fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn construct<T: Construct>(stream: &mut EventStream<'_>, tags: &mut TagLibrary) -> Result<T> {
    construct_with_options(stream, tags, &ConstructOptions::default())
}

/// Constructs one document's value with custom options.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn construct_with_options<T: Construct>(
    stream: &mut EventStream<'_>,
    tags: &mut TagLibrary,
    options: &ConstructOptions,
) -> Result<T> {
    Constructor::new(stream, tags, options.clone()).construct_document()
}

/// Constructs one value per document until the stream is finished.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn construct_all<T: Construct>(
    stream: &mut EventStream<'_>,
    tags: &mut TagLibrary,
) -> Result<Vec<T>> {
    let mut values = Vec::new();
    while !stream.finished()? {
        values.push(construct(stream, tags)?);
    }
    Ok(values)
}

// Scalars

impl Construct for String {
    fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
        c.expect_scalar::<Self>()
    }
}

impl Construct for char {
    fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
        let content = c.expect_scalar::<Self>()?;
        let mut chars = content.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(ch),
            _ => Err(c.error::<Self>(&format!(
                "`{}` is not exactly one character",
                content
            ))),
        }
    }
}

impl Construct for bool {
    fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
        let content = c.expect_scalar::<Self>()?;
        match guess_type(&content) {
            ScalarHint::BoolTrue => Ok(true),
            ScalarHint::BoolFalse => Ok(false),
            _ => Err(c.error::<Self>(&format!("cannot parse `{}` as a boolean", content))),
        }
    }
}

impl Construct for () {
    fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
        if c.null_ahead()? {
            c.next_event()?;
            Ok(())
        } else {
            let found = c.peek_event()?.clone();
            Err(c.unexpected::<Self>("null", &found))
        }
    }
}

/// Parses a number, ignoring `_` separators wherever they appear.
pub(crate) fn parse_digits<T: FromStr>(content: &str) -> std::result::Result<T, T::Err> {
    if content.contains('_') {
        content.replace('_', "").parse()
    } else {
        content.parse()
    }
}

macro_rules! construct_int {
    ($($ty:ty),+) => {
        $(
            impl Construct for $ty {
                fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
                    let content = c.expect_scalar::<Self>()?;
                    parse_digits::<Self>(&content).map_err(|e| {
                        c.error::<Self>(&format!("cannot parse `{}`", content)).with_cause(e)
                    })
                }
            }
        )+
    };
}

construct_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! construct_float {
    ($($ty:ident),+) => {
        $(
            impl Construct for $ty {
                fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
                    let content = c.expect_scalar::<Self>()?;
                    match guess_type(&content) {
                        ScalarHint::Integer | ScalarHint::Float => parse_digits::<Self>(&content)
                            .map_err(|e| {
                                c.error::<Self>(&format!("cannot parse `{}`", content))
                                    .with_cause(e)
                            }),
                        ScalarHint::FloatInfinity if content.starts_with('-') => {
                            Ok($ty::NEG_INFINITY)
                        }
                        ScalarHint::FloatInfinity => Ok($ty::INFINITY),
                        ScalarHint::FloatNaN => Ok($ty::NAN),
                        _ => Err(c.error::<Self>(&format!(
                            "cannot parse `{}` as a float",
                            content
                        ))),
                    }
                }
            }
        )+
    };
}

construct_float!(f32, f64);

// Sequences

impl<T: Construct> Construct for Vec<T> {
    fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
        c.expect_start_sequence::<Self>()?;
        let mut items = Vec::new();
        while !c.at_end_of_sequence()? {
            items.push(c.construct()?);
        }
        c.expect_end_sequence::<Self>()?;
        Ok(items)
    }
}

impl<T: Construct> Construct for VecDeque<T> {
    fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
        c.expect_start_sequence::<Self>()?;
        let mut items = VecDeque::new();
        while !c.at_end_of_sequence()? {
            items.push_back(c.construct()?);
        }
        c.expect_end_sequence::<Self>()?;
        Ok(items)
    }
}

impl<T: Construct + Eq + Hash, S: BuildHasher + Default> Construct for HashSet<T, S> {
    fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
        c.expect_start_sequence::<Self>()?;
        let mut items = HashSet::default();
        while !c.at_end_of_sequence()? {
            items.insert(c.construct()?);
        }
        c.expect_end_sequence::<Self>()?;
        Ok(items)
    }
}

impl<T: Construct + Ord> Construct for BTreeSet<T> {
    fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
        c.expect_start_sequence::<Self>()?;
        let mut items = BTreeSet::new();
        while !c.at_end_of_sequence()? {
            items.insert(c.construct()?);
        }
        c.expect_end_sequence::<Self>()?;
        Ok(items)
    }
}

impl<T: Construct, const N: usize> Construct for [T; N] {
    fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
        c.expect_start_sequence::<Self>()?;
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            if c.at_end_of_sequence()? {
                return Err(c.error::<Self>("too few values"));
            }
            items.push(c.construct()?);
        }
        if !c.at_end_of_sequence()? {
            return Err(c.error::<Self>("too many values"));
        }
        c.expect_end_sequence::<Self>()?;
        items
            .try_into()
            .map_err(|_| c.error::<Self>("too few values"))
    }
}

// Mappings

impl<K, V, S> Construct for HashMap<K, V, S>
where
    K: Construct + Eq + Hash,
    V: Construct,
    S: BuildHasher + Default,
{
    fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
        c.expect_start_mapping::<Self>()?;
        let mut map = HashMap::default();
        while !c.at_end_of_mapping()? {
            let key: K = c.construct()?;
            if map.contains_key(&key) {
                return Err(c.error::<Self>("duplicate key"));
            }
            let value = c.construct()?;
            map.insert(key, value);
        }
        c.expect_end_mapping::<Self>()?;
        Ok(map)
    }
}

impl<K, V, S> Construct for IndexMap<K, V, S>
where
    K: Construct + Eq + Hash,
    V: Construct,
    S: BuildHasher + Default,
{
    fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
        c.expect_start_mapping::<Self>()?;
        let mut map = IndexMap::default();
        while !c.at_end_of_mapping()? {
            let key: K = c.construct()?;
            if map.contains_key(&key) {
                return Err(c.error::<Self>("duplicate key"));
            }
            let value = c.construct()?;
            map.insert(key, value);
        }
        c.expect_end_mapping::<Self>()?;
        Ok(map)
    }
}

impl<K: Construct + Ord, V: Construct> Construct for BTreeMap<K, V> {
    fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
        c.expect_start_mapping::<Self>()?;
        let mut map = BTreeMap::new();
        while !c.at_end_of_mapping()? {
            let key: K = c.construct()?;
            if map.contains_key(&key) {
                return Err(c.error::<Self>("duplicate key"));
            }
            let value = c.construct()?;
            map.insert(key, value);
        }
        c.expect_end_mapping::<Self>()?;
        Ok(map)
    }
}

// Tuples are records whose field names are their positions.

macro_rules! construct_tuple {
    ($(($idx:tt $name:ident $slot:ident))+) => {
        impl<$($name: Construct),+> Construct for ($($name,)+) {
            fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
                c.expect_start_mapping::<Self>()?;
                $(let mut $slot: Option<$name> = None;)+
                while !c.at_end_of_mapping()? {
                    let key = c.field_name::<Self>()?;
                    match key.as_str() {
                        $(stringify!($idx) => c.construct_field::<Self, $name>(&key, &mut $slot)?,)+
                        _ => c.unknown_field::<Self>(&key)?,
                    }
                }
                c.expect_end_mapping::<Self>()?;
                Ok(($(c.take_field::<Self, $name>(stringify!($idx), $slot)?,)+))
            }
        }
    };
}

construct_tuple!((0 A a));
construct_tuple!((0 A a) (1 B b));
construct_tuple!((0 A a) (1 B b) (2 C c2));
construct_tuple!((0 A a) (1 B b) (2 C c2) (3 D d));
construct_tuple!((0 A a) (1 B b) (2 C c2) (3 D d) (4 E e));
construct_tuple!((0 A a) (1 B b) (2 C c2) (3 D d) (4 E e) (5 F f));

// References

impl<T: Construct> Construct for Option<T> {
    fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
        if c.null_ahead()? {
            c.next_event()?;
            Ok(None)
        } else {
            c.construct().map(Some)
        }
    }

    fn opens_with_reference() -> bool {
        T::opens_with_reference()
    }
}

impl<T: Construct> Construct for Box<T> {
    fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
        c.construct().map(Box::new)
    }

    fn opens_with_reference() -> bool {
        T::opens_with_reference()
    }
}

impl<T: Construct + Default + 'static> Construct for Rc<RefCell<T>> {
    fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
        c.construct_shared()
    }

    fn opens_with_reference() -> bool {
        true
    }
}
