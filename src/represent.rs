//! Representation: turning native values into events.
//!
//! Every representable type implements [`Represent`], which pushes the events
//! of one node into a [`Representer`]. The representer owns the per-document
//! identity table used to detect shared and cyclic references.
//!
//! ## Anchor styles
//!
//! - [`AnchorStyle::None`] writes every reference out in full.
//! - [`AnchorStyle::Always`] anchors each reference when first reached and
//!   aliases it afterwards; events flow straight into the sink.
//! - [`AnchorStyle::Tidy`] only keeps anchors on references reached more than
//!   once. Whether a reference is shared is only known after the whole value
//!   has been walked, so the document is buffered and its anchors rewritten
//!   before anything reaches the sink.
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use yaml_bind::{represent, notation, RepresentOptions, TagLibrary};
//!
//! let shared = Rc::new(RefCell::new("x".to_string()));
//! let lonely = Rc::new(RefCell::new("z".to_string()));
//! let value = vec![shared.clone(), lonely, shared];
//!
//! let mut tags = TagLibrary::core();
//! let stream = represent(&value, &mut tags, &RepresentOptions::new()).unwrap();
//! let events: Vec<_> = stream.collect::<Result<_, _>>().unwrap();
//!
//! assert_eq!(
//!     notation::render(&events, &tags).unwrap(),
//!     "+DOC\n+SEQ\n=VAL &a1 :x\n=VAL :z\n=ALI *a1\n-SEQ\n-DOC\n"
//! );
//! ```

use crate::event::{AnchorId, Event, EventSink, EventStream};
use crate::hint::{guess_type, ScalarHint};
use crate::options::{AnchorStyle, RepresentOptions, TagStyle};
use crate::tag::{uri, TagId, TagLibrary, TypeTag};
use crate::{Error, Result};
use indexmap::IndexMap;
use std::any::{type_name, TypeId};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use tracing::{debug, trace};

/// Types that can produce the events of a single node.
pub trait Represent: TypeTag {
    fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()>;
}

/// Representation context for one top-level call.
pub struct Representer<'t, S> {
    sink: S,
    tags: &'t mut TagLibrary,
    options: RepresentOptions,
    /// Reference identity to its anchor. Under Tidy the anchors are provisional.
    refs: HashMap<usize, Binding>,
    /// Anchors already standing for a reference of a given content type.
    bound: HashSet<(AnchorId, TypeId)>,
    /// Provisional anchors reached more than once.
    shared: HashSet<AnchorId>,
    /// References currently being written; only used without anchors.
    in_progress: HashSet<usize>,
    next_anchor: u32,
    /// Anchor of the reference whose first node has not been emitted yet.
    pending_anchor: Option<AnchorId>,
    depth: usize,
}

#[derive(Clone, Copy)]
struct Binding {
    anchor: AnchorId,
    type_id: TypeId,
    type_name: &'static str,
}

impl<'t, S: EventSink> Representer<'t, S> {
    pub fn new(sink: S, tags: &'t mut TagLibrary, options: RepresentOptions) -> Self {
        Representer {
            sink,
            tags,
            options,
            refs: HashMap::new(),
            bound: HashSet::new(),
            shared: HashSet::new(),
            in_progress: HashSet::new(),
            next_anchor: 1,
            pending_anchor: None,
            depth: 0,
        }
    }

    #[must_use]
    pub fn options(&self) -> &RepresentOptions {
        &self.options
    }

    /// Represents `value` as the next node.
    pub fn represent<T: Represent + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.represent(self)
    }

    /// Tag for a node of type `type_uri` at the current depth.
    fn node_tag(&mut self, type_uri: &str) -> TagId {
        match self.options.tag_style {
            TagStyle::All => self.tags.intern(type_uri),
            TagStyle::RootOnly if self.depth == 0 => self.tags.intern(type_uri),
            _ => TagId::QUESTION_MARK,
        }
    }

    pub(crate) fn emit(&mut self, event: Event) -> Result<()> {
        self.sink.emit(event)
    }

    /// Emits a scalar with the given type URI.
    pub fn scalar(&mut self, type_uri: &str, content: impl Into<String>) -> Result<()> {
        let tag = self.node_tag(type_uri);
        let anchor = self.pending_anchor.take();
        self.emit(Event::Scalar {
            tag,
            anchor,
            content: content.into(),
        })
    }

    /// Emits a string scalar. When untagged, content that would resolve to
    /// another type is marked non-specific (`!`).
    pub fn string(&mut self, type_uri: &str, content: impl Into<String>) -> Result<()> {
        let content = content.into();
        let mut tag = self.node_tag(type_uri);
        if tag == TagId::QUESTION_MARK && guess_type(&content) != ScalarHint::Unknown {
            tag = TagId::EXCLAMATION_MARK;
        }
        let anchor = self.pending_anchor.take();
        self.emit(Event::Scalar {
            tag,
            anchor,
            content,
        })
    }

    pub fn null(&mut self) -> Result<()> {
        self.scalar(uri::NULL, "~")
    }

    pub fn start_sequence(&mut self, type_uri: &str) -> Result<()> {
        let tag = self.node_tag(type_uri);
        let anchor = self.pending_anchor.take();
        self.depth += 1;
        self.emit(Event::StartSequence { tag, anchor })
    }

    pub fn end_sequence(&mut self) -> Result<()> {
        self.depth = self.depth.saturating_sub(1);
        self.emit(Event::EndSequence)
    }

    pub fn start_mapping(&mut self, type_uri: &str) -> Result<()> {
        let tag = self.node_tag(type_uri);
        let anchor = self.pending_anchor.take();
        self.depth += 1;
        self.emit(Event::StartMapping { tag, anchor })
    }

    pub fn end_mapping(&mut self) -> Result<()> {
        self.depth = self.depth.saturating_sub(1);
        self.emit(Event::EndMapping)
    }

    /// Emits a field name followed by the field's value.
    pub fn field<T: Represent + ?Sized>(&mut self, name: &str, value: &T) -> Result<()> {
        self.string(uri::STR, name)?;
        value.represent(self)
    }

    /// Represents a shared reference, anchoring or aliasing it per the anchor style.
    ///
    /// A reference whose content starts with another reference has no node of
    /// its own, so both stand for the same node: a new inner reference shares
    /// the outer anchor, and an inner alias binds the outer reference to the
    /// aliased anchor. Anchors are bound per content type, which is how the
    /// constructor tells the two apart.
    pub fn represent_shared<T: Represent + 'static>(
        &mut self,
        cell: &Rc<RefCell<T>>,
    ) -> Result<()> {
        let identity = Rc::as_ptr(cell) as *const () as usize;
        let value = cell
            .try_borrow()
            .map_err(|_| Error::custom(format!("{} is mutably borrowed", type_name::<T>())))?;

        if self.options.anchor_style == AnchorStyle::None {
            if !self.in_progress.insert(identity) {
                return Err(Error::CyclicReference {
                    type_name: type_name::<T>().to_string(),
                });
            }
            value.represent(self)?;
            self.in_progress.remove(&identity);
            return Ok(());
        }

        if let Some(binding) = self.refs.get(&identity).copied() {
            if let Some(pending) = self.pending_anchor.take() {
                self.rebind(pending, binding.anchor)?;
            }
            if self.options.anchor_style == AnchorStyle::Tidy {
                self.shared.insert(binding.anchor);
            }
            trace!(anchor = %binding.anchor, "aliasing repeated reference");
            return self.emit(Event::Alias {
                target: binding.anchor,
            });
        }

        let anchor = match self.pending_anchor {
            Some(pending) => pending,
            None => {
                let anchor = AnchorId(self.next_anchor);
                self.next_anchor += 1;
                anchor
            }
        };
        let binding = Binding {
            anchor,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        };
        self.refs.insert(identity, binding);
        self.bound.insert((anchor, binding.type_id));
        self.pending_anchor = Some(anchor);
        value.represent(self)
    }

    /// Moves the references still waiting on `pending` over to `target`, whose
    /// alias turned out to be their first node.
    fn rebind(&mut self, pending: AnchorId, target: AnchorId) -> Result<()> {
        let waiting: Vec<usize> = self
            .refs
            .iter()
            .filter(|(_, binding)| binding.anchor == pending)
            .map(|(identity, _)| *identity)
            .collect();
        for identity in waiting {
            if let Some(binding) = self.refs.get_mut(&identity) {
                self.bound.remove(&(pending, binding.type_id));
                // The alias would have to name both this reference and another
                // one of the same type.
                if target == pending || !self.bound.insert((target, binding.type_id)) {
                    return Err(Error::UnanchorableReference {
                        type_name: binding.type_name.to_string(),
                    });
                }
                binding.anchor = target;
                debug!(%pending, %target, "bound reference to the anchor of its first node");
            }
        }
        // Nothing else was numbered since `pending`; hand the number back.
        if pending.0 + 1 == self.next_anchor {
            self.next_anchor = pending.0;
        }
        Ok(())
    }

    fn document<T: Represent + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.emit(Event::StartDocument)?;
        value.represent(self)?;
        self.emit(Event::EndDocument)
    }
}

/// Clears provisional anchors used once and renumbers the rest in order of
/// first appearance. Returns the number of anchors kept.
fn compact_anchors(events: &mut [Event], shared: &HashSet<AnchorId>) -> usize {
    let mut renamed = HashMap::new();
    let mut next = 1;
    for event in events.iter_mut() {
        if let Event::Alias { target } = event {
            if let Some(anchor) = renamed.get(target) {
                *target = *anchor;
            }
        } else if let Some(slot) = event.anchor_mut() {
            *slot = match *slot {
                Some(provisional) if shared.contains(&provisional) => {
                    let anchor = AnchorId(next);
                    next += 1;
                    renamed.insert(provisional, anchor);
                    Some(anchor)
                }
                _ => None,
            };
        }
    }
    renamed.len()
}

/// Represents `value` as one document, pushing the events into `sink`.
///
/// # Errors
///
/// Fails if the sink fails, or with [`Error::CyclicReference`] when a cycle
/// is reached under [`AnchorStyle::None`].
pub fn represent_to<T, S>(
    value: &T,
    tags: &mut TagLibrary,
    options: &RepresentOptions,
    mut sink: S,
) -> Result<()>
where
    T: Represent + ?Sized,
    S: EventSink,
{
    if options.anchor_style != AnchorStyle::Tidy {
        return Representer::new(sink, tags, options.clone()).document(value);
    }

    let mut buffer = Vec::new();
    let shared = {
        let mut r = Representer::new(&mut buffer, tags, options.clone());
        r.document(value)?;
        r.shared
    };
    let kept = compact_anchors(&mut buffer, &shared);
    debug!(events = buffer.len(), anchors = kept, "compacted tidy anchors");

    for event in buffer {
        sink.emit(event)?;
    }
    Ok(())
}

/// Represents `value` as one document and returns the events as a stream.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn represent<T: Represent + ?Sized>(
    value: &T,
    tags: &mut TagLibrary,
    options: &RepresentOptions,
) -> Result<EventStream<'static>> {
    let mut events = Vec::new();
    represent_to(value, tags, options, &mut events)?;
    Ok(EventStream::from_events(events))
}

/// Represents each value as its own document, in order.
pub fn represent_all<T, S>(
    values: &[T],
    tags: &mut TagLibrary,
    options: &RepresentOptions,
    mut sink: S,
) -> Result<()>
where
    T: Represent,
    S: EventSink,
{
    for value in values {
        represent_to(value, tags, options, &mut sink)?;
    }
    Ok(())
}

// Scalars

impl Represent for str {
    fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
        r.string(uri::STR, self)
    }
}

impl Represent for String {
    fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
        r.string(uri::STR, self.as_str())
    }
}

impl Represent for char {
    fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
        r.string(&Self::type_uri(), self.to_string())
    }
}

impl Represent for bool {
    fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
        r.scalar(uri::BOOL, if *self { "y" } else { "n" })
    }
}

impl Represent for () {
    fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
        r.null()
    }
}

macro_rules! represent_int {
    ($($ty:ty),+) => {
        $(
            impl Represent for $ty {
                fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
                    r.scalar(uri::INT, self.to_string())
                }
            }
        )+
    };
}

represent_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// Canonical float text: `.inf`, `-.inf`, `.nan`, or the shortest round-trip form.
pub(crate) fn format_float<F>(value: F) -> String
where
    F: Into<f64> + std::fmt::Debug + Copy,
{
    let wide: f64 = value.into();
    if wide.is_nan() {
        ".nan".to_string()
    } else if wide.is_infinite() {
        if wide.is_sign_negative() { "-.inf" } else { ".inf" }.to_string()
    } else {
        format!("{:?}", value)
    }
}

impl Represent for f32 {
    fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
        r.scalar(uri::FLOAT, format_float(*self))
    }
}

impl Represent for f64 {
    fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
        r.scalar(uri::FLOAT, format_float(*self))
    }
}

// Sequences

macro_rules! represent_sequence {
    ($($ty:ty),+) => {
        $(
            impl<T: Represent> Represent for $ty {
                fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
                    r.start_sequence(&Self::type_uri())?;
                    for item in self.iter() {
                        item.represent(r)?;
                    }
                    r.end_sequence()
                }
            }
        )+
    };
}

represent_sequence!(Vec<T>, VecDeque<T>, [T], BTreeSet<T>);

impl<T: Represent, H> Represent for HashSet<T, H> {
    fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
        r.start_sequence(&Self::type_uri())?;
        for item in self {
            item.represent(r)?;
        }
        r.end_sequence()
    }
}

impl<T: Represent, const N: usize> Represent for [T; N] {
    fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
        r.start_sequence(&Self::type_uri())?;
        for item in self {
            item.represent(r)?;
        }
        r.end_sequence()
    }
}

// Mappings

impl<K: Represent, V: Represent, H> Represent for HashMap<K, V, H> {
    fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
        r.start_mapping(&Self::type_uri())?;
        for (key, value) in self {
            key.represent(r)?;
            value.represent(r)?;
        }
        r.end_mapping()
    }
}

impl<K: Represent, V: Represent, H> Represent for IndexMap<K, V, H> {
    fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
        r.start_mapping(&Self::type_uri())?;
        for (key, value) in self {
            key.represent(r)?;
            value.represent(r)?;
        }
        r.end_mapping()
    }
}

impl<K: Represent, V: Represent> Represent for BTreeMap<K, V> {
    fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
        r.start_mapping(&Self::type_uri())?;
        for (key, value) in self {
            key.represent(r)?;
            value.represent(r)?;
        }
        r.end_mapping()
    }
}

macro_rules! represent_tuple {
    ($(($idx:tt $name:ident))+) => {
        impl<$($name: Represent),+> Represent for ($($name,)+) {
            fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
                r.start_mapping(&Self::type_uri())?;
                $(r.field(stringify!($idx), &self.$idx)?;)+
                r.end_mapping()
            }
        }
    };
}

represent_tuple!((0 A));
represent_tuple!((0 A) (1 B));
represent_tuple!((0 A) (1 B) (2 C));
represent_tuple!((0 A) (1 B) (2 C) (3 D));
represent_tuple!((0 A) (1 B) (2 C) (3 D) (4 E));
represent_tuple!((0 A) (1 B) (2 C) (3 D) (4 E) (5 F));

// References

impl<T: Represent> Represent for Option<T> {
    fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
        match self {
            Some(value) => value.represent(r),
            None => r.null(),
        }
    }
}

impl<T: Represent + ?Sized> Represent for Box<T> {
    fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
        (**self).represent(r)
    }
}

impl<T: Represent + ?Sized> Represent for &T {
    fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
        (**self).represent(r)
    }
}

impl<T: Represent + 'static> Represent for Rc<RefCell<T>> {
    fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
        r.represent_shared(self)
    }
}
