//! # yaml_bind
//!
//! Typed binding between native Rust values and YAML event streams.
//!
//! The crate sits between a YAML parser/presenter and your data. It does not
//! read or write YAML text; it consumes and produces the event sequence a
//! parser emits (document, mapping, sequence, scalar and alias events) and
//! maps it to and from concrete types.
//!
//! ## Key Features
//!
//! - **Construction**: [`construct`] builds any [`Construct`] type from an
//!   [`EventStream`], checking tags and scalar syntax as it goes
//! - **Representation**: [`represent`] turns any [`Represent`] type into events,
//!   with explicit tags controlled by [`TagStyle`]
//! - **Shared references**: `Rc<RefCell<T>>` round-trips through anchors and
//!   aliases, including cycles; see [`AnchorStyle`]
//! - **Tag registry**: [`TagLibrary`] interns tag URIs, including composite
//!   URIs for container types such as "sequence of int"
//! - **Records**: [`yaml_object!`] and [`yaml_enum!`] declare types with
//!   generated impls
//! - **Serde bridge**: [`to_events`] and [`from_events`] work with any
//!   `Serialize`/`Deserialize` type
//!
//! ## Quick Start
//!
//! ```rust
//! use yaml_bind::{construct, represent, yaml_object, RepresentOptions, TagLibrary};
//!
//! yaml_object! {
//!     #[derive(Debug, Clone, PartialEq, Default)]
//!     pub struct User {
//!         pub id: u32,
//!         pub name: String,
//!         pub active: bool,
//!     }
//! }
//!
//! let user = User { id: 123, name: "Alice".to_string(), active: true };
//!
//! let mut tags = TagLibrary::core();
//! let mut stream = represent(&user, &mut tags, &RepresentOptions::new()).unwrap();
//! let back: User = construct(&mut stream, &mut tags).unwrap();
//! assert_eq!(user, back);
//! ```
//!
//! ### Shared and cyclic structures
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use yaml_bind::{construct, represent, yaml_object, RepresentOptions, TagLibrary};
//!
//! yaml_object! {
//!     #[derive(Default)]
//!     pub struct Node {
//!         pub name: String,
//!         pub next: Option<Rc<RefCell<Node>>>,
//!     }
//! }
//!
//! let node = Rc::new(RefCell::new(Node { name: "loop".into(), next: None }));
//! node.borrow_mut().next = Some(node.clone());
//!
//! let mut tags = TagLibrary::core();
//! let mut stream = represent(&node, &mut tags, &RepresentOptions::new()).unwrap();
//! let back: Rc<RefCell<Node>> = construct(&mut stream, &mut tags).unwrap();
//!
//! let next = back.borrow().next.clone().unwrap();
//! assert!(Rc::ptr_eq(&back, &next));
//! # node.borrow_mut().next = None;
//! # back.borrow_mut().next = None;
//! ```
//!
//! ## Event notation
//!
//! The [`notation`] module reads and writes a one-event-per-line text form,
//! which is what the tests and examples use to spell event streams.

#[macro_use]
pub mod macros;

pub mod construct;
pub mod de;
pub mod error;
pub mod event;
pub mod ext;
pub mod hint;
pub mod map;
pub mod notation;
pub mod options;
pub mod represent;
pub mod ser;
pub mod tag;

pub use construct::{construct, construct_all, construct_with_options, Construct, Constructor};
pub use de::{from_events, Deserializer};
pub use error::{Error, Result};
pub use event::{
    AnchorId, Event, EventSink, EventSource, EventStream, FallibleSource, IterSource, Mark,
};
pub use map::OrderedMap;
pub use options::{AnchorStyle, ConstructOptions, RepresentOptions, TagStyle, UnknownFields};
pub use represent::{represent, represent_all, represent_to, Represent, Representer};
pub use ser::{to_events, to_sink};
pub use tag::{TagId, TagLibrary, TypeTag};
