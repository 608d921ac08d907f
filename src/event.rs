//! Events and the pull-based event stream.
//!
//! An [`EventStream`] wraps an [`EventSource`] backend and adds a single
//! look-ahead slot, which is all the construction engine needs to decide
//! between alternatives (end of a collection, null vs. value, alias vs. node).
//!
//! ```rust
//! use yaml_bind::{Event, EventStream};
//!
//! let mut stream = EventStream::from_events(vec![
//!     Event::StartDocument,
//!     Event::scalar("hello"),
//!     Event::EndDocument,
//! ]);
//!
//! assert_eq!(stream.peek().unwrap(), &Event::StartDocument);
//! assert_eq!(stream.next().unwrap(), Event::StartDocument);
//! assert!(!stream.finished().unwrap());
//! ```

use crate::tag::TagId;
use crate::{Error, Result};
use std::fmt;

/// Identifier of an anchored node, scoped to a single document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorId(pub u32);

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

/// Source position reported by a backend that parses text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mark {
    pub line: usize,
    pub column: usize,
    pub line_text: String,
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)?;
        if !self.line_text.is_empty() {
            write!(f, ":\n{}", self.line_text)?;
        }
        Ok(())
    }
}

/// A single structural or scalar event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    StartDocument,
    EndDocument,
    StartMapping {
        tag: TagId,
        anchor: Option<AnchorId>,
    },
    EndMapping,
    StartSequence {
        tag: TagId,
        anchor: Option<AnchorId>,
    },
    EndSequence,
    Scalar {
        tag: TagId,
        anchor: Option<AnchorId>,
        content: String,
    },
    Alias {
        target: AnchorId,
    },
}

impl Event {
    /// An untagged, unanchored scalar.
    pub fn scalar(content: impl Into<String>) -> Self {
        Event::Scalar {
            tag: TagId::QUESTION_MARK,
            anchor: None,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn start_mapping() -> Self {
        Event::StartMapping {
            tag: TagId::QUESTION_MARK,
            anchor: None,
        }
    }

    #[must_use]
    pub fn start_sequence() -> Self {
        Event::StartSequence {
            tag: TagId::QUESTION_MARK,
            anchor: None,
        }
    }

    /// Tag of a node-starting event.
    #[must_use]
    pub fn tag(&self) -> Option<TagId> {
        match self {
            Event::StartMapping { tag, .. }
            | Event::StartSequence { tag, .. }
            | Event::Scalar { tag, .. } => Some(*tag),
            _ => None,
        }
    }

    /// Anchor of a node-starting event.
    #[must_use]
    pub fn anchor(&self) -> Option<AnchorId> {
        match self {
            Event::StartMapping { anchor, .. }
            | Event::StartSequence { anchor, .. }
            | Event::Scalar { anchor, .. } => *anchor,
            _ => None,
        }
    }

    /// Mutable anchor slot of a node-starting event.
    pub fn anchor_mut(&mut self) -> Option<&mut Option<AnchorId>> {
        match self {
            Event::StartMapping { anchor, .. }
            | Event::StartSequence { anchor, .. }
            | Event::Scalar { anchor, .. } => Some(anchor),
            _ => None,
        }
    }

    /// Short human readable name used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Event::StartDocument => "document start",
            Event::EndDocument => "document end",
            Event::StartMapping { .. } => "mapping start",
            Event::EndMapping => "mapping end",
            Event::StartSequence { .. } => "sequence start",
            Event::EndSequence => "sequence end",
            Event::Scalar { .. } => "scalar",
            Event::Alias { .. } => "alias",
        }
    }
}

/// Backend producing events on demand.
pub trait EventSource {
    /// Produces the next event, or `None` once the backend is exhausted.
    fn next_event(&mut self) -> Result<Option<Event>>;

    /// Position of the most recently produced event, if the backend tracks one.
    fn mark(&self) -> Option<Mark> {
        None
    }
}

/// Event source over an infallible iterator.
pub struct IterSource<I>(pub I);

impl<I: Iterator<Item = Event>> EventSource for IterSource<I> {
    fn next_event(&mut self) -> Result<Option<Event>> {
        Ok(self.0.next())
    }
}

/// Event source over an iterator whose items may fail.
pub struct FallibleSource<I>(pub I);

impl<I, E> EventSource for FallibleSource<I>
where
    I: Iterator<Item = std::result::Result<Event, E>>,
    E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
{
    fn next_event(&mut self) -> Result<Option<Event>> {
        match self.0.next() {
            Some(Ok(event)) => Ok(Some(event)),
            Some(Err(e)) => Err(Error::stream_with_cause("event backend failed", e)),
            None => Ok(None),
        }
    }
}

/// Lazy event sequence with one slot of look-ahead.
///
/// Only one consumer may drive a stream at a time.
pub struct EventStream<'a> {
    source: Box<dyn EventSource + 'a>,
    lookahead: Option<Event>,
}

impl<'a> EventStream<'a> {
    pub fn new<S: EventSource + 'a>(source: S) -> Self {
        EventStream {
            source: Box::new(source),
            lookahead: None,
        }
    }

    /// Stream over a fully materialized event list.
    #[must_use]
    pub fn from_events(events: Vec<Event>) -> EventStream<'static> {
        EventStream::new(IterSource(events.into_iter()))
    }

    /// Stream over an iterator of fallible events.
    pub fn from_results<I, E>(iter: I) -> Self
    where
        I: Iterator<Item = std::result::Result<Event, E>> + 'a,
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        EventStream::new(FallibleSource(iter))
    }

    /// Consumes and returns the next event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stream`] if the backend fails or is already exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Event> {
        if let Some(event) = self.lookahead.take() {
            return Ok(event);
        }
        self.source
            .next_event()?
            .ok_or_else(|| Error::stream("unexpected end of event stream"))
    }

    /// Returns the next event without consuming it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stream`] if the backend fails or is already exhausted.
    pub fn peek(&mut self) -> Result<&Event> {
        if self.lookahead.is_none() {
            let event = self
                .source
                .next_event()?
                .ok_or_else(|| Error::stream("unexpected end of event stream"))?;
            self.lookahead = Some(event);
        }
        match &self.lookahead {
            Some(event) => Ok(event),
            None => Err(Error::stream("unexpected end of event stream")),
        }
    }

    /// Puts `event` into the look-ahead slot, replacing whatever was cached.
    pub fn set_lookahead(&mut self, event: Event) {
        self.lookahead = Some(event);
    }

    /// Returns `true` once no further events can be produced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stream`] if the backend fails while checking.
    pub fn finished(&mut self) -> Result<bool> {
        if self.lookahead.is_some() {
            return Ok(false);
        }
        match self.source.next_event()? {
            Some(event) => {
                self.lookahead = Some(event);
                Ok(false)
            }
            None => Ok(true),
        }
    }

    /// Position reported by the backend, if any.
    #[must_use]
    pub fn mark(&self) -> Option<Mark> {
        self.source.mark()
    }
}

impl Iterator for EventStream<'_> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.finished() {
            Ok(true) => None,
            Ok(false) => Some(EventStream::next(self)),
            Err(e) => Some(Err(e)),
        }
    }
}

/// Consumer of produced events.
pub trait EventSink {
    fn emit(&mut self, event: Event) -> Result<()>;
}

impl EventSink for Vec<Event> {
    fn emit(&mut self, event: Event) -> Result<()> {
        self.push(event);
        Ok(())
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: Event) -> Result<()> {
        (**self).emit(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_caches_the_next_event() {
        let mut stream = EventStream::from_events(vec![Event::scalar("a"), Event::scalar("b")]);
        assert_eq!(stream.peek().unwrap(), &Event::scalar("a"));
        assert_eq!(stream.peek().unwrap(), &Event::scalar("a"));
        assert_eq!(stream.next().unwrap(), Event::scalar("a"));
        assert_eq!(stream.next().unwrap(), Event::scalar("b"));
        assert!(stream.finished().unwrap());
    }

    #[test]
    fn set_lookahead_overwrites_cache() {
        let mut stream = EventStream::from_events(vec![Event::scalar("a"), Event::scalar("b")]);
        let first = stream.next().unwrap();
        stream.peek().unwrap();
        stream.set_lookahead(first.clone());
        assert_eq!(stream.next().unwrap(), first);
        assert!(stream.finished().unwrap());
    }

    #[test]
    fn next_past_the_end_is_a_stream_error() {
        let mut stream = EventStream::from_events(vec![]);
        assert!(stream.finished().unwrap());
        assert!(matches!(stream.next(), Err(Error::Stream { .. })));
    }

    #[test]
    fn backend_failures_are_wrapped() {
        let items: Vec<std::result::Result<Event, std::io::Error>> = vec![
            Ok(Event::StartDocument),
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk gone")),
        ];
        let mut stream = EventStream::from_results(items.into_iter());
        assert_eq!(stream.next().unwrap(), Event::StartDocument);
        match stream.next() {
            Err(Error::Stream { source: Some(cause), .. }) => {
                assert!(cause.to_string().contains("disk gone"));
            }
            other => panic!("expected stream error, got {:?}", other),
        }
    }

    #[test]
    fn stream_is_an_iterator() {
        let stream = EventStream::from_events(vec![Event::StartDocument, Event::EndDocument]);
        let events: Result<Vec<Event>> = stream.collect();
        assert_eq!(events.unwrap(), vec![Event::StartDocument, Event::EndDocument]);
    }
}
