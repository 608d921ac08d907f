//! serde deserialization from events.
//!
//! [`Deserializer`] drives any `Deserialize` type from an [`EventStream`].
//! serde values cannot share storage, so an alias is resolved by replaying
//! the events of the node it points at: every anchored node is recorded as
//! it is read, and an alias pushes a copy of the recording back in front of
//! the stream. An alias to a node that is still being read (a cycle) cannot
//! be replayed and fails.
//!
//! Untagged scalars are typed with [`guess_type`] when the target asks for
//! "anything" (`deserialize_any`), which is how self-describing targets such
//! as `serde_json::Value` see integers, floats, booleans and nulls.
//!
//! ## Examples
//!
//! ```rust
//! use serde::Deserialize;
//! use yaml_bind::{from_events, notation, TagLibrary};
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Edge {
//!     from: String,
//!     to: String,
//! }
//!
//! let mut tags = TagLibrary::core();
//! let mut stream = notation::parse(
//!     "+DOC\n+SEQ\n+MAP &a1\n=VAL :from\n=VAL :x\n=VAL :to\n=VAL :y\n-MAP\n=ALI *a1\n-SEQ\n-DOC",
//!     &mut tags,
//! )
//! .unwrap();
//!
//! let edges: Vec<Edge> = from_events(&mut stream, &tags).unwrap();
//! assert_eq!(edges.len(), 2);
//! assert_eq!(edges[0], edges[1]);
//! ```
//!
//! [`guess_type`]: crate::hint::guess_type

use crate::construct::parse_digits;
use crate::event::{AnchorId, Event, EventStream};
use crate::hint::{guess_type, ScalarHint};
use crate::tag::{uri, TagId, TagLibrary};
use crate::{Error, Result};
use serde::de::{self, DeserializeOwned, IntoDeserializer};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, trace};

/// Constructs one document's value from `stream` through serde.
///
/// # Errors
///
/// Fails with [`Error::Construction`] if the events do not fit `T`, and with
/// [`Error::UnknownAnchor`] for an alias whose anchor never appeared.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_events<T: DeserializeOwned>(
    stream: &mut EventStream<'_>,
    tags: &TagLibrary,
) -> Result<T> {
    let mut de = Deserializer::new(stream, tags);
    de.expect_document_start()?;
    let value = T::deserialize(&mut de)?;
    match de.next()? {
        Event::EndDocument => Ok(value),
        other => Err(de.error("document end", &format!("found {}", other.kind()))),
    }
}

/// A node being recorded while it is read.
struct Recording {
    anchor: AnchorId,
    depth: usize,
    events: Vec<Event>,
}

/// serde deserializer over an event stream.
pub struct Deserializer<'s, 'a> {
    stream: &'s mut EventStream<'a>,
    tags: &'s TagLibrary,
    peeked: Option<Event>,
    /// Replayed events, next one last.
    replay: Vec<Event>,
    recorded: HashMap<AnchorId, Vec<Event>>,
    recording: Vec<Recording>,
}

impl<'s, 'a> Deserializer<'s, 'a> {
    pub fn new(stream: &'s mut EventStream<'a>, tags: &'s TagLibrary) -> Self {
        Deserializer {
            stream,
            tags,
            peeked: None,
            replay: Vec::new(),
            recorded: HashMap::new(),
            recording: Vec::new(),
        }
    }

    fn error(&self, expected: &str, msg: &str) -> Error {
        Error::construction(expected, msg, self.stream.mark())
    }

    fn is(&self, tag: TagId, uri: &str) -> bool {
        self.tags.get(uri) == Some(tag)
    }

    fn expect_document_start(&mut self) -> Result<()> {
        match self.next()? {
            Event::StartDocument => {
                self.recorded.clear();
                Ok(())
            }
            other => Err(self.error("document start", &format!("found {}", other.kind()))),
        }
    }

    fn next(&mut self) -> Result<Event> {
        match self.peeked.take() {
            Some(event) => Ok(event),
            None => self.fetch(),
        }
    }

    fn peek(&mut self) -> Result<&Event> {
        let event = match self.peeked.take() {
            Some(event) => event,
            None => self.fetch()?,
        };
        Ok(self.peeked.insert(event))
    }

    /// Next event with aliases expanded.
    fn fetch(&mut self) -> Result<Event> {
        loop {
            let event = match self.replay.pop() {
                Some(event) => event,
                None => {
                    let event = self.stream.next()?;
                    self.record(&event);
                    event
                }
            };
            match event {
                Event::Alias { target } => self.expand(target)?,
                event => return Ok(event),
            }
        }
    }

    fn record(&mut self, event: &Event) {
        let mut plain = event.clone();
        if let Some(slot) = plain.anchor_mut() {
            *slot = None;
        }

        for recording in &mut self.recording {
            recording.events.push(plain.clone());
            match event {
                Event::StartMapping { .. } | Event::StartSequence { .. } => recording.depth += 1,
                Event::EndMapping | Event::EndSequence => {
                    recording.depth = recording.depth.saturating_sub(1)
                }
                _ => {}
            }
        }
        while matches!(self.recording.last(), Some(recording) if recording.depth == 0) {
            if let Some(done) = self.recording.pop() {
                trace!(anchor = %done.anchor, events = done.events.len(), "recorded anchored node");
                self.recorded.insert(done.anchor, done.events);
            }
        }

        if let Some(anchor) = event.anchor() {
            match event {
                Event::Scalar { .. } => {
                    self.recorded.insert(anchor, vec![plain]);
                }
                _ => self.recording.push(Recording {
                    anchor,
                    depth: 1,
                    events: vec![plain],
                }),
            }
        }
    }

    fn expand(&mut self, target: AnchorId) -> Result<()> {
        if let Some(events) = self.recorded.get(&target) {
            debug!(%target, events = events.len(), "replaying alias");
            self.replay.extend(events.iter().rev().cloned());
            return Ok(());
        }
        if self.recording.iter().any(|r| r.anchor == target) {
            return Err(self.error(
                "acyclic value",
                &format!("alias *{} refers to an enclosing node", target),
            ));
        }
        Err(Error::UnknownAnchor(target))
    }

    fn scalar(&mut self, expected: &str) -> Result<(TagId, String)> {
        match self.next()? {
            Event::Scalar { tag, content, .. } => Ok((tag, content)),
            other => Err(self.error(expected, &format!("expected scalar, found {}", other.kind()))),
        }
    }

    fn is_null(&self, tag: TagId, content: &str) -> bool {
        self.is(tag, uri::NULL)
            || (tag == TagId::QUESTION_MARK && guess_type(content) == ScalarHint::Null)
    }

    fn null_ahead(&mut self) -> Result<bool> {
        let (tag, null_content) = match self.peek()? {
            Event::Scalar { tag, content, .. } => {
                (*tag, guess_type(content) == ScalarHint::Null)
            }
            _ => return Ok(false),
        };
        Ok(self.is(tag, uri::NULL) || (tag == TagId::QUESTION_MARK && null_content))
    }

    fn parse_integer<T>(&mut self, expected: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let (_, content) = self.scalar(expected)?;
        parse_digits::<T>(&content).map_err(|e| {
            self.error(expected, &format!("cannot parse `{}`", content))
                .with_cause(e)
        })
    }

    fn parse_float<T>(&mut self, expected: &str) -> Result<T>
    where
        T: FromStr + From<f32>,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let (_, content) = self.scalar(expected)?;
        match guess_type(&content) {
            ScalarHint::FloatInfinity if content.starts_with('-') => Ok(T::from(f32::NEG_INFINITY)),
            ScalarHint::FloatInfinity => Ok(T::from(f32::INFINITY)),
            ScalarHint::FloatNaN => Ok(T::from(f32::NAN)),
            ScalarHint::Integer | ScalarHint::Float => parse_digits::<T>(&content).map_err(|e| {
                self.error(expected, &format!("cannot parse `{}`", content))
                    .with_cause(e)
            }),
            _ => Err(self.error(expected, &format!("cannot parse `{}` as a float", content))),
        }
    }

    fn expect_end(&mut self, end: &Event, expected: &str) -> Result<()> {
        let event = self.next()?;
        if &event == end {
            Ok(())
        } else {
            Err(self.error(expected, &format!("expected {}, found {}", end.kind(), event.kind())))
        }
    }

    fn skip_node(&mut self) -> Result<()> {
        let mut depth = 0usize;
        loop {
            match self.next()? {
                Event::StartMapping { .. } | Event::StartSequence { .. } => depth += 1,
                Event::EndMapping | Event::EndSequence => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| Error::stream("unbalanced collection end"))?;
                }
                Event::Scalar { .. } => {}
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

    fn visit_scalar<'de, V>(&self, tag: TagId, content: String, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let typed = self.is(tag, uri::BOOL) || self.is(tag, uri::INT) || self.is(tag, uri::FLOAT);
        let hint = if self.is(tag, uri::NULL) {
            ScalarHint::Null
        } else if tag == TagId::QUESTION_MARK || typed {
            guess_type(&content)
        } else {
            return visitor.visit_string(content);
        };

        match hint {
            ScalarHint::Null => visitor.visit_unit(),
            ScalarHint::BoolTrue => visitor.visit_bool(true),
            ScalarHint::BoolFalse => visitor.visit_bool(false),
            ScalarHint::Integer if !self.is(tag, uri::FLOAT) => {
                if let Ok(v) = parse_digits::<i64>(&content) {
                    visitor.visit_i64(v)
                } else if let Ok(v) = parse_digits::<u64>(&content) {
                    visitor.visit_u64(v)
                } else if let Ok(v) = parse_digits::<i128>(&content) {
                    visitor.visit_i128(v)
                } else if let Ok(v) = parse_digits::<u128>(&content) {
                    visitor.visit_u128(v)
                } else {
                    Err(self.error("integer", &format!("`{}` is out of range", content)))
                }
            }
            ScalarHint::Integer | ScalarHint::Float => match parse_digits::<f64>(&content) {
                Ok(v) => visitor.visit_f64(v),
                Err(e) => Err(self
                    .error("float", &format!("cannot parse `{}`", content))
                    .with_cause(e)),
            },
            ScalarHint::FloatInfinity if content.starts_with('-') => {
                visitor.visit_f64(f64::NEG_INFINITY)
            }
            ScalarHint::FloatInfinity => visitor.visit_f64(f64::INFINITY),
            ScalarHint::FloatNaN => visitor.visit_f64(f64::NAN),
            ScalarHint::Unknown if typed => Err(self.error(
                "typed scalar",
                &format!("`{}` does not match its tag", content),
            )),
            ScalarHint::Unknown => visitor.visit_string(content),
        }
    }
}

macro_rules! deserialize_integer {
    ($($method:ident => $visit:ident($ty:ty)),+ $(,)?) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                let value: $ty = self.parse_integer(stringify!($ty))?;
                visitor.$visit(value)
            }
        )+
    };
}

impl<'de> de::Deserializer<'de> for &mut Deserializer<'_, '_> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.next()? {
            Event::Scalar { tag, content, .. } => self.visit_scalar(tag, content, visitor),
            Event::StartSequence { .. } => {
                let value = visitor.visit_seq(SeqAccess { de: &mut *self })?;
                self.expect_end(&Event::EndSequence, "sequence")?;
                Ok(value)
            }
            Event::StartMapping { .. } => {
                let value = visitor.visit_map(MapAccess { de: &mut *self })?;
                self.expect_end(&Event::EndMapping, "mapping")?;
                Ok(value)
            }
            other => Err(self.error("value", &format!("found {}", other.kind()))),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let (_, content) = self.scalar("bool")?;
        match guess_type(&content) {
            ScalarHint::BoolTrue => visitor.visit_bool(true),
            ScalarHint::BoolFalse => visitor.visit_bool(false),
            _ => Err(self.error("bool", &format!("cannot parse `{}` as a boolean", content))),
        }
    }

    deserialize_integer! {
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_i64 => visit_i64(i64),
        deserialize_i128 => visit_i128(i128),
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
        deserialize_u128 => visit_u128(u128),
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_f32(self.parse_float("f32")?)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_f64(self.parse_float("f64")?)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let (_, content) = self.scalar("char")?;
        let mut chars = content.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => visitor.visit_char(ch),
            _ => Err(self.error(
                "char",
                &format!("`{}` is not exactly one character", content),
            )),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let (_, content) = self.scalar("string")?;
        visitor.visit_string(content)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.null_ahead()? {
            self.next()?;
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let (tag, content) = self.scalar("unit")?;
        if self.is_null(tag, &content) {
            visitor.visit_unit()
        } else {
            Err(self.error("unit", &format!("expected null, found `{}`", content)))
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.next()? {
            Event::StartSequence { .. } => {}
            other => {
                return Err(self.error(
                    "sequence",
                    &format!("expected sequence start, found {}", other.kind()),
                ))
            }
        }
        let value = visitor.visit_seq(SeqAccess { de: &mut *self })?;
        self.expect_end(&Event::EndSequence, "sequence")?;
        Ok(value)
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if matches!(self.peek()?, Event::StartSequence { .. }) {
            return self.deserialize_seq(visitor);
        }
        match self.next()? {
            Event::StartMapping { .. } => {}
            other => {
                return Err(self.error(
                    "tuple",
                    &format!("expected mapping start, found {}", other.kind()),
                ))
            }
        }
        let value = visitor.visit_seq(PositionalAccess {
            de: &mut *self,
            index: 0,
        })?;
        self.expect_end(&Event::EndMapping, "tuple")?;
        Ok(value)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.next()? {
            Event::StartMapping { .. } => {}
            other => {
                return Err(self.error(
                    "mapping",
                    &format!("expected mapping start, found {}", other.kind()),
                ))
            }
        }
        let value = visitor.visit_map(MapAccess { de: &mut *self })?;
        self.expect_end(&Event::EndMapping, "mapping")?;
        Ok(value)
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.next()? {
            Event::Scalar { content, .. } => visitor.visit_enum(content.into_deserializer()),
            Event::StartMapping { .. } => {
                let value = visitor.visit_enum(EnumAccess { de: &mut *self })?;
                self.expect_end(&Event::EndMapping, name)?;
                Ok(value)
            }
            other => Err(self.error(
                name,
                &format!("expected enum variant, found {}", other.kind()),
            )),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.skip_node()?;
        visitor.visit_unit()
    }
}

struct SeqAccess<'d, 's, 'a> {
    de: &'d mut Deserializer<'s, 'a>,
}

impl<'de> de::SeqAccess<'de> for SeqAccess<'_, '_, '_> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        if matches!(self.de.peek()?, Event::EndSequence) {
            return Ok(None);
        }
        seed.deserialize(&mut *self.de).map(Some)
    }
}

/// Reads a mapping keyed `"0"`, `"1"`, ... as a sequence.
struct PositionalAccess<'d, 's, 'a> {
    de: &'d mut Deserializer<'s, 'a>,
    index: usize,
}

impl<'de> de::SeqAccess<'de> for PositionalAccess<'_, '_, '_> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        if matches!(self.de.peek()?, Event::EndMapping) {
            return Ok(None);
        }
        let (_, key) = self.de.scalar("tuple")?;
        if key != self.index.to_string() {
            return Err(self.de.error(
                "tuple",
                &format!("expected position {}, found `{}`", self.index, key),
            ));
        }
        self.index += 1;
        seed.deserialize(&mut *self.de).map(Some)
    }
}

struct MapAccess<'d, 's, 'a> {
    de: &'d mut Deserializer<'s, 'a>,
}

impl<'de> de::MapAccess<'de> for MapAccess<'_, '_, '_> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        if matches!(self.de.peek()?, Event::EndMapping) {
            return Ok(None);
        }
        seed.deserialize(&mut *self.de).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        seed.deserialize(&mut *self.de)
    }
}

/// A single-entry mapping from variant name to content.
struct EnumAccess<'d, 's, 'a> {
    de: &'d mut Deserializer<'s, 'a>,
}

impl<'de, 'd, 's, 'a> de::EnumAccess<'de> for EnumAccess<'d, 's, 'a> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(&mut *self.de)?;
        Ok((variant, self))
    }
}

impl<'de> de::VariantAccess<'de> for EnumAccess<'_, '_, '_> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        de::Deserialize::deserialize(&mut *self.de)
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(&mut *self.de)
    }

    fn tuple_variant<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_tuple(&mut *self.de, len, visitor)
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_map(&mut *self.de, visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation;
    use serde::Deserialize;

    fn load<T: DeserializeOwned>(text: &str) -> Result<T> {
        let mut tags = TagLibrary::core();
        let mut stream = notation::parse(text, &mut tags)?;
        from_events(&mut stream, &tags)
    }

    #[derive(Deserialize, Debug, PartialEq)]
    enum Shape {
        Empty,
        Circle(f64),
        Rect { w: u8, h: u8 },
        Pair(u8, u8),
    }

    #[test]
    fn enums_from_scalars_and_mappings() {
        assert_eq!(load::<Shape>("+DOC\n=VAL :Empty\n-DOC").unwrap(), Shape::Empty);
        assert_eq!(
            load::<Shape>("+DOC\n+MAP\n=VAL :Circle\n=VAL :.inf\n-MAP\n-DOC").unwrap(),
            Shape::Circle(f64::INFINITY)
        );
        assert_eq!(
            load::<Shape>(
                "+DOC\n+MAP\n=VAL :Rect\n+MAP\n=VAL :w\n=VAL :2\n=VAL :h\n=VAL :3\n-MAP\n-MAP\n-DOC"
            )
            .unwrap(),
            Shape::Rect { w: 2, h: 3 }
        );
        assert_eq!(
            load::<Shape>(
                "+DOC\n+MAP\n=VAL :Pair\n+MAP\n=VAL :0\n=VAL :4\n=VAL :1\n=VAL :5\n-MAP\n-MAP\n-DOC"
            )
            .unwrap(),
            Shape::Pair(4, 5)
        );
    }

    #[test]
    fn tuples_accept_sequences_and_positional_mappings() {
        assert_eq!(
            load::<(u8, String)>("+DOC\n+SEQ\n=VAL :1\n=VAL :a\n-SEQ\n-DOC").unwrap(),
            (1, "a".to_string())
        );
        assert_eq!(
            load::<(u8, String)>("+DOC\n+MAP\n=VAL :0\n=VAL :1\n=VAL :1\n=VAL :a\n-MAP\n-DOC")
                .unwrap(),
            (1, "a".to_string())
        );
        assert!(
            load::<(u8, String)>("+DOC\n+MAP\n=VAL :1\n=VAL :1\n=VAL :0\n=VAL :a\n-MAP\n-DOC")
                .is_err()
        );
    }

    #[test]
    fn nested_aliases_replay() {
        let text = "+DOC\n+SEQ\n+SEQ &a1\n=VAL &a2 :7\n=ALI *a2\n-SEQ\n=ALI *a1\n=ALI *a2\n-SEQ\n-DOC";
        let value: Vec<serde_json::Value> = load(text).unwrap();
        assert_eq!(
            value,
            vec![
                serde_json::json!([7, 7]),
                serde_json::json!([7, 7]),
                serde_json::json!(7)
            ]
        );
    }

    #[test]
    fn alias_to_enclosing_node_fails() {
        let err = load::<serde_json::Value>("+DOC\n+SEQ &a1\n=ALI *a1\n-SEQ\n-DOC").unwrap_err();
        assert!(err.to_string().contains("enclosing node"));
    }

    #[test]
    fn unknown_alias() {
        let err = load::<Vec<u8>>("+DOC\n+SEQ\n=ALI *a3\n-SEQ\n-DOC").unwrap_err();
        assert!(matches!(err, Error::UnknownAnchor(_)));
    }

    #[test]
    fn options_and_non_specific_strings() {
        assert_eq!(load::<Option<String>>("+DOC\n=VAL :~\n-DOC").unwrap(), None);
        assert_eq!(
            load::<Option<String>>("+DOC\n=VAL <!> :~\n-DOC").unwrap(),
            Some("~".to_string())
        );
    }

    #[test]
    fn typed_tags_steer_any() {
        let value: serde_json::Value =
            load("+DOC\n=VAL <tag:yaml.org,2002:str> :12\n-DOC").unwrap();
        assert_eq!(value, serde_json::json!("12"));
        let value: serde_json::Value = load("+DOC\n=VAL :12\n-DOC").unwrap();
        assert_eq!(value, serde_json::json!(12));
    }
}
