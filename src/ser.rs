//! serde serialization into events.
//!
//! `&mut Representer` implements [`serde::Serializer`], so any `Serialize`
//! type can be turned into an event stream without a [`Represent`] impl.
//! serde has no notion of object identity, so values reached twice are
//! simply written twice and no anchors are produced.
//!
//! The shapes follow the native representations:
//!
//! - structs are mappings tagged `tag:yaml-bind.rs,2024:<Name>`
//! - tuples are mappings keyed by position (`"0"`, `"1"`, ...)
//! - unit variants are scalars holding the variant name; other variants are
//!   single-entry mappings from the variant name to the content
//! - byte buffers are sequences of integers
//!
//! ## Examples
//!
//! ```rust
//! use serde::Serialize;
//! use yaml_bind::{notation, to_events, RepresentOptions, TagLibrary};
//!
//! #[derive(Serialize)]
//! struct Limits {
//!     soft: u32,
//!     hard: Option<u32>,
//! }
//!
//! let mut tags = TagLibrary::core();
//! let limits = Limits { soft: 64, hard: None };
//! let events: Vec<_> = to_events(&limits, &mut tags, &RepresentOptions::new())
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! assert_eq!(
//!     notation::render(&events, &tags).unwrap(),
//!     "+DOC\n+MAP\n=VAL :soft\n=VAL :64\n=VAL :hard\n=VAL :~\n-MAP\n-DOC\n"
//! );
//! ```
//!
//! [`Represent`]: crate::Represent

use crate::event::{Event, EventSink, EventStream};
use crate::represent::{format_float, Representer};
use crate::tag::{uri, TagLibrary, TypeTag};
use crate::{Error, RepresentOptions, Result};
use serde::{ser, Serialize};

fn named_uri(name: &str) -> String {
    format!("{}{}", uri::PREFIX, name)
}

/// Serializes `value` as one document and returns the events as a stream.
///
/// # Errors
///
/// Fails if the `Serialize` impl reports an error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_events<T>(
    value: &T,
    tags: &mut TagLibrary,
    options: &RepresentOptions,
) -> Result<EventStream<'static>>
where
    T: Serialize + ?Sized,
{
    let mut events = Vec::new();
    to_sink(value, tags, options, &mut events)?;
    Ok(EventStream::from_events(events))
}

/// Serializes `value` as one document, pushing the events into `sink`.
pub fn to_sink<T, S>(
    value: &T,
    tags: &mut TagLibrary,
    options: &RepresentOptions,
    sink: S,
) -> Result<()>
where
    T: Serialize + ?Sized,
    S: EventSink,
{
    let mut r = Representer::new(sink, tags, options.clone());
    r.emit(Event::StartDocument)?;
    value.serialize(&mut r)?;
    r.emit(Event::EndDocument)
}

impl<'a, 't, S: EventSink> ser::Serializer for &'a mut Representer<'t, S> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = SeqSerializer<'a, 't, S>;
    type SerializeTuple = TupleSerializer<'a, 't, S>;
    type SerializeTupleStruct = TupleSerializer<'a, 't, S>;
    type SerializeTupleVariant = TupleSerializer<'a, 't, S>;
    type SerializeMap = MapSerializer<'a, 't, S>;
    type SerializeStruct = MapSerializer<'a, 't, S>;
    type SerializeStructVariant = MapSerializer<'a, 't, S>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.scalar(uri::BOOL, if v { "y" } else { "n" })
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.scalar(uri::INT, v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.scalar(uri::INT, v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.scalar(uri::INT, v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.scalar(uri::INT, v.to_string())
    }

    fn serialize_i128(self, v: i128) -> Result<()> {
        self.scalar(uri::INT, v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.scalar(uri::INT, v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.scalar(uri::INT, v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.scalar(uri::INT, v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.scalar(uri::INT, v.to_string())
    }

    fn serialize_u128(self, v: u128) -> Result<()> {
        self.scalar(uri::INT, v.to_string())
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.scalar(uri::FLOAT, format_float(v))
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.scalar(uri::FLOAT, format_float(v))
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.string(&char::type_uri(), v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.string(uri::STR, v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.start_sequence(uri::SEQ)?;
        for byte in v {
            self.scalar(uri::INT, byte.to_string())?;
        }
        self.end_sequence()
    }

    fn serialize_none(self) -> Result<()> {
        self.null()
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.null()
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.null()
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.string(&named_uri(name), variant)
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.start_mapping(&named_uri(name))?;
        self.string(uri::STR, variant)?;
        value.serialize(&mut *self)?;
        self.end_mapping()
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        self.start_sequence(uri::SEQ)?;
        Ok(SeqSerializer { ser: self })
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        self.start_mapping(uri::MAP)?;
        Ok(TupleSerializer::new(self, false))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.start_mapping(&named_uri(name))?;
        Ok(TupleSerializer::new(self, false))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        self.start_mapping(&named_uri(name))?;
        self.string(uri::STR, variant)?;
        self.start_mapping(uri::MAP)?;
        Ok(TupleSerializer::new(self, true))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        self.start_mapping(uri::MAP)?;
        Ok(MapSerializer {
            ser: self,
            variant: false,
        })
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        self.start_mapping(&named_uri(name))?;
        Ok(MapSerializer {
            ser: self,
            variant: false,
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        self.start_mapping(&named_uri(name))?;
        self.string(uri::STR, variant)?;
        self.start_mapping(uri::MAP)?;
        Ok(MapSerializer {
            ser: self,
            variant: true,
        })
    }
}

pub struct SeqSerializer<'a, 't, S> {
    ser: &'a mut Representer<'t, S>,
}

impl<S: EventSink> ser::SerializeSeq for SeqSerializer<'_, '_, S> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(&mut *self.ser)
    }

    fn end(self) -> Result<()> {
        self.ser.end_sequence()
    }
}

/// Writes tuple elements as a mapping keyed by position.
pub struct TupleSerializer<'a, 't, S> {
    ser: &'a mut Representer<'t, S>,
    index: usize,
    variant: bool,
}

impl<'a, 't, S: EventSink> TupleSerializer<'a, 't, S> {
    fn new(ser: &'a mut Representer<'t, S>, variant: bool) -> Self {
        TupleSerializer {
            ser,
            index: 0,
            variant,
        }
    }

    fn element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.ser.string(uri::STR, self.index.to_string())?;
        self.index += 1;
        value.serialize(&mut *self.ser)
    }

    fn finish(self) -> Result<()> {
        self.ser.end_mapping()?;
        if self.variant {
            self.ser.end_mapping()?;
        }
        Ok(())
    }
}

impl<S: EventSink> ser::SerializeTuple for TupleSerializer<'_, '_, S> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<S: EventSink> ser::SerializeTupleStruct for TupleSerializer<'_, '_, S> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<S: EventSink> ser::SerializeTupleVariant for TupleSerializer<'_, '_, S> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

pub struct MapSerializer<'a, 't, S> {
    ser: &'a mut Representer<'t, S>,
    variant: bool,
}

impl<S: EventSink> MapSerializer<'_, '_, S> {
    fn finish(self) -> Result<()> {
        self.ser.end_mapping()?;
        if self.variant {
            self.ser.end_mapping()?;
        }
        Ok(())
    }
}

impl<S: EventSink> ser::SerializeMap for MapSerializer<'_, '_, S> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        key.serialize(&mut *self.ser)
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(&mut *self.ser)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<S: EventSink> ser::SerializeStruct for MapSerializer<'_, '_, S> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.ser.string(uri::STR, key)?;
        value.serialize(&mut *self.ser)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<S: EventSink> ser::SerializeStructVariant for MapSerializer<'_, '_, S> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.ser.string(uri::STR, key)?;
        value.serialize(&mut *self.ser)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}
