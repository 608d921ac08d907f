//! Scalars backed by third-party types.
//!
//! - `chrono::DateTime<Utc>` and `chrono::NaiveDate` use `!!timestamp`.
//!   Timestamps are written in RFC 3339 with a `Z` suffix; a bare date is
//!   accepted on input and read as midnight UTC.
//! - `num_bigint::BigInt` uses `!!int` and takes the same `_` separators as
//!   the fixed-width integers.
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use yaml_bind::{construct, notation, TagLibrary};
//!
//! let mut tags = TagLibrary::extended();
//! let mut stream = notation::parse(
//!     "+DOC\n=VAL <tag:yaml.org,2002:timestamp> :2001-12-14T21:59:43Z\n-DOC",
//!     &mut tags,
//! )
//! .unwrap();
//!
//! let at: chrono::DateTime<Utc> = construct(&mut stream, &mut tags).unwrap();
//! assert_eq!(at, Utc.with_ymd_and_hms(2001, 12, 14, 21, 59, 43).unwrap());
//! ```

use crate::construct::{parse_digits, Construct, Constructor};
use crate::event::EventSink;
use crate::represent::{Represent, Representer};
use crate::tag::{uri, TypeTag};
use crate::Result;
use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use num_bigint::BigInt;
use std::borrow::Cow;

const DATE_FORMAT: &str = "%Y-%m-%d";

impl TypeTag for DateTime<Utc> {
    fn type_uri() -> Cow<'static, str> {
        Cow::Borrowed(uri::TIMESTAMP)
    }
}

impl TypeTag for NaiveDate {
    fn type_uri() -> Cow<'static, str> {
        Cow::Borrowed(uri::TIMESTAMP)
    }
}

impl TypeTag for BigInt {
    fn type_uri() -> Cow<'static, str> {
        Cow::Borrowed(uri::INT)
    }
}

impl Construct for DateTime<Utc> {
    fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
        let content = c.expect_scalar::<Self>()?;
        if let Ok(date) = NaiveDate::parse_from_str(&content, DATE_FORMAT) {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Ok(Utc.from_utc_datetime(&midnight));
            }
        }
        DateTime::parse_from_rfc3339(&content)
            .map(|at| at.with_timezone(&Utc))
            .map_err(|e| {
                c.error::<Self>(&format!("cannot parse `{}` as a timestamp", content))
                    .with_cause(e)
            })
    }
}

impl Represent for DateTime<Utc> {
    fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
        r.scalar(uri::TIMESTAMP, self.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl Construct for NaiveDate {
    fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
        let content = c.expect_scalar::<Self>()?;
        NaiveDate::parse_from_str(&content, DATE_FORMAT).map_err(|e| {
            c.error::<Self>(&format!("cannot parse `{}` as a date", content))
                .with_cause(e)
        })
    }
}

impl Represent for NaiveDate {
    fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
        r.scalar(uri::TIMESTAMP, self.format(DATE_FORMAT).to_string())
    }
}

impl Construct for BigInt {
    fn construct(c: &mut Constructor<'_, '_>) -> Result<Self> {
        let content = c.expect_scalar::<Self>()?;
        parse_digits::<BigInt>(&content).map_err(|e| {
            c.error::<Self>(&format!("cannot parse `{}`", content))
                .with_cause(e)
        })
    }
}

impl Represent for BigInt {
    fn represent<S: EventSink>(&self, r: &mut Representer<'_, S>) -> Result<()> {
        r.scalar(uri::INT, self.to_string())
    }
}
