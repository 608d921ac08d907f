//! Line-based event notation.
//!
//! One event per line, in the style of the YAML test suite's event files:
//!
//! ```text
//! +DOC
//! +MAP &a1 <tag:yaml.org,2002:map>
//! =VAL :key
//! =VAL <!> :42
//! +SEQ
//! =ALI *a1
//! -SEQ
//! -MAP
//! -DOC
//! ```
//!
//! Anchors and tags are optional and come before the content; the `?` tag is
//! never written. Scalar content follows a `:` (or any of `'`, `"`, `|`, `>`)
//! and escapes `\\`, `\n`, `\r` and `\t`. `+STR`/`-STR` lines and flow
//! markers (`{}`, `[]`) are accepted and ignored.
//!
//! Anchor names are numbered per document in order of first appearance, so
//! `&a1`, `&a2`, ... read back as the ids they were written from.
//!
//! ## Examples
//!
//! ```rust
//! use yaml_bind::{notation, TagLibrary};
//!
//! let text = "+DOC\n+SEQ &a1\n=VAL :x\n=ALI *a1\n-SEQ\n-DOC\n";
//! let mut tags = TagLibrary::core();
//! let events: Vec<_> = notation::parse(text, &mut tags)
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! assert_eq!(events.len(), 6);
//! assert_eq!(notation::render(&events, &tags).unwrap(), text);
//! ```

use crate::event::{AnchorId, Event, EventSource, EventStream, Mark};
use crate::tag::{TagId, TagLibrary};
use crate::{Error, Result};
use std::collections::HashMap;

/// Renders `events` one per line, resolving tags through `tags`.
///
/// # Errors
///
/// Returns [`Error::UnknownTag`] if an event carries a tag `tags` never interned.
pub fn render(events: &[Event], tags: &TagLibrary) -> Result<String> {
    let mut out = String::new();
    for event in events {
        match event {
            Event::StartDocument => out.push_str("+DOC"),
            Event::EndDocument => out.push_str("-DOC"),
            Event::StartMapping { tag, anchor } => {
                out.push_str("+MAP");
                write_properties(&mut out, *tag, *anchor, tags)?;
            }
            Event::EndMapping => out.push_str("-MAP"),
            Event::StartSequence { tag, anchor } => {
                out.push_str("+SEQ");
                write_properties(&mut out, *tag, *anchor, tags)?;
            }
            Event::EndSequence => out.push_str("-SEQ"),
            Event::Scalar {
                tag,
                anchor,
                content,
            } => {
                out.push_str("=VAL");
                write_properties(&mut out, *tag, *anchor, tags)?;
                out.push_str(" :");
                escape_into(&mut out, content);
            }
            Event::Alias { target } => out.push_str(&format!("=ALI *{}", target)),
        }
        out.push('\n');
    }
    Ok(out)
}

fn write_properties(
    out: &mut String,
    tag: TagId,
    anchor: Option<AnchorId>,
    tags: &TagLibrary,
) -> Result<()> {
    if let Some(anchor) = anchor {
        out.push_str(&format!(" &{}", anchor));
    }
    if tag != TagId::QUESTION_MARK {
        out.push_str(" <");
        out.push_str(tags.uri(tag)?);
        out.push('>');
    }
    Ok(())
}

fn escape_into(out: &mut String, content: &str) {
    for ch in content.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
}

/// Parses notation text into a stream whose source reports line marks.
///
/// # Errors
///
/// Returns [`Error::Stream`] for a line that is not a recognizable event.
pub fn parse(text: &str, tags: &mut TagLibrary) -> Result<EventStream<'static>> {
    let mut parser = Parser {
        tags,
        anchors: HashMap::new(),
    };
    let mut events = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let trimmed = raw.trim_start();
        if trimmed.trim_end().is_empty() {
            continue;
        }
        let mark = Mark {
            line: index + 1,
            column: raw.len() - trimmed.len() + 1,
            line_text: raw.to_string(),
        };
        let parsed = parser.parse_line(trimmed).map_err(|e| match e {
            Error::Stream { msg, source } => Error::Stream {
                msg: format!("{} at {}", msg, mark),
                source,
            },
            other => other,
        })?;
        if let Some(event) = parsed {
            events.push((event, mark));
        }
    }

    Ok(EventStream::new(NotationSource {
        events: events.into_iter(),
        last: None,
    }))
}

struct Parser<'t> {
    tags: &'t mut TagLibrary,
    anchors: HashMap<String, AnchorId>,
}

impl Parser<'_> {
    fn parse_line(&mut self, line: &str) -> Result<Option<Event>> {
        let head = line.get(..4).unwrap_or(line);
        let rest = line.get(4..).unwrap_or("");
        let event = match head {
            "+STR" | "-STR" => return Ok(None),
            "+DOC" => {
                self.anchors.clear();
                Event::StartDocument
            }
            "-DOC" => Event::EndDocument,
            "-MAP" => Event::EndMapping,
            "-SEQ" => Event::EndSequence,
            "+MAP" => {
                let (tag, anchor, _) = self.properties(rest, false)?;
                Event::StartMapping { tag, anchor }
            }
            "+SEQ" => {
                let (tag, anchor, _) = self.properties(rest, false)?;
                Event::StartSequence { tag, anchor }
            }
            "=VAL" => {
                let (tag, anchor, content) = self.properties(rest, true)?;
                let content =
                    content.ok_or_else(|| Error::stream("scalar without content marker"))?;
                Event::Scalar {
                    tag,
                    anchor,
                    content,
                }
            }
            "=ALI" => {
                let name = rest
                    .trim()
                    .strip_prefix('*')
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| Error::stream("alias without a name"))?;
                Event::Alias {
                    target: self.anchor(name),
                }
            }
            _ => return Err(Error::stream(&format!("unrecognized event `{}`", line))),
        };
        Ok(Some(event))
    }

    fn anchor(&mut self, name: &str) -> AnchorId {
        let next = AnchorId(self.anchors.len() as u32 + 1);
        *self.anchors.entry(name.to_string()).or_insert(next)
    }

    /// Reads `&anchor`, `<tag>` and, for scalars, the content that follows.
    fn properties(
        &mut self,
        mut rest: &str,
        scalar: bool,
    ) -> Result<(TagId, Option<AnchorId>, Option<String>)> {
        let mut tag = TagId::QUESTION_MARK;
        let mut anchor = None;

        loop {
            rest = rest.trim_start();
            let Some(first) = rest.chars().next() else {
                return Ok((tag, anchor, None));
            };
            match first {
                '&' => {
                    let end = rest.find(' ').unwrap_or(rest.len());
                    anchor = Some(self.anchor(&rest[1..end]));
                    rest = &rest[end..];
                }
                '<' => {
                    let end = rest
                        .find('>')
                        .ok_or_else(|| Error::stream("unterminated tag"))?;
                    tag = self.tags.intern(&rest[1..end]);
                    rest = &rest[end + 1..];
                }
                ':' | '\'' | '"' | '|' | '>' if scalar => {
                    return Ok((tag, anchor, Some(unescape(&rest[1..])?)));
                }
                '{' | '[' if !scalar => {
                    rest = rest.get(2..).unwrap_or("");
                }
                _ => return Err(Error::stream(&format!("unexpected `{}`", rest))),
            }
        }
    }
}

fn unescape(content: &str) -> Result<String> {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => return Err(Error::stream(&format!("unknown escape `\\{}`", other))),
            None => return Err(Error::stream("dangling escape")),
        }
    }
    Ok(out)
}

/// Pre-parsed events with the line each one came from.
struct NotationSource {
    events: std::vec::IntoIter<(Event, Mark)>,
    last: Option<Mark>,
}

impl EventSource for NotationSource {
    fn next_event(&mut self) -> Result<Option<Event>> {
        Ok(self.events.next().map(|(event, mark)| {
            self.last = Some(mark);
            event
        }))
    }

    fn mark(&self) -> Option<Mark> {
        self.last.clone()
    }
}
