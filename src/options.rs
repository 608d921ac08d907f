//! Configuration options for construction and representation.
//!
//! - [`RepresentOptions`]: how anchors and tags are produced
//! - [`AnchorStyle`]: whether and how shared references get anchors
//! - [`TagStyle`]: which nodes carry explicit tags
//! - [`ConstructOptions`]: how strictly records are matched
//!
//! ## Examples
//!
//! ```rust
//! use yaml_bind::{represent, AnchorStyle, RepresentOptions, TagLibrary, TagStyle};
//!
//! let options = RepresentOptions::new()
//!     .with_anchor_style(AnchorStyle::Always)
//!     .with_tag_style(TagStyle::RootOnly);
//!
//! let mut tags = TagLibrary::core();
//! let stream = represent(&vec![1, 2, 3], &mut tags, &options).unwrap();
//! ```

/// Anchor assignment policy for shared references.
///
/// - **None**: references are written out in full every time. Cycles are rejected.
/// - **Tidy**: only objects reached more than once get an anchor. Requires
///   buffering the whole document before it can be handed on.
/// - **Always**: every reference gets an anchor on first sight. Fully streaming.
///
/// # Examples
///
/// ```rust
/// use yaml_bind::AnchorStyle;
///
/// assert_eq!(AnchorStyle::default(), AnchorStyle::Tidy);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AnchorStyle {
    None,
    #[default]
    Tidy,
    Always,
}

/// Which nodes carry an explicit tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TagStyle {
    /// Every node is left non-specific.
    #[default]
    None,
    /// Only the outermost node of a document is tagged.
    RootOnly,
    /// Every node is tagged.
    All,
}

/// Configuration options for representation.
///
/// # Examples
///
/// ```rust
/// use yaml_bind::{AnchorStyle, RepresentOptions, TagStyle};
///
/// let options = RepresentOptions::new();
/// assert_eq!(options.anchor_style, AnchorStyle::Tidy);
/// assert_eq!(options.tag_style, TagStyle::None);
///
/// let options = RepresentOptions::new().with_tag_style(TagStyle::All);
/// assert_eq!(options.tag_style, TagStyle::All);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RepresentOptions {
    pub anchor_style: AnchorStyle,
    pub tag_style: TagStyle,
}

impl RepresentOptions {
    /// Creates default options (tidy anchors, no tags).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_anchor_style(mut self, anchor_style: AnchorStyle) -> Self {
        self.anchor_style = anchor_style;
        self
    }

    #[must_use]
    pub fn with_tag_style(mut self, tag_style: TagStyle) -> Self {
        self.tag_style = tag_style;
        self
    }
}

/// What to do with a mapping key that names no field of the record being built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum UnknownFields {
    /// Fail with a construction error.
    #[default]
    Reject,
    /// Skip the key and its whole value.
    Ignore,
}

/// Configuration options for construction.
///
/// # Examples
///
/// ```rust
/// use yaml_bind::{ConstructOptions, UnknownFields};
///
/// let options = ConstructOptions::new().with_unknown_fields(UnknownFields::Ignore);
/// assert_eq!(options.unknown_fields, UnknownFields::Ignore);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConstructOptions {
    pub unknown_fields: UnknownFields,
}

impl ConstructOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_unknown_fields(mut self, unknown_fields: UnknownFields) -> Self {
        self.unknown_fields = unknown_fields;
        self
    }
}
