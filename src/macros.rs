/// Declares a record type with [`TypeTag`](crate::TypeTag),
/// [`Construct`](crate::Construct) and [`Represent`](crate::Represent) impls.
///
/// A record is a mapping from field names to field values, tagged
/// `tag:yaml-bind.rs,2024:<TypeName>`. Every field must be present exactly
/// once; keys that name no field follow
/// [`ConstructOptions::unknown_fields`](crate::ConstructOptions).
///
/// # Examples
///
/// ```rust
/// use yaml_bind::{construct, notation, yaml_object, TagLibrary};
///
/// yaml_object! {
///     #[derive(Debug, PartialEq)]
///     pub struct Point {
///         pub x: i32,
///         pub y: i32,
///     }
/// }
///
/// let mut tags = TagLibrary::core();
/// let mut stream = notation::parse(
///     "+DOC\n+MAP\n=VAL :y\n=VAL :2\n=VAL :x\n=VAL :1\n-MAP\n-DOC",
///     &mut tags,
/// )
/// .unwrap();
/// let point: Point = construct(&mut stream, &mut tags).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
#[macro_export]
macro_rules! yaml_object {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::TypeTag for $name {
            fn type_uri() -> ::std::borrow::Cow<'static, str> {
                ::std::borrow::Cow::Owned(::std::format!(
                    "{}{}",
                    $crate::tag::uri::PREFIX,
                    ::std::stringify!($name)
                ))
            }
        }

        impl $crate::Construct for $name {
            fn construct(c: &mut $crate::Constructor<'_, '_>) -> $crate::Result<Self> {
                c.expect_start_mapping::<Self>()?;
                $(let mut $field: ::std::option::Option<$ty> = ::std::option::Option::None;)*
                while !c.at_end_of_mapping()? {
                    let key = c.field_name::<Self>()?;
                    match key.as_str() {
                        $(
                            ::std::stringify!($field) => {
                                c.construct_field::<Self, $ty>(::std::stringify!($field), &mut $field)?
                            }
                        )*
                        other => c.unknown_field::<Self>(other)?,
                    }
                }
                c.expect_end_mapping::<Self>()?;
                ::std::result::Result::Ok($name {
                    $($field: c.take_field::<Self, $ty>(::std::stringify!($field), $field)?,)*
                })
            }
        }

        impl $crate::Represent for $name {
            fn represent<S: $crate::EventSink>(
                &self,
                r: &mut $crate::Representer<'_, S>,
            ) -> $crate::Result<()> {
                r.start_mapping(&<Self as $crate::TypeTag>::type_uri())?;
                $(r.field(::std::stringify!($field), &self.$field)?;)*
                r.end_mapping()
            }
        }
    };
}

/// Declares a fieldless enum represented by its variant names.
///
/// # Examples
///
/// ```rust
/// use yaml_bind::{represent, notation, yaml_enum, RepresentOptions, TagLibrary};
///
/// yaml_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq, Eq)]
///     pub enum Color {
///         Red,
///         Green,
///     }
/// }
///
/// let mut tags = TagLibrary::core();
/// let events: Vec<_> = represent(&Color::Green, &mut tags, &RepresentOptions::new())
///     .unwrap()
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(notation::render(&events, &tags).unwrap(), "+DOC\n=VAL :Green\n-DOC\n");
/// ```
#[macro_export]
macro_rules! yaml_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
        }

        impl $crate::TypeTag for $name {
            fn type_uri() -> ::std::borrow::Cow<'static, str> {
                ::std::borrow::Cow::Owned(::std::format!(
                    "{}{}",
                    $crate::tag::uri::PREFIX,
                    ::std::stringify!($name)
                ))
            }
        }

        impl $crate::Construct for $name {
            fn construct(c: &mut $crate::Constructor<'_, '_>) -> $crate::Result<Self> {
                let content = c.expect_scalar::<Self>()?;
                match content.as_str() {
                    $(::std::stringify!($variant) => ::std::result::Result::Ok($name::$variant),)*
                    other => ::std::result::Result::Err(
                        c.error::<Self>(&::std::format!(
                            "cannot parse `{}` as {}",
                            other,
                            ::std::stringify!($name)
                        ))
                        .with_cause($crate::error::UnknownVariant {
                            variant: ::std::string::ToString::to_string(other),
                            expected: &[$(::std::stringify!($variant)),*],
                        }),
                    ),
                }
            }
        }

        impl $crate::Represent for $name {
            fn represent<S: $crate::EventSink>(
                &self,
                r: &mut $crate::Representer<'_, S>,
            ) -> $crate::Result<()> {
                let name = match self {
                    $($name::$variant => ::std::stringify!($variant),)*
                };
                r.string(&<Self as $crate::TypeTag>::type_uri(), name)
            }
        }
    };
}
