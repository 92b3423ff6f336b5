//! Macros for defining kind enums.

/// Macro for defining a kind enum.
///
/// Generated enum is stored as `INT2` in Postgres and is parsed from (and
/// displayed as) its `SCREAMING_SNAKE_CASE` variant name.
///
/// # Example
///
/// ```rust
/// # use common::define_kind;
///
/// define_kind! {
///     #[doc = "Status of a listing."]
///     enum Status {
///         #[doc = "Listing is open."]
///         Open = 1,
///
///         #[doc = "Listing is closed."]
///         Closed = 2,
///     }
/// }
///
/// assert_eq!("OPEN".parse::<Status>().unwrap(), Status::Open);
/// assert_eq!(Status::Closed.to_string(), "CLOSED");
/// assert_eq!(Status::ALL, &[Status::Open, Status::Closed]);
/// ```
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                $variant:ident = $value:expr
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::strum::Display,
            $crate::private::strum::EnumString,
            Eq,
            Hash,
            PartialEq,
        )]
        #[cfg_attr(
            feature = "serde",
            derive(
                $crate::private::serde::Deserialize,
                $crate::private::serde::Serialize,
            ),
            serde(rename_all = "SCREAMING_SNAKE_CASE"),
        )]
        #[doc = $doc]
        #[repr(u8)]
        #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $(
                 #[doc = $variant_doc]
                 $variant = $value,
            )*
        }

        impl $name {
            /// All the variants, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Converts this into its [`u8`] representation.
            #[must_use]
            pub const fn u8(self) -> u8 {
                self as u8
            }

            /// Creates this from its [`u8`] representation, if it's a known
            /// one.
            #[must_use]
            pub fn from_u8(value: u8) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.u8() == value)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'a> $crate::private::postgres_types::FromSql<'a> for $name {
            $crate::private::postgres_types::accepts!(INT2);

            fn from_sql(
                ty: &$crate::private::postgres_types::Type,
                raw: &[u8],
            ) -> Result<
                $name,
                Box<dyn ::std::error::Error
                    + ::core::marker::Sync
                    + ::core::marker::Send>,
            > {
                let v = u8::try_from(i16::from_sql(ty, raw)?)?;
                Self::from_u8(v).ok_or_else(|| {
                    ::std::format!(
                        "invalid `{}` value: {v}",
                        ::core::stringify!($name),
                    )
                    .into()
                })
            }
        }

        #[cfg(feature = "postgres")]
        impl $crate::private::postgres_types::ToSql for $name {
            $crate::private::postgres_types::accepts!(INT2);
            $crate::private::postgres_types::to_sql_checked!();

            fn to_sql(
                &self,
                ty: &$crate::private::postgres_types::Type,
                w: &mut $crate::private::postgres_types::private::BytesMut,
            ) -> Result<
                $crate::private::postgres_types::IsNull,
                ::std::boxed::Box<
                    dyn ::std::error::Error
                        + ::core::marker::Sync
                        + ::core::marker::Send
                >,
            > {
                i16::from(self.u8()).to_sql(ty, w)
            }
        }
    };
}

#[cfg(test)]
mod spec {
    crate::define_kind! {
        #[doc = "Test kind."]
        enum Shape {
            #[doc = "A cube."]
            Cube = 1,

            #[doc = "A sphere."]
            Sphere = 2,
        }
    }

    #[test]
    fn parses_screaming_snake_case() {
        assert_eq!("CUBE".parse::<Shape>().unwrap(), Shape::Cube);
        assert_eq!("SPHERE".parse::<Shape>().unwrap(), Shape::Sphere);
        assert!("cube".parse::<Shape>().is_err());
        assert!("PYRAMID".parse::<Shape>().is_err());
    }

    #[test]
    fn converts_u8() {
        assert_eq!(Shape::Sphere.u8(), 2);
        assert_eq!(Shape::from_u8(1), Some(Shape::Cube));
        assert_eq!(Shape::from_u8(3), None);
        assert_eq!(Shape::ALL, &[Shape::Cube, Shape::Sphere]);
    }
}
