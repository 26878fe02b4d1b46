//! Macros for defining kind enums.

/// Macro for defining a kind enum.
///
/// The defined enum keeps a stable SCREAMING_SNAKE_CASE wire
/// representation for both [`strum`] and (optionally) [`serde`].
///
/// # Example
///
/// ```rust
/// # use crate::common::define_kind;
///
/// define_kind! {
///     #[doc = "Shape kind."]
///     enum Kind {
///         #[doc = "A cube"]
///         Cube = 1,
///
///         #[doc = "A sphere"]
///         Sphere = 2,
///     }
/// }
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
        $crate::kind_serde! {
            #[derive(
                Clone,
                Copy,
                Debug,
                $crate::private::strum::Display,
                $crate::private::strum::EnumString,
                Eq,
                PartialEq,
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
        }

        impl $name {
            /// Converts this into its [`u8`] representation.
            #[must_use]
            pub const fn u8(self) -> u8 {
                self as u8
            }
        }
    };
}

/// Attaches [`serde`] derives to the given item whenever this crate is
/// built with its `serde` feature, regardless of the calling crate's
/// own features.
#[cfg(feature = "serde")]
#[doc(hidden)]
#[macro_export]
macro_rules! kind_serde {
    ($item:item) => {
        #[derive(
            $crate::private::serde::Deserialize,
            $crate::private::serde::Serialize,
        )]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        $item
    };
}

#[cfg(not(feature = "serde"))]
#[doc(hidden)]
#[macro_export]
macro_rules! kind_serde {
    ($item:item) => {
        $item
    };
}
