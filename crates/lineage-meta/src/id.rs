//! Identifier newtypes
//!
//! Provides [`ObjectId`], [`ClassId`] and [`FieldId`]. All three wrap a `u32`
//! and reserve `0` as the null value, matching how the surrounding
//! application numbers its objects and metadata.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// The null identifier
            pub const NULL: Self = Self(0);

            /// Wrap a raw identifier
            #[inline]
            #[must_use]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Raw identifier value
            #[inline]
            #[must_use]
            pub const fn get(self) -> u32 {
                self.0
            }

            /// True for the null identifier
            #[inline]
            #[must_use]
            pub const fn is_null(self) -> bool {
                self.0 == 0
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

id_newtype!(
    /// Identifier of a live object in the repository
    ObjectId,
    "#"
);

id_newtype!(
    /// Identifier of a class in the metadata system
    ClassId,
    "class:"
);

id_newtype!(
    /// Identifier of a field in the metadata system
    FieldId,
    "field:"
);
