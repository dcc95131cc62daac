//! Newtype wrappers around the store-assigned integer identifiers.
//!
//! Using distinct types prevents accidentally passing a `SessionId`
//! where an `EntryId` is expected. Identifiers are assigned by the
//! record store on creation and are stable for a record's lifetime;
//! there is deliberately no constructor that invents a fresh one.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Macro to define a newtype ID wrapper around `i64`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Wrap a raw store-assigned value.
            pub fn from_raw(value: i64) -> Self {
                Self(value)
            }

            /// Return the raw integer value.
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifier of a persisted upload record.
    ///
    /// The join key between in-memory queue state and persisted state.
    EntryId
);

define_id!(
    /// Identifier of an upload session record.
    SessionId
);
