//! Identifier and role types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Borrow the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

id_type!(
    /// Unique identifier for a user.
    UserId
);

id_type!(
    /// Unique identifier for an event.
    EventId
);

id_type!(
    /// Unique identifier for a booth.
    BoothId
);

/// An identifier as supplied by a client.
///
/// Any string is accepted. A string that is not a UUID can never name a
/// stored row, so it resolves to `None` and the procedure takes its
/// absent-entity path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdRef<T> {
    raw: String,
    id: Option<T>,
}

impl<T: Copy> IdRef<T> {
    /// The identifier, if the raw string is a UUID.
    #[must_use]
    pub fn resolve(&self) -> Option<T> {
        self.id
    }

    /// The string exactly as received.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl<T: From<Uuid>> From<String> for IdRef<T> {
    fn from(raw: String) -> Self {
        let id = Uuid::parse_str(&raw).ok().map(T::from);
        Self { raw, id }
    }
}

impl<'de, T: From<Uuid>> Deserialize<'de> for IdRef<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::from)
    }
}

impl<T> fmt::Display for IdRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// User role, assigned by the identity provider.
///
/// Serialized in upper case (`"VIEWER"`, `"ORGANIZER"`) on the wire and in
/// the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Browses events.
    Viewer,
    /// Creates events and places booths.
    Organizer,
}

impl Role {
    /// Wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "VIEWER",
            Self::Organizer => "ORGANIZER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a stored role string is not a known role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VIEWER" => Ok(Self::Viewer),
            "ORGANIZER" => Ok(Self::Organizer),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
