//! [`Project`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::Unit;

/// Real-estate project grouping sellable [`Unit`]s.
#[derive(Clone, Debug)]
pub struct Project {
    /// ID of this [`Project`].
    pub id: Id,

    /// [`Name`] of this [`Project`].
    pub name: Name,

    /// [`DateTime`] when this [`Project`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Project`] was closed, if it was.
    ///
    /// A closed [`Project`] accepts no further sales, and all its
    /// [`Unit`]s are withdrawn from the inventory.
    pub closed_at: Option<ClosureDateTime>,
}

impl Project {
    /// Returns whether this [`Project`] is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }
}

/// ID of a [`Project`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Name of a [`Project`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// [`DateTime`] when a [`Project`] was created.
pub type CreationDateTime = DateTimeOf<(Project, unit::Creation)>;

/// Marker type indicating [`Project`] closure.
#[derive(Clone, Copy, Debug)]
pub struct Closure;

/// [`DateTime`] when a [`Project`] was closed.
pub type ClosureDateTime = DateTimeOf<(Project, Closure)>;
