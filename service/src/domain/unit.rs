//! [`Unit`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::project;
#[cfg(doc)]
use crate::domain::{Booking, Project};

/// Sellable physical [`Project`] unit.
#[derive(Clone, Debug)]
pub struct Unit {
    /// ID of this [`Unit`].
    pub id: Id,

    /// ID of the [`Project`] this [`Unit`] belongs to.
    pub project_id: project::Id,

    /// [`No`] (unit number) of this [`Unit`] within its [`Project`].
    pub unit_no: No,

    /// Asking price of this [`Unit`].
    pub price: Money,

    /// Availability [`Status`] of this [`Unit`].
    ///
    /// Mutated only by booking lifecycle commands and project closure,
    /// never directly by inventory callers.
    pub status: Status,

    /// [`DateTime`] when this [`Unit`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Unit`] was last updated.
    pub updated_at: UpdateDateTime,
}

/// ID of a [`Unit`].
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

/// Number of a [`Unit`] within its [`Project`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct No(String);

impl No {
    /// Creates a new [`No`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `no` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(no: impl Into<String>) -> Self {
        Self(no.into())
    }

    /// Creates a new [`No`] if the given `no` is valid.
    #[must_use]
    pub fn new(no: impl Into<String>) -> Option<Self> {
        let no = no.into();
        Self::check(&no).then_some(Self(no))
    }

    /// Checks whether the given `no` is a valid [`No`].
    fn check(no: impl AsRef<str>) -> bool {
        let no = no.as_ref();
        no.trim() == no && !no.is_empty() && no.len() <= 64
    }
}

impl FromStr for No {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `No`")
    }
}

define_kind! {
    #[doc = "Availability status of a [`Unit`]."]
    enum Status {
        #[doc = "The [`Unit`] is open for holding."]
        Available = 1,

        #[doc = "The [`Unit`] is reserved by a [`Booking`] hold."]
        Hold = 2,

        #[doc = "The [`Unit`] is booked, payment not yet settled."]
        Booked = 3,

        #[doc = "The [`Unit`] is sold and paid for."]
        Sold = 4,

        #[doc = "The [`Unit`] is withdrawn by [`Project`] closure."]
        Closed = 5,
    }
}

/// [`DateTime`] when a [`Unit`] was created.
pub type CreationDateTime = DateTimeOf<(Unit, unit::Creation)>;

/// [`DateTime`] when a [`Unit`] was last updated.
pub type UpdateDateTime = DateTimeOf<(Unit, unit::Update)>;

#[cfg(test)]
mod spec {
    use super::Status;

    #[test]
    fn status_keeps_wire_case_for_serde() {
        assert_eq!(
            serde_json::to_string(&Status::Available).unwrap(),
            "\"AVAILABLE\"",
        );
        assert_eq!(
            serde_json::from_str::<Status>("\"SOLD\"").unwrap(),
            Status::Sold,
        );
    }
}
