//! Audit log definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{staff, Staff};
#[cfg(doc)]
use crate::domain::{Booking, Payment, Project, Unit};

/// Immutable record of one mutation.
///
/// Append-only: an [`Entry`] is never mutated or deleted, and never
/// read back by the core itself.
#[derive(Clone, Debug)]
pub struct Entry {
    /// ID of this [`Entry`].
    pub id: Id,

    /// [`Action`] this [`Entry`] records.
    pub action: Action,

    /// Kind of the entity the [`Action`] was performed upon.
    pub entity_kind: EntityKind,

    /// ID of the entity the [`Action`] was performed upon.
    pub entity_id: Uuid,

    /// [`Actor`] who performed the [`Action`].
    pub actor: Actor,

    /// Serialized detail payload of the [`Action`].
    pub details: serde_json::Value,

    /// [`DateTime`] when this [`Entry`] was recorded.
    pub recorded_at: RecordDateTime,
}

/// ID of an [`Entry`].
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

define_kind! {
    #[doc = "Action verb recorded by an [`Entry`]."]
    enum Action {
        #[doc = "A [`Unit`] was held."]
        UnitHeld = 1,

        #[doc = "A [`Booking`] was submitted for approval."]
        BookingSubmitted = 2,

        #[doc = "A [`Booking`] was approved by a manager."]
        BookingApproved = 3,

        #[doc = "Payment was requested for a [`Booking`]."]
        PaymentRequested = 4,

        #[doc = "A [`Booking`] was finalized."]
        BookingConfirmed = 5,

        #[doc = "A [`Payment`] was recorded."]
        PaymentRecorded = 6,

        #[doc = "A [`Booking`] was rejected."]
        BookingRejected = 7,

        #[doc = "A [`Project`] was closed."]
        ProjectClosed = 8,

        #[doc = "A [`Reminder`](super::payment::Reminder) was created."]
        ReminderCreated = 9,

        #[doc = "Due reminders were sent."]
        RemindersSent = 10,
    }
}

define_kind! {
    #[doc = "Kind of an entity an [`Entry`] refers to."]
    enum EntityKind {
        #[doc = "A [`Unit`]."]
        Unit = 1,

        #[doc = "A [`Booking`]."]
        Booking = 2,

        #[doc = "A [`Payment`]."]
        Payment = 3,

        #[doc = "A [`Project`]."]
        Project = 4,
    }
}

/// Identity of the [`Staff`] member who performed a recorded [`Action`].
#[derive(Clone, Debug)]
pub struct Actor {
    /// ID of the acting [`Staff`] member.
    pub id: staff::Id,

    /// Name of the acting [`Staff`] member.
    pub name: staff::Name,
}

impl Actor {
    /// Returns the [`Actor`] representing the system itself, used for
    /// [`Entry`]s recorded by background tasks.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub fn system() -> Self {
        Self {
            id: staff::Id::default(),
            // SAFETY: "system" matches the `staff::Name` format.
            name: unsafe { staff::Name::new_unchecked("system") },
        }
    }
}

impl From<Staff> for Actor {
    fn from(staff: Staff) -> Self {
        Self {
            id: staff.id,
            name: staff.name,
        }
    }
}

/// [`DateTime`] when an [`Entry`] was recorded.
pub type RecordDateTime = DateTimeOf<(Entry, Record)>;

/// Marker type indicating an [`Entry`] record.
#[derive(Clone, Copy, Debug)]
pub struct Record;
