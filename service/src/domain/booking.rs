//! [`Booking`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit as marker, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{payment, project, unit, Customer, Staff};
#[cfg(doc)]
use crate::domain::{Project, Unit};

/// Reservation of one [`Unit`] by one [`Customer`].
///
/// A [`Booking`] is never deleted: terminal [`Status`]es are retained
/// as history.
#[derive(Clone, Debug)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// ID of the reserved [`Unit`].
    pub unit_id: unit::Id,

    /// [`Customer`] this [`Booking`] is made for.
    pub customer: Customer,

    /// ID of the [`Project`] the reserved [`Unit`] belongs to.
    ///
    /// Denormalized from the [`Unit`] for display, along with
    /// [`Booking::project_name`], [`Booking::unit_no`] and
    /// [`Booking::total_price`].
    pub project_id: project::Id,

    /// Name of the [`Project`] the reserved [`Unit`] belongs to.
    pub project_name: project::Name,

    /// Number of the reserved [`Unit`].
    pub unit_no: unit::No,

    /// Full price of the reserved [`Unit`].
    pub total_price: Money,

    /// Token amount paid to hold the [`Unit`].
    ///
    /// Never exceeds [`Booking::total_price`]; enforced at the sole
    /// creation entry point.
    pub token_amount: Money,

    /// Lifecycle [`Status`] of this [`Booking`].
    pub status: Status,

    /// [`DateTime`] when the hold on the [`Unit`] lapses.
    ///
    /// Set only while in the hold phase. Advisory: nothing transitions
    /// an expired hold automatically.
    pub hold_expires_at: Option<HoldExpiryDateTime>,

    /// Manager [`Approval`] of this [`Booking`], once given.
    pub approved_by: Option<Approval>,

    /// [`Staff`] agent attached to this [`Booking`], if any.
    pub agent: Option<Staff>,

    /// Expected or used [`payment::Method`], once known.
    pub payment_mode: Option<payment::Method>,

    /// Free-form [`Remarks`] attached on payment.
    pub remarks: Option<Remarks>,

    /// [`DateTime`] when this [`Booking`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Booking`] was last updated.
    pub updated_at: UpdateDateTime,

    /// [`DateTime`] when this [`Booking`] reached [`Status::Booked`].
    pub booked_at: Option<BookingDateTime>,
}

impl Booking {
    /// Returns whether this [`Booking`] is in a terminal [`Status`].
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// ID of a [`Booking`].
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
    #[doc = "Lifecycle status of a [`Booking`]."]
    enum Status {
        #[doc = "A [`Unit`] is held, pending the manager workflow."]
        Hold = 1,

        #[doc = "Hold submitted for manager attention."]
        HoldRequested = 2,

        #[doc = "Hold acknowledged by a manager."]
        HoldConfirmed = 3,

        #[doc = "Awaiting manager approval of the booking itself."]
        BookingPendingApproval = 4,

        #[doc = "Approved by a manager, payment not yet requested."]
        BookingConfirmed = 5,

        #[doc = "Awaiting payment to finalize the sale."]
        PaymentPending = 6,

        #[doc = "Finalized. Terminal."]
        Booked = 7,

        #[doc = "Rejected or withdrawn, token kept. Terminal."]
        Cancelled = 8,

        #[doc = "Rejected or withdrawn, token returned. Terminal."]
        Refunded = 9,
    }
}

impl Status {
    /// Returns whether this [`Status`] is terminal.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Booked | Self::Cancelled | Self::Refunded)
    }

    /// Returns whether this [`Status`] belongs to the hold phase.
    #[must_use]
    pub fn is_hold_phase(self) -> bool {
        matches!(self, Self::Hold | Self::HoldRequested | Self::HoldConfirmed)
    }

    /// Checks whether a [`Booking`] in this [`Status`] may transition
    /// into the `to` one.
    ///
    /// The single authority on transition legality: every mutating
    /// command consults this table instead of re-deriving its own
    /// guards.
    #[must_use]
    pub fn allows(self, to: Self) -> bool {
        use Status as S;

        match self {
            // Terminal statuses allow nothing further.
            S::Booked | S::Cancelled | S::Refunded => false,
            S::Hold => matches!(
                to,
                S::HoldRequested
                    | S::HoldConfirmed
                    | S::BookingPendingApproval
                    | S::Booked
                    | S::Cancelled
                    | S::Refunded
            ),
            S::HoldRequested => matches!(
                to,
                S::HoldConfirmed
                    | S::BookingPendingApproval
                    | S::Booked
                    | S::Cancelled
                    | S::Refunded
            ),
            S::HoldConfirmed => matches!(
                to,
                S::BookingPendingApproval
                    | S::Booked
                    | S::Cancelled
                    | S::Refunded
            ),
            S::BookingPendingApproval => matches!(
                to,
                S::BookingConfirmed | S::Booked | S::Cancelled | S::Refunded
            ),
            S::BookingConfirmed => matches!(
                to,
                S::PaymentPending | S::Booked | S::Cancelled | S::Refunded
            ),
            S::PaymentPending => {
                matches!(to, S::Booked | S::Cancelled | S::Refunded)
            }
        }
    }
}

/// Manager approval stamp of a [`Booking`].
#[derive(Clone, Debug)]
pub struct Approval {
    /// [`Staff`] manager who approved the [`Booking`].
    pub manager: Staff,

    /// [`DateTime`] when the approval was given.
    pub approved_at: ApprovalDateTime,
}

/// Free-form remarks attached to a [`Booking`] on payment.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(forward)]
pub struct Remarks(String);

impl Remarks {
    /// Creates a new [`Remarks`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `remarks` are not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(remarks: impl Into<String>) -> Self {
        Self(remarks.into())
    }

    /// Creates a new [`Remarks`] if the given `remarks` are valid.
    #[must_use]
    pub fn new(remarks: impl Into<String>) -> Option<Self> {
        let remarks = remarks.into();
        Self::check(&remarks).then_some(Self(remarks))
    }

    /// Checks whether the given `remarks` are valid [`Remarks`].
    fn check(remarks: impl AsRef<str>) -> bool {
        let remarks = remarks.as_ref();
        remarks.trim() == remarks
            && !remarks.is_empty()
            && remarks.len() <= 2048
    }
}

impl FromStr for Remarks {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Remarks`")
    }
}

/// [`DateTime`] when a [`Booking`] was created.
pub type CreationDateTime = DateTimeOf<(Booking, marker::Creation)>;

/// [`DateTime`] when a [`Booking`] was last updated.
pub type UpdateDateTime = DateTimeOf<(Booking, marker::Update)>;

/// Marker type indicating a hold lapse.
#[derive(Clone, Copy, Debug)]
pub struct HoldExpiry;

/// [`DateTime`] when a hold on a [`Unit`] lapses.
pub type HoldExpiryDateTime = DateTimeOf<(Booking, HoldExpiry)>;

/// Marker type indicating a manager approval.
#[derive(Clone, Copy, Debug)]
pub struct ManagerApproval;

/// [`DateTime`] when a [`Booking`] was approved by a manager.
pub type ApprovalDateTime = DateTimeOf<(Booking, ManagerApproval)>;

/// Marker type indicating a finalized booking.
#[derive(Clone, Copy, Debug)]
pub struct Finalization;

/// [`DateTime`] when a [`Booking`] reached [`Status::Booked`].
pub type BookingDateTime = DateTimeOf<(Booking, Finalization)>;

#[cfg(test)]
mod spec {
    use super::Status;

    #[test]
    fn terminal_statuses_allow_nothing() {
        for from in [Status::Booked, Status::Cancelled, Status::Refunded] {
            for to in [
                Status::Hold,
                Status::HoldRequested,
                Status::HoldConfirmed,
                Status::BookingPendingApproval,
                Status::BookingConfirmed,
                Status::PaymentPending,
                Status::Booked,
                Status::Cancelled,
                Status::Refunded,
            ] {
                assert!(!from.allows(to), "{from} must not allow {to}");
            }
        }
    }

    #[test]
    fn every_non_terminal_status_can_be_rejected_or_finalized() {
        for from in [
            Status::Hold,
            Status::HoldRequested,
            Status::HoldConfirmed,
            Status::BookingPendingApproval,
            Status::BookingConfirmed,
            Status::PaymentPending,
        ] {
            assert!(from.allows(Status::Cancelled));
            assert!(from.allows(Status::Refunded));
            assert!(from.allows(Status::Booked));
        }
    }

    #[test]
    fn approval_path_is_ordered() {
        assert!(Status::Hold.allows(Status::BookingPendingApproval));
        assert!(Status::BookingPendingApproval
            .allows(Status::BookingConfirmed));
        assert!(Status::BookingConfirmed.allows(Status::PaymentPending));
        assert!(Status::PaymentPending.allows(Status::Booked));

        assert!(!Status::Hold.allows(Status::BookingConfirmed));
        assert!(!Status::BookingPendingApproval
            .allows(Status::PaymentPending));
        assert!(!Status::PaymentPending.allows(Status::BookingConfirmed));
        assert!(!Status::BookingConfirmed.allows(Status::Hold));
    }
}
