//! [`Payment`] definitions.

pub mod reminder;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{booking, customer, unit};
#[cfg(doc)]
use crate::domain::{Booking, Customer, Unit};

pub use self::reminder::Reminder;

/// Recorded money movement tied to a [`Booking`].
#[derive(Clone, Debug)]
pub struct Payment {
    /// ID of this [`Payment`].
    pub id: Id,

    /// ID of the [`Booking`] this [`Payment`] settles.
    pub booking_id: booking::Id,

    /// ID of the [`Unit`] the [`Booking`] reserves.
    pub unit_id: unit::Id,

    /// ID of the paying [`Customer`].
    pub customer_id: customer::Id,

    /// Amount of this [`Payment`].
    pub amount: Money,

    /// [`Kind`] of this [`Payment`].
    pub kind: Kind,

    /// [`Method`] this [`Payment`] was made with.
    pub method: Method,

    /// [`Status`] of this [`Payment`].
    pub status: Status,

    /// [`ReceiptNo`] assigned to this [`Payment`].
    pub receipt_no: ReceiptNo,

    /// [`DateTime`] when this [`Payment`] was made.
    pub paid_at: PaymentDateTime,

    /// [`Reminder`]s attached to this [`Payment`].
    ///
    /// Owned exclusively by this [`Payment`]; no independent identity
    /// lifecycle.
    pub reminders: Vec<Reminder>,

    /// Earliest `scheduled_at` among still-[`SCHEDULED`] [`Reminder`]s.
    ///
    /// [`None`] if none remain. Kept in sync by
    /// [`Payment::recompute_next_reminder()`] after every reminder
    /// mutation.
    ///
    /// [`SCHEDULED`]: reminder::Status::Scheduled
    pub next_reminder_at: Option<reminder::ScheduleDateTime>,
}

impl Payment {
    /// Recomputes [`Payment::next_reminder_at`] as the minimum
    /// `scheduled_at` among still-[`Scheduled`] [`Reminder`]s.
    ///
    /// [`Scheduled`]: reminder::Status::Scheduled
    pub fn recompute_next_reminder(&mut self) {
        self.next_reminder_at = self
            .reminders
            .iter()
            .filter(|r| r.status == reminder::Status::Scheduled)
            .map(|r| r.scheduled_at)
            .min();
    }
}

/// ID of a [`Payment`].
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
    #[doc = "Kind of a [`Payment`]."]
    enum Kind {
        #[doc = "Token paid to hold a [`Unit`]."]
        Token = 1,

        #[doc = "Installment against the price."]
        Installment = 2,

        #[doc = "Final settlement completing the sale."]
        Final = 3,
    }
}

define_kind! {
    #[doc = "Method a [`Payment`] was made with."]
    enum Method {
        #[doc = "Cash."]
        Cash = 1,

        #[doc = "Cheque."]
        Cheque = 2,

        #[doc = "Bank transfer."]
        BankTransfer = 3,

        #[doc = "UPI."]
        Upi = 4,

        #[doc = "Debit or credit card."]
        Card = 5,
    }
}

/// Status of a [`Payment`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    PartialEq,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[repr(u8)]
pub enum Status {
    /// The [`Payment`] is expected but not yet received.
    Pending = 1,

    /// The [`Payment`] has been received.
    Received = 2,

    /// The [`Payment`] is past its due date.
    Overdue = 3,
}

/// Receipt number of a [`Payment`], sequential per calendar year.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[display("RCP-{year}-{seq:04}")]
pub struct ReceiptNo {
    /// Calendar year this receipt was issued in.
    pub year: Year,

    /// Sequence number within the year, starting at 1.
    pub seq: u32,
}

/// Calendar year a [`ReceiptNo`] belongs to.
pub type Year = i32;

/// [`DateTime`] when a [`Payment`] was made.
pub type PaymentDateTime = DateTimeOf<(Payment, Made)>;

/// Marker type indicating a made [`Payment`].
#[derive(Clone, Copy, Debug)]
pub struct Made;

#[cfg(test)]
mod spec {
    use super::ReceiptNo;

    #[test]
    fn receipt_no_format() {
        assert_eq!(
            ReceiptNo { year: 2026, seq: 1 }.to_string(),
            "RCP-2026-0001",
        );
        assert_eq!(
            ReceiptNo {
                year: 2026,
                seq: 412,
            }
            .to_string(),
            "RCP-2026-0412",
        );
    }
}
