//! [`Command`] for rejecting or withdrawing a [`Booking`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use serde_json::json;
use tracerr::Traced;

use crate::{
    domain::{audit, booking, unit, Booking, Staff, Unit},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for rejecting or withdrawing a [`Booking`].
///
/// Terminates any non-terminal [`Booking`] as
/// [`booking::Status::Cancelled`] (token kept) or
/// [`booking::Status::Refunded`] (token returned). The reserved
/// [`Unit`] returns to the inventory unless its project was closed in
/// the meantime.
#[derive(Clone, Debug)]
pub struct RejectBooking {
    /// ID of the [`Booking`] to reject.
    pub booking_id: booking::Id,

    /// Whether the token amount is returned to the customer.
    pub refunded: bool,

    /// Free-form remarks to attach to the [`Booking`].
    pub remarks: Option<booking::Remarks>,

    /// [`Staff`] member rejecting the [`Booking`].
    pub actor: Staff,
}

impl<Db> Command<RejectBooking> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Unit>, unit::Id>>,
            Ok = Option<Unit>,
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Update<Unit>, Err = Traced<database::Error>>
        + Database<Insert<audit::Entry>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RejectBooking) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RejectBooking {
            booking_id,
            refunded,
            remarks,
            actor,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut booking = tx
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        let from = booking.status;
        let to = if refunded {
            booking::Status::Refunded
        } else {
            booking::Status::Cancelled
        };
        if !from.allows(to) {
            return Err(tracerr::new!(E::InvalidStatusTransition {
                from,
                to,
            }));
        }

        let now = DateTime::now();
        booking.status = to;
        booking.hold_expires_at = None;
        if remarks.is_some() {
            booking.remarks = remarks;
        }
        booking.updated_at = now.coerce();
        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        // A closed unit stays withdrawn, anything else returns to the
        // inventory.
        let unit = tx
            .execute(Select(By::<Option<Unit>, _>::new(booking.unit_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(mut unit) = unit {
            if unit.status != unit::Status::Closed {
                unit.status = unit::Status::Available;
                unit.updated_at = now.coerce();
                tx.execute(Update(unit))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
            }
        }

        tx.execute(Insert(audit::Entry {
            id: audit::Id::new(),
            action: audit::Action::BookingRejected,
            entity_kind: audit::EntityKind::Booking,
            entity_id: booking.id.into(),
            actor: actor.into(),
            details: json!({
                "from": from.to_string(),
                "refunded": refunded,
            }),
            recorded_at: now.coerce(),
        }))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
        .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(booking)
    }
}

/// Error of [`RejectBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Requested transition is not allowed from the current status.
    #[display("`Booking` cannot move from `{from}` to `{to}`")]
    InvalidStatusTransition {
        /// Current status of the [`Booking`].
        from: booking::Status,

        /// Requested status of the [`Booking`].
        to: booking::Status,
    },
}
