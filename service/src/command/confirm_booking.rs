//! [`Command`] for finalizing a [`Booking`] without a recorded payment.

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

/// [`Command`] for finalizing a [`Booking`] without a recorded payment.
///
/// Any non-terminal [`Booking`] may be finalized directly: the walk-in
/// sale path skips the approval chain. The reserved [`Unit`] moves to
/// [`unit::Status::Booked`] in the same transaction.
#[derive(Clone, Debug)]
pub struct ConfirmBooking {
    /// ID of the [`Booking`] to finalize.
    pub booking_id: booking::Id,

    /// [`Staff`] agent to attach, replacing none.
    ///
    /// An agent already attached to the [`Booking`] is kept.
    pub agent: Option<Staff>,

    /// [`Staff`] member finalizing the [`Booking`].
    pub actor: Staff,
}

impl<Db> Command<ConfirmBooking> for Service<Db>
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

    async fn execute(&self, cmd: ConfirmBooking) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ConfirmBooking {
            booking_id,
            agent,
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
        let to = booking::Status::Booked;
        if !from.allows(to) {
            return Err(tracerr::new!(E::InvalidStatusTransition {
                from,
                to,
            }));
        }

        let mut unit = tx
            .execute(Select(By::<Option<Unit>, _>::new(booking.unit_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UnitNotExists(booking.unit_id))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        booking.status = to;
        booking.hold_expires_at = None;
        booking.agent = booking.agent.take().or(agent);
        booking.booked_at = Some(now.coerce());
        booking.updated_at = now.coerce();
        unit.status = unit::Status::Booked;
        unit.updated_at = now.coerce();

        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Update(unit))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Insert(audit::Entry {
            id: audit::Id::new(),
            action: audit::Action::BookingConfirmed,
            entity_kind: audit::EntityKind::Booking,
            entity_id: booking.id.into(),
            actor: actor.into(),
            details: json!({ "from": from.to_string() }),
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

/// Error of [`ConfirmBooking`] [`Command`] execution.
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

    /// [`Unit`] with the provided ID does not exist.
    #[display("`Unit(id: {_0})` does not exist")]
    UnitNotExists(#[error(not(source))] unit::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{fixture, Command as _},
        domain::{booking, unit},
    };

    use super::{ConfirmBooking, ExecutionError};

    #[tokio::test]
    async fn books_held_unit_directly() {
        let svc = fixture::service();
        let held = fixture::held_booking(&svc).await;

        let agent = fixture::staff("Priya Nair");
        let booking = svc
            .execute(ConfirmBooking {
                booking_id: held.id,
                agent: Some(agent.clone()),
                actor: agent.clone(),
            })
            .await
            .unwrap();

        assert_eq!(booking.status, booking::Status::Booked);
        assert!(booking.booked_at.is_some());
        assert_eq!(booking.agent.map(|a| a.id), Some(agent.id));

        let booked = fixture::unit(&svc, booking.unit_id).await;
        assert_eq!(booked.status, unit::Status::Booked);
    }

    #[tokio::test]
    async fn rejects_terminal_booking() {
        let svc = fixture::service();
        let held = fixture::held_booking(&svc).await;
        let actor = fixture::staff("Priya Nair");

        let _ = svc
            .execute(ConfirmBooking {
                booking_id: held.id,
                agent: None,
                actor: actor.clone(),
            })
            .await
            .unwrap();

        let err = svc
            .execute(ConfirmBooking {
                booking_id: held.id,
                agent: None,
                actor,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidStatusTransition {
                from: booking::Status::Booked,
                to: booking::Status::Booked,
            },
        ));
    }
}
