//! [`Command`] for submitting a held [`Booking`] for manager approval.

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use serde_json::json;
use tracerr::Traced;

use crate::{
    domain::{audit, booking, Booking, Staff},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for submitting a held [`Booking`] for manager approval.
///
/// Moves the [`Booking`] out of the hold phase into
/// [`booking::Status::BookingPendingApproval`], clearing its hold
/// expiry.
#[derive(Clone, Debug)]
pub struct SubmitForApproval {
    /// ID of the [`Booking`] to submit.
    pub booking_id: booking::Id,

    /// [`Staff`] member submitting the [`Booking`].
    pub actor: Staff,
}

impl<Db> Command<SubmitForApproval> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Insert<audit::Entry>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SubmitForApproval,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitForApproval { booking_id, actor } = cmd;

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
        let to = booking::Status::BookingPendingApproval;
        if !from.allows(to) {
            return Err(tracerr::new!(E::InvalidStatusTransition {
                from,
                to,
            }));
        }

        let now = DateTime::now();
        booking.status = to;
        booking.hold_expires_at = None;
        booking.updated_at = now.coerce();
        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Insert(audit::Entry {
            id: audit::Id::new(),
            action: audit::Action::BookingSubmitted,
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

/// Error of [`SubmitForApproval`] [`Command`] execution.
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

#[cfg(test)]
mod spec {
    use crate::{
        command::{fixture, Command as _},
        domain::booking,
    };

    use super::{ExecutionError, SubmitForApproval};

    #[tokio::test]
    async fn moves_hold_to_pending_approval() {
        let svc = fixture::service();
        let held = fixture::held_booking(&svc).await;

        let booking = svc
            .execute(SubmitForApproval {
                booking_id: held.id,
                actor: fixture::staff("Priya Nair"),
            })
            .await
            .unwrap();

        assert_eq!(booking.status, booking::Status::BookingPendingApproval);
        assert!(booking.hold_expires_at.is_none());
    }

    #[tokio::test]
    async fn rejects_double_submission() {
        let svc = fixture::service();
        let held = fixture::held_booking(&svc).await;

        let _ = svc
            .execute(SubmitForApproval {
                booking_id: held.id,
                actor: fixture::staff("Priya Nair"),
            })
            .await
            .unwrap();

        let err = svc
            .execute(SubmitForApproval {
                booking_id: held.id,
                actor: fixture::staff("Priya Nair"),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidStatusTransition {
                from: booking::Status::BookingPendingApproval,
                to: booking::Status::BookingPendingApproval,
            },
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_booking() {
        let svc = fixture::service();

        let err = svc
            .execute(SubmitForApproval {
                booking_id: booking::Id::new(),
                actor: fixture::staff("Priya Nair"),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::BookingNotExists(_),
        ));
    }
}
