//! [`Command`] for approving a [`Booking`] by a manager.

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

/// [`Command`] for approving a [`Booking`] by a manager.
///
/// Stamps the [`booking::Approval`] and moves the [`Booking`] to
/// [`booking::Status::BookingConfirmed`]. The reserved
/// [`Unit`](crate::domain::Unit) is untouched until finalization.
#[derive(Clone, Debug)]
pub struct ApproveBooking {
    /// ID of the [`Booking`] to approve.
    pub booking_id: booking::Id,

    /// [`Staff`] manager giving the approval.
    pub manager: Staff,
}

impl<Db> Command<ApproveBooking> for Service<Db>
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

    async fn execute(&self, cmd: ApproveBooking) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ApproveBooking {
            booking_id,
            manager,
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
        let to = booking::Status::BookingConfirmed;
        if !from.allows(to) {
            return Err(tracerr::new!(E::InvalidStatusTransition {
                from,
                to,
            }));
        }

        let now = DateTime::now();
        booking.status = to;
        booking.approved_by = Some(booking::Approval {
            manager: manager.clone(),
            approved_at: now.coerce(),
        });
        booking.updated_at = now.coerce();
        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Insert(audit::Entry {
            id: audit::Id::new(),
            action: audit::Action::BookingApproved,
            entity_kind: audit::EntityKind::Booking,
            entity_id: booking.id.into(),
            actor: manager.into(),
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

/// Error of [`ApproveBooking`] [`Command`] execution.
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
        command::{fixture, Command as _, SubmitForApproval},
        domain::booking,
    };

    use super::{ApproveBooking, ExecutionError};

    #[tokio::test]
    async fn stamps_manager_approval() {
        let svc = fixture::service();
        let held = fixture::held_booking(&svc).await;
        let _ = svc
            .execute(SubmitForApproval {
                booking_id: held.id,
                actor: fixture::staff("Priya Nair"),
            })
            .await
            .unwrap();

        let manager = fixture::staff("Rahul Mehta");
        let booking = svc
            .execute(ApproveBooking {
                booking_id: held.id,
                manager: manager.clone(),
            })
            .await
            .unwrap();

        assert_eq!(booking.status, booking::Status::BookingConfirmed);
        let approval = booking.approved_by.unwrap();
        assert_eq!(approval.manager.id, manager.id);
    }

    #[tokio::test]
    async fn rejects_approval_of_unsubmitted_hold() {
        let svc = fixture::service();
        let held = fixture::held_booking(&svc).await;

        let err = svc
            .execute(ApproveBooking {
                booking_id: held.id,
                manager: fixture::staff("Rahul Mehta"),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidStatusTransition {
                from: booking::Status::Hold,
                to: booking::Status::BookingConfirmed,
            },
        ));
    }
}
