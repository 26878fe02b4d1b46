//! [`Command`] for requesting payment on an approved [`Booking`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use serde_json::json;
use tracerr::Traced;

use crate::{
    domain::{audit, booking, payment, Booking, Staff},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for requesting payment on an approved [`Booking`].
///
/// Moves the [`Booking`] to [`booking::Status::PaymentPending`] and
/// stamps the expected [`payment::Method`].
#[derive(Clone, Debug)]
pub struct RequestPayment {
    /// ID of the [`Booking`] to request payment for.
    pub booking_id: booking::Id,

    /// Expected [`payment::Method`].
    pub payment_mode: payment::Method,

    /// [`Staff`] member requesting the payment.
    pub actor: Staff,
}

impl<Db> Command<RequestPayment> for Service<Db>
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

    async fn execute(&self, cmd: RequestPayment) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RequestPayment {
            booking_id,
            payment_mode,
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
        let to = booking::Status::PaymentPending;
        if !from.allows(to) {
            return Err(tracerr::new!(E::InvalidStatusTransition {
                from,
                to,
            }));
        }

        let now = DateTime::now();
        booking.status = to;
        booking.payment_mode = Some(payment_mode);
        booking.updated_at = now.coerce();
        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Insert(audit::Entry {
            id: audit::Id::new(),
            action: audit::Action::PaymentRequested,
            entity_kind: audit::EntityKind::Booking,
            entity_id: booking.id.into(),
            actor: actor.into(),
            details: json!({ "payment_mode": payment_mode.to_string() }),
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

/// Error of [`RequestPayment`] [`Command`] execution.
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
        command::{fixture, ApproveBooking, Command as _, SubmitForApproval},
        domain::{booking, payment},
    };

    use super::{ExecutionError, RequestPayment};

    #[tokio::test]
    async fn marks_payment_pending() {
        let svc = fixture::service();
        let held = fixture::held_booking(&svc).await;
        let _ = svc
            .execute(SubmitForApproval {
                booking_id: held.id,
                actor: fixture::staff("Priya Nair"),
            })
            .await
            .unwrap();
        let _ = svc
            .execute(ApproveBooking {
                booking_id: held.id,
                manager: fixture::staff("Rahul Mehta"),
            })
            .await
            .unwrap();

        let booking = svc
            .execute(RequestPayment {
                booking_id: held.id,
                payment_mode: payment::Method::BankTransfer,
                actor: fixture::staff("Priya Nair"),
            })
            .await
            .unwrap();

        assert_eq!(booking.status, booking::Status::PaymentPending);
        assert_eq!(
            booking.payment_mode,
            Some(payment::Method::BankTransfer),
        );
    }

    #[tokio::test]
    async fn rejects_request_before_approval() {
        let svc = fixture::service();
        let held = fixture::held_booking(&svc).await;

        let err = svc
            .execute(RequestPayment {
                booking_id: held.id,
                payment_mode: payment::Method::Upi,
                actor: fixture::staff("Priya Nair"),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidStatusTransition {
                from: booking::Status::Hold,
                to: booking::Status::PaymentPending,
            },
        ));
    }
}
