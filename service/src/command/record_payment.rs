//! [`Command`] for recording the settling [`Payment`] of a [`Booking`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted, Update},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use serde_json::json;
use tracerr::Traced;

use crate::{
    domain::{audit, booking, payment, unit, Booking, Payment, Staff, Unit},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for recording the settling [`Payment`] of a [`Booking`].
///
/// Finalizes the [`Booking`], moves the [`Unit`] to
/// [`unit::Status::Sold`] and issues the next sequential
/// [`payment::ReceiptNo`] of the current calendar year, all in one
/// transaction.
#[derive(Clone, Debug)]
pub struct RecordPayment {
    /// ID of the [`Booking`] being settled.
    pub booking_id: booking::Id,

    /// Amount received.
    pub amount: Money,

    /// [`payment::Method`] the amount was received with.
    pub method: payment::Method,

    /// [`payment::Kind`] of the received amount.
    pub kind: payment::Kind,

    /// Free-form remarks to attach to the [`Booking`].
    pub remarks: Option<booking::Remarks>,

    /// [`Staff`] member recording the [`Payment`].
    pub actor: Staff,
}

/// Result of a [`RecordPayment`] [`Command`] execution.
#[derive(Clone, Debug)]
pub struct Output {
    /// Finalized [`Booking`].
    pub booking: Booking,

    /// Recorded [`Payment`].
    pub payment: Payment,
}

impl<Db> Command<RecordPayment> for Service<Db>
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
        > + Database<
            Select<By<read::payment::NextReceiptNo, payment::Year>>,
            Ok = read::payment::NextReceiptNo,
            Err = Traced<database::Error>,
        > + Database<Insert<Payment>, Err = Traced<database::Error>>
        + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Update<Unit>, Err = Traced<database::Error>>
        + Database<Insert<audit::Entry>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    #[expect(clippy::too_many_lines, reason = "still readable")]
    async fn execute(&self, cmd: RecordPayment) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RecordPayment {
            booking_id,
            amount,
            method,
            kind,
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
        let to = booking::Status::Booked;
        if !from.allows(to) {
            return Err(tracerr::new!(E::InvalidStatusTransition {
                from,
                to,
            }));
        }
        if amount.currency != booking.total_price.currency {
            return Err(tracerr::new!(E::CurrencyMismatch {
                amount: amount.currency,
                price: booking.total_price.currency,
            }));
        }

        let mut unit = tx
            .execute(Select(By::<Option<Unit>, _>::new(booking.unit_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UnitNotExists(booking.unit_id))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        let receipt_no = tx
            .execute(Select(
                By::<read::payment::NextReceiptNo, _>::new(now.year()),
            ))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let payment = Payment {
            id: payment::Id::new(),
            booking_id: booking.id,
            unit_id: booking.unit_id,
            customer_id: booking.customer.id,
            amount,
            kind,
            method,
            status: payment::Status::Received,
            receipt_no: *receipt_no,
            paid_at: now.coerce(),
            reminders: Vec::new(),
            next_reminder_at: None,
        };

        booking.status = to;
        booking.hold_expires_at = None;
        booking.payment_mode = Some(method);
        booking.remarks = remarks;
        booking.booked_at = Some(now.coerce());
        booking.updated_at = now.coerce();
        unit.status = unit::Status::Sold;
        unit.updated_at = now.coerce();

        tx.execute(Insert(payment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
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
            action: audit::Action::PaymentRecorded,
            entity_kind: audit::EntityKind::Payment,
            entity_id: payment.id.into(),
            actor: actor.into(),
            details: json!({
                "booking_id": booking.id,
                "amount": payment.amount.to_string(),
                "receipt_no": payment.receipt_no.to_string(),
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

        Ok(Output { booking, payment })
    }
}

/// Error of [`RecordPayment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// Received currency differs from the [`Booking`] price currency.
    #[display(
        "received currency `{amount}` differs from price currency `{price}`"
    )]
    CurrencyMismatch {
        /// Currency of the received amount.
        amount: common::money::Currency,

        /// Currency of the [`Booking`] price.
        price: common::money::Currency,
    },

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
        command::{
            fixture, ApproveBooking, Command as _, RequestPayment,
            SubmitForApproval,
        },
        domain::{booking, payment, unit},
    };

    use super::{ExecutionError, RecordPayment};

    async fn payment_pending(
        svc: &crate::Service<crate::infra::Memory>,
    ) -> booking::Id {
        let held = fixture::held_booking(svc).await;
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
        let _ = svc
            .execute(RequestPayment {
                booking_id: held.id,
                payment_mode: payment::Method::BankTransfer,
                actor: fixture::staff("Priya Nair"),
            })
            .await
            .unwrap();
        held.id
    }

    #[tokio::test]
    async fn settles_booking_and_sells_unit() {
        let svc = fixture::service();
        let booking_id = payment_pending(&svc).await;

        let out = svc
            .execute(RecordPayment {
                booking_id,
                amount: fixture::money(8_000_000),
                method: payment::Method::BankTransfer,
                kind: payment::Kind::Final,
                remarks: booking::Remarks::new("Balance settled"),
                actor: fixture::staff("Anil Kapoor"),
            })
            .await
            .unwrap();

        assert_eq!(out.booking.status, booking::Status::Booked);
        assert!(out.booking.booked_at.is_some());
        assert_eq!(out.payment.status, payment::Status::Received);
        assert_eq!(out.payment.receipt_no.seq, 1);
        assert_eq!(
            out.payment.receipt_no.to_string(),
            format!("RCP-{}-0001", out.payment.receipt_no.year),
        );

        let sold = fixture::unit(&svc, out.booking.unit_id).await;
        assert_eq!(sold.status, unit::Status::Sold);
    }

    #[tokio::test]
    async fn receipt_sequence_is_dense_within_year() {
        let svc = fixture::service();

        let first = payment_pending(&svc).await;
        let out = svc
            .execute(RecordPayment {
                booking_id: first,
                amount: fixture::money(8_000_000),
                method: payment::Method::Upi,
                kind: payment::Kind::Final,
                remarks: None,
                actor: fixture::staff("Anil Kapoor"),
            })
            .await
            .unwrap();
        assert_eq!(out.payment.receipt_no.seq, 1);

        let second = payment_pending(&svc).await;
        let out = svc
            .execute(RecordPayment {
                booking_id: second,
                amount: fixture::money(8_000_000),
                method: payment::Method::Upi,
                kind: payment::Kind::Final,
                remarks: None,
                actor: fixture::staff("Anil Kapoor"),
            })
            .await
            .unwrap();
        assert_eq!(out.payment.receipt_no.seq, 2);
    }

    #[tokio::test]
    async fn rejects_currency_mismatch() {
        let svc = fixture::service();
        let booking_id = payment_pending(&svc).await;

        let err = svc
            .execute(RecordPayment {
                booking_id,
                amount: common::Money {
                    amount: 100_000.into(),
                    currency: common::money::Currency::Eur,
                },
                method: payment::Method::Card,
                kind: payment::Kind::Final,
                remarks: None,
                actor: fixture::staff("Anil Kapoor"),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::CurrencyMismatch { .. },
        ));
    }
}
