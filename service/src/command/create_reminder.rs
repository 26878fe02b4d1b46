//! [`Command`] for attaching a [`Reminder`] to a [`Payment`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use serde_json::json;
use tracerr::Traced;

use crate::{
    domain::{
        audit,
        payment::{self, reminder, Reminder},
        Payment, Staff,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for attaching a [`Reminder`] to a [`Payment`].
///
/// An immediate [`Reminder`] is recorded as already
/// [`Sent`](reminder::Status::Sent), a scheduled one waits for the
/// dispatching sweep.
#[derive(Clone, Debug)]
pub struct CreateReminder {
    /// ID of the [`Payment`] to remind about.
    pub payment_id: payment::Id,

    /// [`reminder::Channel`] the [`Reminder`] goes out on.
    pub channel: reminder::Channel,

    /// [`reminder::Message`] body of the [`Reminder`].
    pub message: reminder::Message,

    /// [`DateTime`](common::DateTime) the [`Reminder`] is scheduled
    /// for.
    ///
    /// Required unless `send_now` is set.
    pub scheduled_at: Option<reminder::ScheduleDateTime>,

    /// Whether the [`Reminder`] goes out immediately.
    pub send_now: bool,

    /// [`Staff`] member creating the [`Reminder`].
    pub actor: Staff,
}

impl<Db> Command<CreateReminder> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Payment>, payment::Id>>,
            Ok = Option<Payment>,
            Err = Traced<database::Error>,
        > + Database<Update<Payment>, Err = Traced<database::Error>>
        + Database<Insert<audit::Entry>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Payment;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateReminder) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateReminder {
            payment_id,
            channel,
            message,
            scheduled_at,
            send_now,
            actor,
        } = cmd;

        let now = DateTime::now();
        let (scheduled_at, status, sent_at) = if send_now {
            (
                scheduled_at.unwrap_or_else(|| now.coerce()),
                reminder::Status::Sent,
                Some(now.coerce()),
            )
        } else {
            let scheduled_at = scheduled_at
                .ok_or(E::ScheduleMissing)
                .map_err(tracerr::wrap!())?;
            (scheduled_at, reminder::Status::Scheduled, None)
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut payment = tx
            .execute(Select(By::<Option<Payment>, _>::new(payment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PaymentNotExists(payment_id))
            .map_err(tracerr::wrap!())?;

        let reminder = Reminder {
            id: reminder::Id::new(),
            channel,
            message,
            scheduled_at,
            status,
            sent_at,
        };
        payment.reminders.push(reminder.clone());
        payment.recompute_next_reminder();
        tx.execute(Update(payment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Insert(audit::Entry {
            id: audit::Id::new(),
            action: audit::Action::ReminderCreated,
            entity_kind: audit::EntityKind::Payment,
            entity_id: payment.id.into(),
            actor: actor.into(),
            details: json!({
                "reminder_id": reminder.id,
                "channel": reminder.channel.to_string(),
                "sent_now": send_now,
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

        Ok(payment)
    }
}

/// Error of [`CreateReminder`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Payment`] with the provided ID does not exist.
    #[display("`Payment(id: {_0})` does not exist")]
    PaymentNotExists(#[error(not(source))] payment::Id),

    /// Scheduled [`Reminder`] is missing its schedule.
    #[display("a scheduled `Reminder` requires `scheduled_at`")]
    ScheduleMissing,
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::{
        command::{fixture, Command as _, RecordPayment},
        domain::{payment, Payment},
    };

    use super::{CreateReminder, ExecutionError};

    async fn recorded_payment(
        svc: &crate::Service<crate::infra::Memory>,
    ) -> Payment {
        let held = fixture::held_booking(svc).await;
        svc.execute(RecordPayment {
            booking_id: held.id,
            amount: fixture::money(8_000_000),
            method: payment::Method::BankTransfer,
            kind: payment::Kind::Final,
            remarks: None,
            actor: fixture::staff("Anil Kapoor"),
        })
        .await
        .unwrap()
        .payment
    }

    #[tokio::test]
    async fn schedules_future_reminder() {
        let svc = fixture::service();
        let payment = recorded_payment(&svc).await;

        let scheduled_at = (DateTime::now()
            + std::time::Duration::from_secs(24 * 60 * 60))
        .coerce();
        let payment = svc
            .execute(CreateReminder {
                payment_id: payment.id,
                channel: payment::reminder::Channel::Email,
                message: "Installment due tomorrow".parse().unwrap(),
                scheduled_at: Some(scheduled_at),
                send_now: false,
                actor: fixture::staff("Priya Nair"),
            })
            .await
            .unwrap();

        assert_eq!(payment.reminders.len(), 1);
        assert_eq!(
            payment.reminders[0].status,
            payment::reminder::Status::Scheduled,
        );
        assert_eq!(payment.next_reminder_at, Some(scheduled_at));
    }

    #[tokio::test]
    async fn sends_immediate_reminder() {
        let svc = fixture::service();
        let payment = recorded_payment(&svc).await;

        let payment = svc
            .execute(CreateReminder {
                payment_id: payment.id,
                channel: payment::reminder::Channel::Whatsapp,
                message: "Please settle the balance".parse().unwrap(),
                scheduled_at: None,
                send_now: true,
                actor: fixture::staff("Priya Nair"),
            })
            .await
            .unwrap();

        assert_eq!(
            payment.reminders[0].status,
            payment::reminder::Status::Sent,
        );
        assert!(payment.reminders[0].sent_at.is_some());
        assert!(payment.next_reminder_at.is_none());
    }

    #[tokio::test]
    async fn next_reminder_tracks_the_earliest_schedule() {
        let svc = fixture::service();
        let payment = recorded_payment(&svc).await;

        let day = std::time::Duration::from_secs(24 * 60 * 60);
        let later = (DateTime::now() + 3 * day).coerce();
        let earlier = (DateTime::now() + day).coerce();

        let payment = svc
            .execute(CreateReminder {
                payment_id: payment.id,
                channel: payment::reminder::Channel::Email,
                message: "Final notice".parse().unwrap(),
                scheduled_at: Some(later),
                send_now: false,
                actor: fixture::staff("Priya Nair"),
            })
            .await
            .unwrap();
        assert_eq!(payment.next_reminder_at, Some(later));

        // An earlier schedule moves the cache back.
        let payment = svc
            .execute(CreateReminder {
                payment_id: payment.id,
                channel: payment::reminder::Channel::Sms,
                message: "Installment due".parse().unwrap(),
                scheduled_at: Some(earlier),
                send_now: false,
                actor: fixture::staff("Priya Nair"),
            })
            .await
            .unwrap();
        assert_eq!(payment.next_reminder_at, Some(earlier));

        // A later one leaves it at the minimum.
        let payment = svc
            .execute(CreateReminder {
                payment_id: payment.id,
                channel: payment::reminder::Channel::Email,
                message: "Gentle reminder".parse().unwrap(),
                scheduled_at: Some((DateTime::now() + 5 * day).coerce()),
                send_now: false,
                actor: fixture::staff("Priya Nair"),
            })
            .await
            .unwrap();
        assert_eq!(payment.next_reminder_at, Some(earlier));
    }

    #[tokio::test]
    async fn rejects_schedule_missing() {
        let svc = fixture::service();
        let payment = recorded_payment(&svc).await;

        let err = svc
            .execute(CreateReminder {
                payment_id: payment.id,
                channel: payment::reminder::Channel::Sms,
                message: "Balance due".parse().unwrap(),
                scheduled_at: None,
                send_now: false,
                actor: fixture::staff("Priya Nair"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::ScheduleMissing));
    }
}
