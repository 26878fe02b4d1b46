//! [`Command`] for dispatching all due scheduled [`Reminder`]s.

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use serde_json::json;
use tracerr::Traced;

use crate::{
    domain::{audit, payment::reminder, Payment},
    infra::{database, Database},
    read,
    Service,
};
#[cfg(doc)]
use crate::domain::payment::Reminder;

use super::Command;

/// [`Command`] for dispatching all due scheduled [`Reminder`]s.
///
/// One sweep over every [`Payment`] holding a
/// [`Scheduled`](reminder::Status::Scheduled) [`Reminder`] due by now.
/// Both the manual trigger and the background tick run this exact
/// [`Command`], so their observable behavior cannot diverge.
#[derive(Clone, Debug)]
pub struct SendDueReminders {
    /// [`audit::Actor`] the sweep is recorded under.
    pub actor: audit::Actor,
}

impl<Db> Command<SendDueReminders> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Vec<Payment>, read::payment::ScheduledBefore>>,
            Ok = Vec<Payment>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Select<By<Vec<Payment>, read::payment::ScheduledBefore>>,
            Ok = Vec<Payment>,
            Err = Traced<database::Error>,
        > + Database<Update<Payment>, Err = Traced<database::Error>>
        + Database<Insert<audit::Entry>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = usize;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SendDueReminders,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SendDueReminders { actor } = cmd;

        let now = DateTime::now();
        let deadline = read::payment::ScheduledBefore(now.coerce());

        let due = self
            .database()
            .execute(Select(By::<Vec<Payment>, _>::new(deadline)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if due.is_empty() {
            return Ok(0);
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let due = tx
            .execute(Select(By::<Vec<Payment>, _>::new(deadline)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut sent = 0;
        for mut payment in due {
            let mut dispatched = 0;
            for r in payment.reminders.iter_mut().filter(|r| {
                r.status == reminder::Status::Scheduled
                    && r.scheduled_at <= deadline.0
            }) {
                r.status = reminder::Status::Sent;
                r.sent_at = Some(now.coerce());
                dispatched += 1;
            }
            payment.recompute_next_reminder();
            tx.execute(Update(payment.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            tx.execute(Insert(audit::Entry {
                id: audit::Id::new(),
                action: audit::Action::RemindersSent,
                entity_kind: audit::EntityKind::Payment,
                entity_id: payment.id.into(),
                actor: actor.clone(),
                details: json!({ "dispatched": dispatched }),
                recorded_at: now.coerce(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
            sent += dispatched;
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(sent)
    }
}

/// Error of [`SendDueReminders`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
