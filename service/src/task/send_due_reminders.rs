//! [`SendDueReminders`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Perform, Start};
use smart_default::SmartDefault;
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{command, domain::audit, Service};

#[cfg(doc)]
use crate::domain::payment::Reminder;

use super::Task;

/// Configuration for [`SendDueReminders`] [`Task`].
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// Interval between [`Reminder`]s dispatching sweeps.
    #[default(time::Duration::from_secs(60))]
    pub interval: time::Duration,
}

/// [`Task`] for dispatching due scheduled [`Reminder`]s.
#[derive(Clone, Copy, Debug)]
pub struct SendDueReminders<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<SendDueReminders<Self>, Config>>> for Service<Db>
where
    SendDueReminders<Service<Db>>:
        Task<Perform<()>, Ok = usize, Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<SendDueReminders<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = SendDueReminders {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task
                .execute(Perform(()))
                .await
                .map(|sent| {
                    if sent > 0 {
                        log::info!(
                            "`task::SendDueReminders` dispatched {sent} \
                             reminder(s)",
                        );
                    }
                })
                .map_err(|e| {
                    log::error!("`task::SendDueReminders` failed: {e}");
                });
        }
    }
}

impl<Db> Task<Perform<()>> for SendDueReminders<Service<Db>>
where
    Service<Db>: command::Command<
        command::SendDueReminders,
        Ok = usize,
        Err = ExecutionError,
    >,
{
    type Ok = usize;
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        self.service
            .execute(command::SendDueReminders {
                actor: audit::Actor::system(),
            })
            .await
    }
}

/// Error of [`SendDueReminders`] execution.
pub type ExecutionError =
    Traced<command::send_due_reminders::ExecutionError>;
