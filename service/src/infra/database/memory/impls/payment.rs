//! [`Payment`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{
        payment::{self, reminder, ReceiptNo},
        Payment,
    },
    infra::{
        database::{
            self,
            memory::{Connection, Memory},
        },
        Database,
    },
    read,
};

impl<C: Connection> Database<Select<By<Option<Payment>, payment::Id>>>
    for Memory<C>
{
    type Ok = Option<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Payment>, payment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with(|state| state.payments.get(&id).cloned())
            .await
            .map_err(tracerr::map_from_and_wrap!())
    }
}

impl<C: Connection>
    Database<Select<By<read::payment::NextReceiptNo, payment::Year>>>
    for Memory<C>
{
    type Ok = read::payment::NextReceiptNo;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::payment::NextReceiptNo, payment::Year>>,
    ) -> Result<Self::Ok, Self::Err> {
        let year = by.into_inner();
        self.with(|state| {
            let seq = state
                .payments
                .values()
                .filter(|p| p.receipt_no.year == year)
                .map(|p| p.receipt_no.seq)
                .max()
                .unwrap_or(0)
                + 1;
            read::payment::NextReceiptNo(ReceiptNo { year, seq })
        })
        .await
        .map_err(tracerr::map_from_and_wrap!())
    }
}

impl<C: Connection>
    Database<Select<By<Vec<Payment>, read::payment::ScheduledBefore>>>
    for Memory<C>
{
    type Ok = Vec<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Payment>, read::payment::ScheduledBefore>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::payment::ScheduledBefore(deadline) = by.into_inner();
        self.with(|state| {
            state
                .payments
                .values()
                .filter(|p| {
                    p.reminders.iter().any(|r| {
                        r.status == reminder::Status::Scheduled
                            && r.scheduled_at <= deadline
                    })
                })
                .cloned()
                .collect()
        })
        .await
        .map_err(tracerr::map_from_and_wrap!())
    }
}

impl<C: Connection> Database<Insert<Payment>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(payment): Insert<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(|state| {
            drop(state.payments.insert(payment.id, payment));
        })
        .await
        .map_err(tracerr::map_from_and_wrap!())
    }
}

impl<C: Connection> Database<Update<Payment>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(payment): Update<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(|state| {
            drop(state.payments.insert(payment.id, payment));
        })
        .await
        .map_err(tracerr::map_from_and_wrap!())
    }
}
