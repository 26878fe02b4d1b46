//! [`Booking`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{booking, unit, Booking},
    infra::{
        database::{
            self,
            memory::{Connection, Memory},
        },
        Database,
    },
    read,
};

impl<C: Connection> Database<Select<By<Option<Booking>, booking::Id>>>
    for Memory<C>
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with(|state| state.bookings.get(&id).cloned())
            .await
            .map_err(tracerr::map_from_and_wrap!())
    }
}

impl<C: Connection>
    Database<Select<By<Option<read::booking::ActiveForUnit>, unit::Id>>>
    for Memory<C>
{
    type Ok = Option<read::booking::ActiveForUnit>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<read::booking::ActiveForUnit>, unit::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let unit_id = by.into_inner();
        self.with(|state| {
            state
                .bookings
                .values()
                .find(|b| b.unit_id == unit_id && !b.is_terminal())
                .cloned()
                .map(read::booking::ActiveForUnit)
        })
        .await
        .map_err(tracerr::map_from_and_wrap!())
    }
}

impl<C: Connection> Database<Insert<Booking>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(|state| {
            drop(state.bookings.insert(booking.id, booking));
        })
        .await
        .map_err(tracerr::map_from_and_wrap!())
    }
}

impl<C: Connection> Database<Update<Booking>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(|state| {
            drop(state.bookings.insert(booking.id, booking));
        })
        .await
        .map_err(tracerr::map_from_and_wrap!())
    }
}
