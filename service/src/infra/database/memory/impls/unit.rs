//! [`Unit`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{project, unit, Unit},
    infra::{
        database::{
            self,
            memory::{Connection, Memory},
        },
        Database,
    },
};

impl<C: Connection> Database<Select<By<Option<Unit>, unit::Id>>>
    for Memory<C>
{
    type Ok = Option<Unit>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Unit>, unit::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with(|state| state.units.get(&id).cloned())
            .await
            .map_err(tracerr::map_from_and_wrap!())
    }
}

impl<C: Connection> Database<Select<By<Vec<Unit>, project::Id>>>
    for Memory<C>
{
    type Ok = Vec<Unit>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Unit>, project::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let project_id = by.into_inner();
        self.with(|state| {
            state
                .units
                .values()
                .filter(|u| u.project_id == project_id)
                .cloned()
                .collect()
        })
        .await
        .map_err(tracerr::map_from_and_wrap!())
    }
}

impl<C: Connection> Database<Insert<Unit>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(unit): Insert<Unit>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(|state| {
            drop(state.units.insert(unit.id, unit));
        })
        .await
        .map_err(tracerr::map_from_and_wrap!())
    }
}

impl<C: Connection> Database<Update<Unit>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(unit): Update<Unit>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(|state| {
            drop(state.units.insert(unit.id, unit));
        })
        .await
        .map_err(tracerr::map_from_and_wrap!())
    }
}
