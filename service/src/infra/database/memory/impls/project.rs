//! [`Project`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{project, Project},
    infra::{
        database::{
            self,
            memory::{Connection, Memory},
        },
        Database,
    },
};

impl<C: Connection> Database<Select<By<Option<Project>, project::Id>>>
    for Memory<C>
{
    type Ok = Option<Project>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Project>, project::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with(|state| state.projects.get(&id).cloned())
            .await
            .map_err(tracerr::map_from_and_wrap!())
    }
}

impl<C: Connection> Database<Insert<Project>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(project): Insert<Project>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(|state| {
            drop(state.projects.insert(project.id, project));
        })
        .await
        .map_err(tracerr::map_from_and_wrap!())
    }
}

impl<C: Connection> Database<Update<Project>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(project): Update<Project>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(|state| {
            drop(state.projects.insert(project.id, project));
        })
        .await
        .map_err(tracerr::map_from_and_wrap!())
    }
}
