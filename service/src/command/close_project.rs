//! [`Command`] for closing a [`Project`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use serde_json::json;
use tracerr::Traced;

use crate::{
    domain::{audit, project, unit, Project, Staff, Unit},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for closing a [`Project`].
///
/// Withdraws every [`Unit`] of the [`Project`] from the inventory.
/// Bookings already in flight are left to run their course: rejecting
/// one later will not resurrect a withdrawn [`Unit`].
#[derive(Clone, Debug)]
pub struct CloseProject {
    /// ID of the [`Project`] to close.
    pub project_id: project::Id,

    /// [`Staff`] member closing the [`Project`].
    pub actor: Staff,
}

impl<Db> Command<CloseProject> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Project>, project::Id>>,
            Ok = Option<Project>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Unit>, project::Id>>,
            Ok = Vec<Unit>,
            Err = Traced<database::Error>,
        > + Database<Update<Project>, Err = Traced<database::Error>>
        + Database<Update<Unit>, Err = Traced<database::Error>>
        + Database<Insert<audit::Entry>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Project;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CloseProject) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CloseProject { project_id, actor } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut project = tx
            .execute(Select(By::<Option<Project>, _>::new(project_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ProjectNotExists(project_id))
            .map_err(tracerr::wrap!())?;
        if project.is_closed() {
            return Err(tracerr::new!(E::ProjectAlreadyClosed(project_id)));
        }

        let now = DateTime::now();
        project.closed_at = Some(now.coerce());
        tx.execute(Update(project.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let units = tx
            .execute(Select(By::<Vec<Unit>, _>::new(project_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let withdrawn = units.len();
        for mut unit in units {
            unit.status = unit::Status::Closed;
            unit.updated_at = now.coerce();
            tx.execute(Update(unit))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        tx.execute(Insert(audit::Entry {
            id: audit::Id::new(),
            action: audit::Action::ProjectClosed,
            entity_kind: audit::EntityKind::Project,
            entity_id: project.id.into(),
            actor: actor.into(),
            details: json!({ "units_withdrawn": withdrawn }),
            recorded_at: now.coerce(),
        }))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))
        .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(project)
    }
}

/// Error of [`CloseProject`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Project`] with the provided ID is closed already.
    #[display("`Project(id: {_0})` is closed already")]
    ProjectAlreadyClosed(#[error(not(source))] project::Id),

    /// [`Project`] with the provided ID does not exist.
    #[display("`Project(id: {_0})` does not exist")]
    ProjectNotExists(#[error(not(source))] project::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{fixture, Command as _, HoldUnit, RejectBooking},
        domain::unit,
    };

    use super::{CloseProject, ExecutionError};

    #[tokio::test]
    async fn withdraws_all_units() {
        let svc = fixture::service();
        let project = fixture::seed_project(&svc).await;
        let a = fixture::seed_unit(&svc, &project, 8_500_000).await;
        let b = fixture::seed_unit(&svc, &project, 6_200_000).await;

        let closed = svc
            .execute(CloseProject {
                project_id: project.id,
                actor: fixture::staff("Rahul Mehta"),
            })
            .await
            .unwrap();

        assert!(closed.is_closed());
        for id in [a.id, b.id] {
            let unit = fixture::unit(&svc, id).await;
            assert_eq!(unit.status, unit::Status::Closed);
        }
    }

    #[tokio::test]
    async fn rejects_double_closure() {
        let svc = fixture::service();
        let project = fixture::seed_project(&svc).await;

        let _ = svc
            .execute(CloseProject {
                project_id: project.id,
                actor: fixture::staff("Rahul Mehta"),
            })
            .await
            .unwrap();

        let err = svc
            .execute(CloseProject {
                project_id: project.id,
                actor: fixture::staff("Rahul Mehta"),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::ProjectAlreadyClosed(_),
        ));
    }

    #[tokio::test]
    async fn rejecting_booking_after_closure_keeps_unit_withdrawn() {
        let svc = fixture::service();
        let project = fixture::seed_project(&svc).await;
        let unit = fixture::seed_unit(&svc, &project, 8_500_000).await;

        let held = svc
            .execute(HoldUnit {
                unit_id: unit.id,
                customer: fixture::customer(),
                token_amount: fixture::money(500_000),
                hold: None,
                agent: None,
                actor: fixture::staff("Priya Nair"),
            })
            .await
            .unwrap();
        let _ = svc
            .execute(CloseProject {
                project_id: project.id,
                actor: fixture::staff("Rahul Mehta"),
            })
            .await
            .unwrap();
        let _ = svc
            .execute(RejectBooking {
                booking_id: held.id,
                refunded: true,
                remarks: None,
                actor: fixture::staff("Rahul Mehta"),
            })
            .await
            .unwrap();

        let withdrawn = fixture::unit(&svc, unit.id).await;
        assert_eq!(withdrawn.status, unit::Status::Closed);
    }
}
