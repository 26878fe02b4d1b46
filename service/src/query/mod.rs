//! [`Query`] definition.

pub mod booking;
pub mod payment;
pub mod project;
pub mod unit;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{database, Database},
    Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] [`Select`]ing a `T`ype from a [`Database`].
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DatabaseQuery<T>(T);

impl<W, B> DatabaseQuery<By<W, B>> {
    /// Creates a new [`DatabaseQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Db, W, B> Query<DatabaseQuery<By<W, B>>> for Service<Db>
where
    Db: Database<Select<By<W, B>>, Ok = W, Err = Traced<database::Error>>,
{
    type Ok = W;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        DatabaseQuery(by): DatabaseQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use crate::{command::fixture, domain::Unit};

    use super::{unit, Query as _};

    #[tokio::test]
    async fn selects_unit_by_id() {
        let svc = fixture::service();
        let project = fixture::seed_project(&svc).await;
        let seeded = fixture::seed_unit(&svc, &project, 8_500_000).await;

        let found: Option<Unit> = svc
            .execute(unit::ById::by(seeded.id))
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.id), Some(seeded.id));
    }

    #[tokio::test]
    async fn selects_nothing_for_unknown_id() {
        let svc = fixture::service();

        let found: Option<Unit> = svc
            .execute(unit::ById::by(crate::domain::unit::Id::new()))
            .await
            .unwrap();
        assert!(found.is_none());
    }
}
