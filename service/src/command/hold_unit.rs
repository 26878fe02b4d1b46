//! [`Command`] for holding a [`Unit`] on behalf of a [`Customer`].

use std::time;

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted, Update},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use serde_json::json;
use tracerr::Traced;

use crate::{
    domain::{audit, booking, project, unit, Booking, Customer, Staff, Unit},
    infra::{database, Database},
    read,
    Service,
};
#[cfg(doc)]
use crate::domain::Project;

use super::Command;

/// [`Command`] for holding a [`Unit`] on behalf of a [`Customer`].
///
/// The only entry point creating a [`Booking`]: it starts in
/// [`booking::Status::Hold`] with the [`Unit`] moved to
/// [`unit::Status::Hold`] atomically.
#[derive(Clone, Debug)]
pub struct HoldUnit {
    /// ID of the [`Unit`] to hold.
    pub unit_id: unit::Id,

    /// [`Customer`] the hold is placed for.
    pub customer: Customer,

    /// Token amount paid to place the hold.
    pub token_amount: Money,

    /// Duration of the hold.
    ///
    /// Defaults to [`Config::default_hold`] when omitted.
    ///
    /// [`Config::default_hold`]: crate::Config::default_hold
    pub hold: Option<time::Duration>,

    /// [`Staff`] agent attached to the new [`Booking`], if any.
    pub agent: Option<Staff>,

    /// [`Staff`] member placing the hold.
    pub actor: Staff,
}

impl<Db> Command<HoldUnit> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Unit>, unit::Id>>,
            Ok = Option<Unit>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<project::Project>, project::Id>>,
            Ok = Option<project::Project>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Select<By<Option<Unit>, unit::Id>>,
            Ok = Option<Unit>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<read::booking::ActiveForUnit>, unit::Id>>,
            Ok = Option<read::booking::ActiveForUnit>,
            Err = Traced<database::Error>,
        > + Database<Update<Unit>, Err = Traced<database::Error>>
        + Database<Insert<Booking>, Err = Traced<database::Error>>
        + Database<Insert<audit::Entry>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    #[expect(clippy::too_many_lines, reason = "still readable")]
    async fn execute(&self, cmd: HoldUnit) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let HoldUnit {
            unit_id,
            customer,
            token_amount,
            hold,
            agent,
            actor,
        } = cmd;

        let unit = self
            .database()
            .execute(Select(By::<Option<Unit>, _>::new(unit_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UnitNotExists(unit_id))
            .map_err(tracerr::wrap!())?;

        if token_amount.currency != unit.price.currency {
            return Err(tracerr::new!(E::CurrencyMismatch {
                token: token_amount.currency,
                price: unit.price.currency,
            }));
        }
        if token_amount.amount > unit.price.amount {
            return Err(tracerr::new!(E::TokenExceedsPrice {
                token: token_amount,
                price: unit.price,
            }));
        }

        let project = self
            .database()
            .execute(Select(By::<Option<project::Project>, _>::new(
                unit.project_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ProjectNotExists(unit.project_id))
            .map_err(tracerr::wrap!())?;
        if project.is_closed() {
            return Err(tracerr::new!(E::ProjectClosed(project.id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Re-read under the transaction: the status may have moved since
        // the precondition check.
        let mut unit = tx
            .execute(Select(By::<Option<Unit>, _>::new(unit_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UnitNotExists(unit_id))
            .map_err(tracerr::wrap!())?;
        if unit.status != unit::Status::Available {
            return Err(tracerr::new!(E::UnitNotAvailable {
                id: unit.id,
                status: unit.status,
            }));
        }

        let occupied = tx
            .execute(Select(
                By::<Option<read::booking::ActiveForUnit>, _>::new(unit.id),
            ))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if occupied.is_some() {
            return Err(tracerr::new!(E::UnitNotAvailable {
                id: unit.id,
                status: unit.status,
            }));
        }

        let now = DateTime::now();
        let hold = hold.unwrap_or(self.config().default_hold);
        let booking = Booking {
            id: booking::Id::new(),
            unit_id: unit.id,
            customer,
            project_id: project.id,
            project_name: project.name,
            unit_no: unit.unit_no.clone(),
            total_price: unit.price,
            token_amount,
            status: booking::Status::Hold,
            hold_expires_at: Some((now + hold).coerce()),
            approved_by: None,
            agent,
            payment_mode: None,
            remarks: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
            booked_at: None,
        };

        unit.status = unit::Status::Hold;
        unit.updated_at = now.coerce();
        tx.execute(Update(unit.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Insert(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Insert(audit::Entry {
            id: audit::Id::new(),
            action: audit::Action::UnitHeld,
            entity_kind: audit::EntityKind::Unit,
            entity_id: unit.id.into(),
            actor: actor.into(),
            details: json!({
                "booking_id": booking.id,
                "token_amount": booking.token_amount.to_string(),
                "hold_secs": hold.as_secs(),
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

        Ok(booking)
    }
}

/// Error of [`HoldUnit`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Token currency differs from the [`Unit`] price currency.
    #[display("token currency `{token}` differs from price currency `{price}`")]
    CurrencyMismatch {
        /// Currency of the token amount.
        token: common::money::Currency,

        /// Currency of the [`Unit`] price.
        price: common::money::Currency,
    },

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Project`] with the provided ID is closed.
    #[display("`Project(id: {_0})` is closed")]
    ProjectClosed(#[error(not(source))] project::Id),

    /// [`Project`] with the provided ID does not exist.
    #[display("`Project(id: {_0})` does not exist")]
    ProjectNotExists(#[error(not(source))] project::Id),

    /// Token amount exceeds the [`Unit`] price.
    #[display("token `{token}` exceeds price `{price}`")]
    TokenExceedsPrice {
        /// Token amount.
        token: Money,

        /// Price of the [`Unit`].
        price: Money,
    },

    /// [`Unit`] with the provided ID is not open for holding.
    #[display("`Unit(id: {id})` is not available: {status}")]
    UnitNotAvailable {
        /// ID of the [`Unit`].
        id: unit::Id,

        /// Actual status of the [`Unit`].
        status: unit::Status,
    },

    /// [`Unit`] with the provided ID does not exist.
    #[display("`Unit(id: {_0})` does not exist")]
    UnitNotExists(#[error(not(source))] unit::Id),
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, Money};

    use crate::{
        command::{fixture, Command as _},
        domain::{booking, unit},
    };

    use super::{ExecutionError, HoldUnit};

    #[tokio::test]
    async fn holds_available_unit() {
        let svc = fixture::service();
        let project = fixture::seed_project(&svc).await;
        let unit = fixture::seed_unit(&svc, &project, 8_500_000).await;

        let booking = svc
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

        assert_eq!(booking.status, booking::Status::Hold);
        assert_eq!(booking.total_price, fixture::money(8_500_000));
        let expires = booking.hold_expires_at.unwrap();
        let expected = booking.created_at.coerce()
            + std::time::Duration::from_secs(48 * 60 * 60);
        assert_eq!(expires, expected);

        let held = fixture::unit(&svc, unit.id).await;
        assert_eq!(held.status, unit::Status::Hold);
    }

    #[tokio::test]
    async fn rejects_unit_not_available() {
        let svc = fixture::service();
        let project = fixture::seed_project(&svc).await;
        let unit = fixture::seed_unit(&svc, &project, 8_500_000).await;

        let _ = svc
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

        let err = svc
            .execute(HoldUnit {
                unit_id: unit.id,
                customer: fixture::customer(),
                token_amount: fixture::money(500_000),
                hold: None,
                agent: None,
                actor: fixture::staff("Priya Nair"),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::UnitNotAvailable { .. },
        ));
    }

    #[tokio::test]
    async fn rejects_token_exceeding_price() {
        let svc = fixture::service();
        let project = fixture::seed_project(&svc).await;
        let unit = fixture::seed_unit(&svc, &project, 8_500_000).await;

        let err = svc
            .execute(HoldUnit {
                unit_id: unit.id,
                customer: fixture::customer(),
                token_amount: fixture::money(9_000_000),
                hold: None,
                agent: None,
                actor: fixture::staff("Priya Nair"),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::TokenExceedsPrice { .. },
        ));
    }

    #[tokio::test]
    async fn rejects_currency_mismatch() {
        let svc = fixture::service();
        let project = fixture::seed_project(&svc).await;
        let unit = fixture::seed_unit(&svc, &project, 8_500_000).await;

        let err = svc
            .execute(HoldUnit {
                unit_id: unit.id,
                customer: fixture::customer(),
                token_amount: Money {
                    amount: 500_000.into(),
                    currency: Currency::Usd,
                },
                hold: None,
                agent: None,
                actor: fixture::staff("Priya Nair"),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::CurrencyMismatch { .. },
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_unit() {
        let svc = fixture::service();

        let err = svc
            .execute(HoldUnit {
                unit_id: unit::Id::new(),
                customer: fixture::customer(),
                token_amount: fixture::money(500_000),
                hold: None,
                agent: None,
                actor: fixture::staff("Priya Nair"),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::UnitNotExists(_),
        ));
    }
}
