//! [`Command`] definition.

pub mod approve_booking;
pub mod close_project;
pub mod confirm_booking;
pub mod create_reminder;
pub mod hold_unit;
pub mod record_payment;
pub mod reject_booking;
pub mod request_payment;
pub mod send_due_reminders;
pub mod submit_for_approval;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    approve_booking::ApproveBooking, close_project::CloseProject,
    confirm_booking::ConfirmBooking, create_reminder::CreateReminder,
    hold_unit::HoldUnit, record_payment::RecordPayment,
    reject_booking::RejectBooking, request_payment::RequestPayment,
    send_due_reminders::SendDueReminders,
    submit_for_approval::SubmitForApproval,
};

#[cfg(test)]
pub(crate) mod fixture {
    //! Shared fixtures for [`Command`](super::Command) tests.

    use common::{money::Currency, operations::Insert, DateTime, Money};

    use crate::{
        domain::{
            customer, project, staff, unit, Booking, Customer, Project,
            Staff, Unit,
        },
        infra::Memory,
        Config, Service,
    };

    use super::{Command as _, HoldUnit};

    /// In-memory [`Service`] with the default [`Config`].
    pub(crate) fn service() -> Service<Memory> {
        Service {
            config: Config::default(),
            database: Memory::new(),
        }
    }

    /// INR [`Money`] amount.
    pub(crate) fn money(amount: i64) -> Money {
        Money {
            amount: amount.into(),
            currency: Currency::Inr,
        }
    }

    /// [`Staff`] member with the provided name.
    pub(crate) fn staff(name: &str) -> Staff {
        Staff {
            id: staff::Id::new(),
            name: name.parse().unwrap(),
        }
    }

    /// [`Customer`] snapshot.
    pub(crate) fn customer() -> Customer {
        Customer {
            id: customer::Id::new(),
            name: "Asha Verma".parse().unwrap(),
            email: "asha.verma@example.com".parse().unwrap(),
            phone: "+91 987 654 3210".parse().unwrap(),
        }
    }

    /// Seeds an open [`Project`].
    pub(crate) async fn seed_project(svc: &Service<Memory>) -> Project {
        let project = Project {
            id: project::Id::new(),
            name: project::Name::new("Emerald Heights").unwrap(),
            created_at: DateTime::now().coerce(),
            closed_at: None,
        };
        svc.database()
            .execute(Insert(project.clone()))
            .await
            .unwrap();
        project
    }

    /// Seeds an available [`Unit`] with the provided INR price.
    pub(crate) async fn seed_unit(
        svc: &Service<Memory>,
        project: &Project,
        price: i64,
    ) -> Unit {
        let unit = Unit {
            id: unit::Id::new(),
            project_id: project.id,
            unit_no: unit::No::new("A-1203").unwrap(),
            price: money(price),
            status: unit::Status::Available,
            created_at: DateTime::now().coerce(),
            updated_at: DateTime::now().coerce(),
        };
        svc.database().execute(Insert(unit.clone())).await.unwrap();
        unit
    }

    /// Reads a [`Unit`] back by its ID.
    pub(crate) async fn unit(svc: &Service<Memory>, id: unit::Id) -> Unit {
        use common::operations::{By, Select};

        svc.database()
            .execute(Select(By::<Option<Unit>, _>::new(id)))
            .await
            .unwrap()
            .unwrap()
    }

    /// Seeds a [`Project`] with one 8,500,000 INR [`Unit`] and holds it
    /// with a 500,000 INR token.
    pub(crate) async fn held_booking(svc: &Service<Memory>) -> Booking {
        let project = seed_project(svc).await;
        let unit = seed_unit(svc, &project, 8_500_000).await;
        svc.execute(HoldUnit {
            unit_id: unit.id,
            customer: customer(),
            token_amount: money(500_000),
            hold: None,
            agent: None,
            actor: staff("Priya Nair"),
        })
        .await
        .unwrap()
    }
}
