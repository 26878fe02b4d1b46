//! [`Database`] operation implementations of the [`Memory`] store.
//!
//! [`Database`]: crate::infra::Database
//! [`Memory`]: super::Memory

mod audit;
mod booking;
mod payment;
mod project;
mod unit;
