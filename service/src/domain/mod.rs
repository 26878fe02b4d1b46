//! Domain definitions.

pub mod audit;
pub mod booking;
pub mod customer;
pub mod payment;
pub mod project;
pub mod staff;
pub mod unit;

pub use self::{
    booking::Booking, customer::Customer, payment::Payment, project::Project,
    staff::Staff, unit::Unit,
};
