//! [`Booking`]-related read definitions.

use derive_more::Deref;

use crate::domain::Booking;
#[cfg(doc)]
use crate::domain::Unit;

/// Wrapper around a [`Booking`] indicating that it is non-terminal and
/// references the [`Unit`] it was selected by.
///
/// At most one such [`Booking`] exists per [`Unit`] at a time.
#[derive(Clone, Debug, Deref)]
pub struct ActiveForUnit(pub Booking);
