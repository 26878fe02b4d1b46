//! [`Query`] collection related to a single [`Booking`].

use common::operations::By;

use crate::{
    domain::{booking, unit, Booking},
    read,
};
#[cfg(doc)]
use crate::{domain::Unit, Query};

use super::DatabaseQuery;

/// Queries a [`Booking`] by its [`booking::Id`].
pub type ById = DatabaseQuery<By<Option<Booking>, booking::Id>>;

/// Queries the active [`Booking`] occupying a [`Unit`], if any.
pub type ActiveForUnit =
    DatabaseQuery<By<Option<read::booking::ActiveForUnit>, unit::Id>>;
