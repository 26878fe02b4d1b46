//! [`Query`] collection related to [`Unit`]s.

use common::operations::By;

use crate::domain::{project, unit, Unit};
#[cfg(doc)]
use crate::{domain::Project, Query};

use super::DatabaseQuery;

/// Queries a [`Unit`] by its [`unit::Id`].
pub type ById = DatabaseQuery<By<Option<Unit>, unit::Id>>;

/// Queries all the [`Unit`]s belonging to a [`Project`].
pub type OfProject = DatabaseQuery<By<Vec<Unit>, project::Id>>;
