//! [`Query`] collection related to [`Payment`]s.

use common::operations::By;

use crate::{
    domain::{payment, Payment},
    read,
};
#[cfg(doc)]
use crate::{domain::payment::Reminder, Query};

use super::DatabaseQuery;

/// Queries a [`Payment`] by its [`payment::Id`].
pub type ById = DatabaseQuery<By<Option<Payment>, payment::Id>>;

/// Queries the [`Payment`]s having a [`Reminder`] scheduled before a moment.
pub type WithDueReminders =
    DatabaseQuery<By<Vec<Payment>, read::payment::ScheduledBefore>>;
