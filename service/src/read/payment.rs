//! [`Payment`]-related read definitions.

use derive_more::Deref;

use crate::domain::payment::{reminder, ReceiptNo};
#[cfg(doc)]
use crate::domain::{payment, Payment};

/// Next sequential [`ReceiptNo`] within the [`payment::Year`] it was
/// selected by.
///
/// Sequences are dense, start at 1, and restart every calendar year.
#[derive(Clone, Copy, Debug, Deref, Eq, PartialEq)]
pub struct NextReceiptNo(pub ReceiptNo);

/// Selector of [`Payment`]s having at least one
/// [`SCHEDULED`](reminder::Status::Scheduled) [`reminder::Reminder`]
/// due at or before the wrapped moment.
#[derive(Clone, Copy, Debug)]
pub struct ScheduledBefore(pub reminder::ScheduleDateTime);
