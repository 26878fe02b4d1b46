//! Background [`Task`]s definitions.

mod background;
pub mod send_due_reminders;

pub use common::Handler as Task;

pub use self::{background::Background, send_due_reminders::SendDueReminders};
