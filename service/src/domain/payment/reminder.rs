//! [`Reminder`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::{Customer, Payment};

/// Attempt (or planned attempt) to notify a [`Customer`] of a pending
/// [`Payment`].
#[derive(Clone, Debug)]
pub struct Reminder {
    /// ID of this [`Reminder`].
    pub id: Id,

    /// [`Channel`] this [`Reminder`] goes out on.
    pub channel: Channel,

    /// [`Message`] body of this [`Reminder`].
    pub message: Message,

    /// [`DateTime`] this [`Reminder`] is (or was) scheduled for.
    pub scheduled_at: ScheduleDateTime,

    /// Delivery [`Status`] of this [`Reminder`].
    pub status: Status,

    /// [`DateTime`] when this [`Reminder`] was sent.
    ///
    /// [`Some`] iff [`Reminder::status`] is [`Status::Sent`].
    pub sent_at: Option<SendDateTime>,
}

/// ID of a [`Reminder`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Channel a [`Reminder`] goes out on.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    PartialEq,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[repr(u8)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Channel {
    /// Email.
    Email = 1,

    /// SMS.
    Sms = 2,

    /// WhatsApp.
    Whatsapp = 3,
}

define_kind! {
    #[doc = "Delivery status of a [`Reminder`]."]
    enum Status {
        #[doc = "Scheduled for a future send."]
        Scheduled = 1,

        #[doc = "Sent out."]
        Sent = 2,
    }
}

/// Message body of a [`Reminder`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(forward)]
pub struct Message(String);

impl Message {
    /// Creates a new [`Message`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `message` is not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// Creates a new [`Message`] if the given `message` is valid.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Option<Self> {
        let message = message.into();
        Self::check(&message).then_some(Self(message))
    }

    /// Checks whether the given `message` is a valid [`Message`].
    fn check(message: impl AsRef<str>) -> bool {
        let message = message.as_ref();
        !message.trim().is_empty() && message.len() <= 2048
    }
}

impl FromStr for Message {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Message`")
    }
}

/// [`DateTime`] a [`Reminder`] is scheduled for.
pub type ScheduleDateTime = DateTimeOf<(Reminder, Schedule)>;

/// Marker type indicating a [`Reminder`] schedule.
#[derive(Clone, Copy, Debug)]
pub struct Schedule;

/// [`DateTime`] a [`Reminder`] was sent at.
pub type SendDateTime = DateTimeOf<(Reminder, Send)>;

/// Marker type indicating a [`Reminder`] send.
#[derive(Clone, Copy, Debug)]
pub struct Send;
