//! Reminder delivery channels attached to an invoice

use crate::entitlement::EntitlementView;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
    Whatsapp,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Email, Channel::Sms, Channel::Whatsapp];

    /// SMS and WhatsApp need a Pro plan and a client phone number.
    pub fn is_premium(&self) -> bool {
        matches!(self, Channel::Sms | Channel::Whatsapp)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Email => write!(f, "email"),
            Channel::Sms => write!(f, "sms"),
            Channel::Whatsapp => write!(f, "whatsapp"),
        }
    }
}

impl std::str::FromStr for Channel {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Channel::Email),
            "sms" => Ok(Channel::Sms),
            "whatsapp" => Ok(Channel::Whatsapp),
            other => Err(ChannelError::Unknown(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("{0} reminders require the Pro plan")]
    ProRequired(Channel),
    #[error("{0} reminders require a client phone number")]
    PhoneRequired(Channel),
    #[error("At least one reminder channel must stay enabled")]
    LastChannel,
    #[error("Subscription status is still loading")]
    EntitlementUnknown,
    #[error("Unknown reminder channel '{0}'")]
    Unknown(String),
}

/// The invoice's `reminderChannels`, as a set. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Channel>", into = "Vec<Channel>")]
pub struct ReminderChannels(BTreeSet<Channel>);

impl Default for ReminderChannels {
    fn default() -> Self {
        Self(BTreeSet::from([Channel::Email]))
    }
}

impl TryFrom<Vec<Channel>> for ReminderChannels {
    type Error = ChannelError;

    fn try_from(channels: Vec<Channel>) -> Result<Self, Self::Error> {
        let set: BTreeSet<Channel> = channels.into_iter().collect();
        if set.is_empty() {
            // Older invoices were stored without channels; they meant email.
            return Ok(Self::default());
        }
        Ok(Self(set))
    }
}

impl From<ReminderChannels> for Vec<Channel> {
    fn from(channels: ReminderChannels) -> Self {
        channels.0.into_iter().collect()
    }
}

impl ReminderChannels {
    pub fn contains(&self, channel: Channel) -> bool {
        self.0.contains(&channel)
    }

    pub fn iter(&self) -> impl Iterator<Item = Channel> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Adds or removes `channel`. Rejections leave the set untouched.
    ///
    /// Adding a premium channel requires a loaded Pro entitlement and a
    /// non-blank phone number. The last remaining channel cannot be removed.
    pub fn toggle(
        &mut self,
        channel: Channel,
        entitlement: Option<&EntitlementView>,
        client_phone: Option<&str>,
    ) -> Result<(), ChannelError> {
        if self.0.contains(&channel) {
            if self.0.len() == 1 {
                return Err(ChannelError::LastChannel);
            }
            self.0.remove(&channel);
            return Ok(());
        }
        check_channel(channel, entitlement, client_phone)?;
        self.0.insert(channel);
        Ok(())
    }

    /// Drops premium channels the caller is no longer allowed to use.
    /// Falls back to email if nothing survives. Returns the dropped channels.
    pub fn sanitize(
        &mut self,
        entitlement: Option<&EntitlementView>,
        client_phone: Option<&str>,
    ) -> Vec<Channel> {
        let dropped: Vec<Channel> = self
            .0
            .iter()
            .copied()
            .filter(|c| check_channel(*c, entitlement, client_phone).is_err())
            .collect();
        for channel in &dropped {
            self.0.remove(channel);
        }
        if self.0.is_empty() {
            self.0.insert(Channel::Email);
        }
        dropped
    }
}

/// Whether `channel` may be enabled for an invoice with `client_phone`.
pub fn check_channel(
    channel: Channel,
    entitlement: Option<&EntitlementView>,
    client_phone: Option<&str>,
) -> Result<(), ChannelError> {
    if !channel.is_premium() {
        return Ok(());
    }
    let view = entitlement.ok_or(ChannelError::EntitlementUnknown)?;
    if !view.is_pro {
        return Err(ChannelError::ProRequired(channel));
    }
    let has_phone = client_phone.map(|p| !p.trim().is_empty()).unwrap_or(false);
    if !has_phone {
        return Err(ChannelError::PhoneRequired(channel));
    }
    Ok(())
}
