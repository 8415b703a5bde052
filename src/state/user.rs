//! User identity records and role features.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::de::Deserializer;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Unique user identifier, assigned by the external user store.
pub type UserId = u64;

/// Role/feature bit-set carried by every user.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Features(u32);

impl Features {
    pub const PROTECTED: Self = Self(1 << 0);
    pub const SUBSCRIBER: Self = Self(1 << 1);
    pub const VIP: Self = Self(1 << 2);
    pub const MODERATOR: Self = Self(1 << 3);
    pub const ADMIN: Self = Self(1 << 4);
    pub const BOT: Self = Self(1 << 5);

    /// Wire names, in ascending bit order.
    const NAMED: [(Self, &'static str); 6] = [
        (Self::PROTECTED, "protected"),
        (Self::SUBSCRIBER, "subscriber"),
        (Self::VIP, "vip"),
        (Self::MODERATOR, "moderator"),
        (Self::ADMIN, "admin"),
        (Self::BOT, "bot"),
    ];

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Build from raw bits, dropping unknown ones.
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & 0b11_1111)
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Look up a single feature by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMED
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(feature, _)| *feature)
    }

    /// Wire names of the set bits, in ascending bit order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .into_iter()
            .filter(move |(feature, _)| self.contains(*feature))
            .map(|(_, name)| name)
    }

    /// Legacy IRC-style prefix for the names listing.
    ///
    /// First match wins: admin `~`, bot `&`, moderator `@`, vip `%`,
    /// subscriber `+`.
    pub fn irc_prefix(self) -> &'static str {
        if self.contains(Self::ADMIN) {
            "~" // +q
        } else if self.contains(Self::BOT) {
            "&" // +a
        } else if self.contains(Self::MODERATOR) {
            "@" // +o
        } else if self.contains(Self::VIP) {
            "%" // +h
        } else if self.contains(Self::SUBSCRIBER) {
            "+" // +v
        } else {
            ""
        }
    }

    /// Whether a user with these features may talk while submode is on.
    pub fn may_speak_in_submode(self) -> bool {
        const ALLOWED: u32 = Features::SUBSCRIBER.0
            | Features::VIP.0
            | Features::MODERATOR.0
            | Features::ADMIN.0
            | Features::BOT.0
            | Features::PROTECTED.0;
        self.0 & ALLOWED != 0
    }
}

impl BitOr for Features {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Features {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Features {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

impl Serialize for Features {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(None)?;
        for name in self.names() {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Features {
    /// Unknown feature names (flair and the like) are ignored.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        Ok(names
            .iter()
            .filter_map(|name| Features::from_name(name))
            .fold(Features::empty(), |acc, feature| acc | feature))
    }
}

/// The public-facing view of a user embedded in presence payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifiedUser {
    pub nick: String,
    pub features: Features,
}

/// A chat identity.
///
/// Shared as `Arc<User>` between the global membership, every room the
/// identity joined, and the connections attributed to it. Records are never
/// dropped by the presence cache, so the anti-spam history survives
/// reconnects.
#[derive(Debug)]
pub struct User {
    id: UserId,
    profile: RwLock<SimplifiedUser>,
    /// When the user last had a message accepted.
    last_message: Mutex<Option<DateTime<Utc>>>,
}

impl User {
    pub fn new(id: UserId, nick: impl Into<String>, features: Features) -> Self {
        Self {
            id,
            profile: RwLock::new(SimplifiedUser {
                nick: nick.into(),
                features,
            }),
            last_message: Mutex::new(None),
        }
    }

    #[inline]
    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn nick(&self) -> String {
        self.profile.read().nick.clone()
    }

    pub fn features(&self) -> Features {
        self.profile.read().features
    }

    /// Copy of the simplified view used for serialization.
    pub fn simplified(&self) -> SimplifiedUser {
        self.profile.read().clone()
    }

    /// Replace nick and features in one step.
    pub(crate) fn update_profile(&self, profile: SimplifiedUser) {
        *self.profile.write() = profile;
    }

    /// Record an accepted message for flood control.
    pub fn record_message(&self, at: DateTime<Utc>) {
        *self.last_message.lock() = Some(at);
    }

    pub fn last_message(&self) -> Option<DateTime<Utc>> {
        *self.last_message.lock()
    }
}
