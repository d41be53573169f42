//! Cluster member lookup used to annotate events.

use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use hzwire_core::codecs::Address;
use uuid::Uuid;

/// A cluster member, as far as events need to know it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    uuid: Uuid,
    address: Option<Address>,
    lite_member: bool,
}

impl Member {
    /// Creates a data member.
    pub fn new(uuid: Uuid, address: Option<Address>) -> Self {
        Self {
            uuid,
            address,
            lite_member: false,
        }
    }

    /// Marks the member as a lite member.
    pub fn lite(mut self) -> Self {
        self.lite_member = true;
        self
    }

    /// Returns the member's UUID.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Returns the member's address, if known.
    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    /// Returns `true` for members that hold no data.
    pub fn is_lite_member(&self) -> bool {
        self.lite_member
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.address {
            Some(address) => write!(f, "Member [{address}] - {}", self.uuid),
            None => write!(f, "Member - {}", self.uuid),
        }
    }
}

/// Resolves member uuids carried by events to member references.
pub trait MemberDirectory: Send + Sync {
    /// Returns the member with `uuid`, if it is known.
    fn resolve_member(&self, uuid: Uuid) -> Option<Member>;
}

/// A member directory backed by an in-memory table.
#[derive(Debug, Default)]
pub struct StaticMemberDirectory {
    members: RwLock<HashMap<Uuid, Member>>,
}

impl StaticMemberDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a member.
    pub fn add(&self, member: Member) {
        self.members
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(member.uuid(), member);
    }

    /// Removes a member, returning it if it was known.
    pub fn remove(&self, uuid: Uuid) -> Option<Member> {
        self.members
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&uuid)
    }

    /// Returns the number of known members.
    pub fn len(&self) -> usize {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no member is known.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MemberDirectory for StaticMemberDirectory {
    fn resolve_member(&self, uuid: Uuid) -> Option<Member> {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&uuid)
            .cloned()
    }
}
