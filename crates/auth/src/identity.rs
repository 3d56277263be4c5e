use std::collections::{BTreeMap, BTreeSet};

use crate::Role;

/// Attribute holding the caller's supply-chain role.
pub const ROLE_ATTRIBUTE: &str = "role";

/// Attribute holding the participant id the caller acts as.
pub const PARTICIPANT_ID_ATTRIBUTE: &str = "id";

/// Identity of the caller of a ledger operation.
///
/// Identities are issued outside this crate. The administrator flag is an
/// explicit field rather than something parsed out of the subject string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    subject: String,
    attributes: BTreeMap<String, String>,
    admin: bool,
}

impl Identity {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            attributes: BTreeMap::new(),
            admin: false,
        }
    }

    pub fn administrator(subject: impl Into<String>) -> Self {
        Self {
            admin: true,
            ..Self::new(subject)
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_role(self, role: Role) -> Self {
        self.with_attribute(ROLE_ATTRIBUTE, role.as_str())
    }

    pub fn with_participant_id(self, id: impl Into<String>) -> Self {
        self.with_attribute(PARTICIPANT_ID_ATTRIBUTE, id)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Role attribute, if present and one of the known roles.
    pub fn role(&self) -> Option<Role> {
        self.attribute(ROLE_ATTRIBUTE).and_then(|r| r.parse().ok())
    }

    /// Participant id the caller acts as (the `id` attribute, else the subject).
    pub fn participant_id(&self) -> &str {
        self.attribute(PARTICIPANT_ID_ATTRIBUTE)
            .unwrap_or(self.subject.as_str())
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    pub fn is_farmer(&self) -> bool {
        self.role() == Some(Role::Farmer)
    }

    pub fn is_shipper(&self) -> bool {
        self.role() == Some(Role::Shipper)
    }

    pub fn is_distributor(&self) -> bool {
        self.role() == Some(Role::Distributor)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role() == Some(role)
    }
}

/// Builds identities for raw subjects handed over by the host.
///
/// A subject is an administrator iff it is listed in the configured set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityResolver {
    admin_subjects: BTreeSet<String>,
}

impl IdentityResolver {
    pub fn new<I, S>(admin_subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            admin_subjects: admin_subjects.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_admin_subject(&self, subject: &str) -> bool {
        self.admin_subjects.contains(subject)
    }

    pub fn resolve<I, K, V>(&self, subject: &str, attributes: I) -> Identity
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut identity = Identity::new(subject);
        identity.admin = self.is_admin_subject(subject);
        for (name, value) in attributes {
            identity.set_attribute(name, value);
        }
        identity
    }
}
