use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};

#[derive(
    EnumString,
    VariantArray,
    Display,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
)]
pub enum Role {
    #[default]
    Student,
    Teacher,
}

/// Verified caller as vouched for by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub email: String,
}

impl Identity {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}

/// Resolves the [`Role`] of an identity from an allow-list of teacher emails.
///
/// Matching is exact and case-sensitive. An empty list means nobody may author.
#[derive(Clone, Debug, Default)]
pub struct TeacherPolicy {
    emails: Arc<[String]>,
}

impl TeacherPolicy {
    pub fn new(emails: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            emails: emails.into_iter().map(Into::into).collect(),
        }
    }

    pub fn role(&self, identity: &Identity) -> Role {
        if self.emails.iter().any(|email| email == &identity.email) {
            Role::Teacher
        } else {
            Role::Student
        }
    }

    pub fn is_teacher(&self, identity: &Identity) -> bool {
        self.role(identity) == Role::Teacher
    }

    pub fn assert_teacher(&self, identity: &Identity) -> crate::Result<()> {
        if self.is_teacher(identity) {
            return Ok(());
        }

        tracing::warn!(
            user_id = %identity.id,
            "authoring attempt rejected by teacher policy"
        );

        Err(crate::Error::Forbidden)
    }
}
