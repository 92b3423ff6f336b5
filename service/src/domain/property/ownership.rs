//! Ownership policy of [`Property`]s.

use crate::domain::user;

use super::Property;

/// Result of checking whether a [`User`] may manage a [`Property`].
///
/// [`User`]: crate::domain::User
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Access {
    /// [`User`] owns the [`Property`].
    ///
    /// [`User`]: crate::domain::User
    Allowed,

    /// [`User`] doesn't own the [`Property`].
    ///
    /// [`User`]: crate::domain::User
    Denied,
}

impl Access {
    /// Indicates whether this [`Access`] is [`Access::Allowed`].
    #[must_use]
    pub const fn allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Decides whether the [`User`] with the provided [`user::Id`] may see,
/// modify or delete the provided [`Property`].
///
/// Only the owner is allowed.
///
/// [`User`]: crate::domain::User
#[must_use]
pub fn authorize(user_id: user::Id, property: &Property) -> Access {
    if property.owner_id == user_id {
        Access::Allowed
    } else {
        Access::Denied
    }
}

impl Property {
    /// Returns [`Access`] of the [`User`] with the provided [`user::Id`] to
    /// this [`Property`].
    ///
    /// [`User`]: crate::domain::User
    #[must_use]
    pub fn access_for(&self, user_id: user::Id) -> Access {
        authorize(user_id, self)
    }
}
