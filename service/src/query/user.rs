//! [`Query`] collection looking up a single [`User`] of the marketplace.

use common::operations::By;

use crate::domain::{user, User};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Looks up a [`User`] by its [`user::Id`].
///
/// Resolves into [`None`] for an unknown [`user::Id`] rather than an error.
pub type ById = DatabaseQuery<By<Option<User>, user::Id>>;
