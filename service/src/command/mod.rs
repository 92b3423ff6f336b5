//! [`Command`] definition.

pub mod add_property;
pub mod create_user;
pub mod delete_property;
pub mod modify_property;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    add_property::AddProperty, create_user::CreateUser,
    delete_property::DeleteProperty, modify_property::ModifyProperty,
};
