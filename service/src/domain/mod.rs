//! Domain definitions.

pub mod property;
pub mod user;

pub use self::{property::Property, user::User};
