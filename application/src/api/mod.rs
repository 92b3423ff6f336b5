//! GraphQL API definitions.

mod mutation;
pub mod property;
mod query;
pub mod scalar;
pub mod user;

use juniper::{EmptySubscription, RootNode};

use crate::{define_error, Context};

pub use self::{
    mutation::Mutation, property::Property, query::Query, user::User,
};

/// GraphQL schema.
pub type Schema =
    RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

/// Creates a new GraphQL [`Schema`].
#[must_use]
pub fn schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}

define_error! {
    enum UserError {
        #[code = "INVALID_USER"]
        #[status = BAD_REQUEST]
        #[message = "`X-User-Id` header with `User` ID is required"]
        Missing,

        #[code = "INVALID_USER"]
        #[status = BAD_REQUEST]
        #[message = "`X-User-Id` header must contain a valid `User` ID"]
        Malformed,

        #[code = "INVALID_USER"]
        #[status = BAD_REQUEST]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum PropertyError {
        #[code = "PROPERTY_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Property` with the specified ID does not exist"]
        NotExists,

        #[code = "PERMISSION_DENIED"]
        #[status = FORBIDDEN]
        #[message = "Only the owner of the `Property` may change it"]
        NotOwner,
    }
}

#[cfg(test)]
mod spec {
    use super::schema;

    #[test]
    fn schema_exposes_operations() {
        let schema = schema();

        for (ty, fields) in [
            (
                "Query",
                &[
                    "myProperties",
                    "property",
                    "searchProperties",
                    "user",
                    "users",
                ][..],
            ),
            (
                "Mutation",
                &[
                    "addProperty",
                    "modifyProperty",
                    "deleteProperty",
                    "createUser",
                ][..],
            ),
        ] {
            let meta = schema
                .schema
                .concrete_type_by_name(ty)
                .unwrap_or_else(|| panic!("missing `{ty}` type"));
            for field in fields {
                assert!(
                    meta.field_by_name(field).is_some(),
                    "missing `{ty}.{field}` field",
                );
            }
        }
    }
}
