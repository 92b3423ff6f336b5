//! GraphQL [`Mutation`]s definitions.

use juniper::graphql_object;
use service::{command, Command as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `User` of the marketplace.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EMAIL_OCCUPIED` - provided `UserEmail` is occupied by another
    ///                      `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "createUser",
            mobile = ?mobile,
            name = %name,
            otel.name = Self::SPAN_NAME,
            role = ?role,
        ),
    )]
    pub async fn create_user(
        name: api::user::Name,
        email: api::user::Email,
        mobile: Option<api::user::Mobile>,
        role: api::user::Role,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        ctx.service()
            .execute(command::CreateUser {
                name: name.into(),
                email: email.into(),
                mobile: mobile.map(Into::into),
                role: role.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Lists a new `Property` owned by the current `User`.
    ///
    /// All the `PropertyInput` attributes are required.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_USER` - the `X-User-Id` header is missing, malformed or
    ///                    refers to an unknown `User`;
    /// - `VALIDATION_ERROR` - any of the attributes is missing or malformed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "addProperty",
            otel.name = Self::SPAN_NAME,
            property = ?property,
        ),
    )]
    pub async fn add_property(
        property: api::property::Input,
        ctx: &Context,
    ) -> Result<api::Property, Error> {
        let my_id = ctx.current_user_id()?;

        ctx.service()
            .execute(command::AddProperty {
                owner_id: my_id.into(),
                fields: property.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Changes the provided attributes of a `Property` owned by the current
    /// `User`, leaving the omitted ones untouched.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_USER` - the `X-User-Id` header is missing or malformed;
    /// - `PROPERTY_NOT_EXISTS` - the `Property` with the specified ID does
    ///                           not exist;
    /// - `PERMISSION_DENIED` - the current `User` doesn't own the `Property`;
    /// - `VALIDATION_ERROR` - any of the provided attributes is malformed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "modifyProperty",
            id = %id,
            otel.name = Self::SPAN_NAME,
            property = ?property,
        ),
    )]
    pub async fn modify_property(
        id: api::property::Id,
        property: api::property::Input,
        ctx: &Context,
    ) -> Result<api::Property, Error> {
        let my_id = ctx.current_user_id()?;

        ctx.service()
            .execute(command::ModifyProperty {
                property_id: id.into(),
                initiator_id: my_id.into(),
                fields: property.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Permanently deletes a `Property` owned by the current `User`.
    ///
    /// Returns the deleted `Property`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_USER` - the `X-User-Id` header is missing or malformed;
    /// - `PROPERTY_NOT_EXISTS` - the `Property` with the specified ID does
    ///                           not exist;
    /// - `PERMISSION_DENIED` - the current `User` doesn't own the `Property`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteProperty",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_property(
        id: api::property::Id,
        ctx: &Context,
    ) -> Result<api::Property, Error> {
        let my_id = ctx.current_user_id()?;

        ctx.service()
            .execute(command::DeleteProperty {
                property_id: id.into(),
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "EMAIL_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`UserEmail` is occupied by another `User`"]
                EmailOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(Error::EmailOccupied.into()),
        }
    }
}

impl AsError for command::add_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(api::UserError::NotExists.into()),
            Self::Validation(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::modify_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NotOwner { .. } => Some(api::PropertyError::NotOwner.into()),
            Self::PropertyNotExists(_) => {
                Some(api::PropertyError::NotExists.into())
            }
            Self::Validation(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::delete_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NotOwner { .. } => Some(api::PropertyError::NotOwner.into()),
            Self::PropertyNotExists(_) => {
                Some(api::PropertyError::NotExists.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use service::{
        command::{add_property, delete_property, modify_property},
        domain::{
            property::{self, Field, ValidationError},
            user,
        },
    };

    use crate::AsError as _;

    #[test]
    fn maps_ownership_failures_to_forbidden() {
        let err = modify_property::ExecutionError::NotOwner {
            property_id: property::Id::new(),
            user_id: user::Id::new(),
        }
        .as_error();

        assert_eq!(err.code, "PERMISSION_DENIED");
        assert_eq!(err.status_code, http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn maps_missing_property_to_not_found() {
        let err = delete_property::ExecutionError::PropertyNotExists(
            property::Id::new(),
        )
        .as_error();

        assert_eq!(err.code, "PROPERTY_NOT_EXISTS");
        assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn maps_unknown_owner_to_invalid_user() {
        let err =
            add_property::ExecutionError::UserNotExists(user::Id::new())
                .as_error();

        assert_eq!(err.code, "INVALID_USER");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn keeps_validation_message() {
        let err = add_property::ExecutionError::Validation(
            ValidationError::Invalid {
                field: Field::NumRooms,
                reason: "must be positive".into(),
            },
        )
        .as_error();

        assert_eq!(err.code, "VALIDATION_ERROR");
        assert_eq!(err.message, "`num_rooms` is invalid: must be positive");
    }
}
