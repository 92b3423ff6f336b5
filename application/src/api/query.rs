//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, read::property::search, Query as _};

use crate::{api, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns all the `Property`s owned by the current `User`.
    ///
    /// The current `User` is identified by the `X-User-Id` header.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_USER` - the `X-User-Id` header is missing or malformed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myProperties",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_properties(
        ctx: &Context,
    ) -> Result<Vec<api::Property>, Error> {
        let my_id = ctx.current_user_id()?;

        ctx.service()
            .execute(query::properties::ByOwner::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ps| ps.into_iter().map(Into::into).collect())
    }

    /// Returns the `Property` with the specified ID.
    ///
    /// Any caller may view any `Property`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROPERTY_NOT_EXISTS` - the `Property` with the specified ID does
    ///                           not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "property",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn property(
        id: api::property::Id,
        ctx: &Context,
    ) -> Result<api::Property, Error> {
        ctx.service()
            .execute(query::property::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::PropertyError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Searches `Property`s matching all the provided criteria.
    ///
    /// Omitted criteria match everything. Results may lag behind changes for
    /// up to 5 minutes.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `VALIDATION_ERROR` - any of the criteria is malformed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "searchProperties",
            location = ?location,
            max_price = ?max_price,
            min_price = ?min_price,
            num_rooms = ?num_rooms,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn search_properties(
        location: Option<String>,
        num_rooms: Option<i32>,
        min_price: Option<api::scalar::Decimal>,
        max_price: Option<api::scalar::Decimal>,
        ctx: &Context,
    ) -> Result<Vec<api::Property>, Error> {
        ctx.service()
            .execute(query::SearchProperties(search::Criteria {
                location,
                num_rooms: num_rooms.map(Into::into),
                min_price: min_price.map(Into::into),
                max_price: max_price.map(Into::into),
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ps| ps.into_iter().map(Into::into).collect())
    }

    /// Returns the `User` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_USER` - the `User` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "user",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn user(
        id: api::user::Id,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        ctx.service()
            .execute(query::user::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns all the `User`s of the marketplace.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "users",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn users(ctx: &Context) -> Result<Vec<api::User>, Error> {
        ctx.service()
            .execute(query::users::All::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|us| us.into_iter().map(Into::into).collect())
    }
}

impl AsError for query::search::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Validation(e) => e.try_as_error(),
        }
    }
}
