//! [`Property`]-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{
    graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLScalar,
};
use service::domain;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A [`Property`] listed on the marketplace.
#[derive(Clone, Debug, From, Into)]
pub struct Property(domain::Property);

/// A property listed on the marketplace.
#[graphql_object(context = Context)]
impl Property {
    /// Unique identifier of this `Property`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// `User` owning this `Property`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.owner",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn owner(&self) -> api::User {
        #[expect(
            unsafe_code,
            reason = "`Property` loaded from repository guarantees its owner \
                      existence"
        )]
        unsafe {
            api::User::new_unchecked(self.0.owner_id)
        }
    }

    /// Free-form location of this `Property`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.location",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn location(&self) -> &str {
        self.0.location.as_ref()
    }

    /// Number of rooms in this `Property`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.numRooms",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn num_rooms(&self) -> i32 {
        self.0.num_rooms.get().into()
    }

    /// Asking price of this `Property`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.price",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn price(&self) -> scalar::Decimal {
        self.0.price.to_string().into()
    }

    /// Listing status of this `Property`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// `DateTime` when this `Property` was listed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Property.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `Property`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::property::Id)]
#[into(domain::property::Id)]
#[graphql(name = "PropertyId", transparent)]
pub struct Id(Uuid);

/// Listing status of a `Property`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "PropertyStatus")]
pub enum Status {
    /// Open for offers.
    Available,

    /// Sold to a buyer.
    Sold,

    /// Deal is in progress.
    Pending,
}

impl From<domain::property::Status> for Status {
    fn from(status: domain::property::Status) -> Self {
        use domain::property::Status as S;
        match status {
            S::Available => Self::Available,
            S::Sold => Self::Sold,
            S::Pending => Self::Pending,
        }
    }
}

/// Attributes of a `Property` to be set.
///
/// Validated by the service, so every malformed or missing attribute is
/// reported as a `VALIDATION_ERROR`.
#[derive(Clone, Debug, Default, GraphQLInputObject)]
#[graphql(name = "PropertyInput")]
pub struct Input {
    /// Free-form location of the `Property`.
    pub location: Option<String>,

    /// Number of rooms in the `Property`.
    pub num_rooms: Option<i32>,

    /// Asking price of the `Property`.
    pub price: Option<scalar::Decimal>,

    /// Listing status of the `Property`: `AVAILABLE`, `SOLD` or `PENDING`.
    pub status: Option<String>,
}

impl From<Input> for domain::property::Fields {
    fn from(input: Input) -> Self {
        let Input {
            location,
            num_rooms,
            price,
            status,
        } = input;
        Self {
            location,
            num_rooms: num_rooms.map(Into::into),
            price: price.map(Into::into),
            status,
        }
    }
}

impl AsError for domain::property::ValidationError {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "VALIDATION_ERROR",
            status_code: http::StatusCode::BAD_REQUEST,
            message: self.to_string(),
            backtrace: None,
        })
    }
}
