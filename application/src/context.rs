//! [`Context`]-related definitions.

use std::sync::atomic::{self, AtomicU16};

use axum::{async_trait, extract::FromRequestParts};
use axum_extra::headers::{self, Header, HeaderMapExt as _};
use http::{HeaderName, HeaderValue};
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    IntoFieldError as _,
};
use tracing as log;
use uuid::Uuid;

#[cfg(doc)]
use crate::api::User;
use crate::{api, Error, JuniperResponse, Service};

/// Application context.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// Error status code.
    error_status_code: AtomicU16,

    /// Parts of the HTTP request.
    parts: http::request::Parts,
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the error status code of this [`Context`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn error_status_code(&self) -> http::StatusCode {
        http::StatusCode::from_u16(
            self.error_status_code.load(atomic::Ordering::Relaxed),
        )
        .expect("invalid status code")
    }

    /// Sets the error status code for this [`Context`].
    ///
    /// Provided [`http::StatusCode`] will be applied to the response.
    pub fn set_error_status_code(&self, status_code: http::StatusCode) {
        self.error_status_code
            .store(status_code.as_u16(), atomic::Ordering::Relaxed);
    }

    /// Helper method calling [`Context::set_error_status_code()`] inside
    /// [`Result::map_err()`] closure.
    pub fn error(&self) -> impl FnOnce(Error) -> Error + '_ {
        move |err| {
            self.set_error_status_code(err.status_code);
            err
        }
    }

    /// Returns ID of the [`User`] performing the current request.
    ///
    /// The ID is taken from the [`UserIdHeader`] as is, so the [`User`] may
    /// not exist.
    ///
    /// # Errors
    ///
    /// Errors if the [`UserIdHeader`] is missing or malformed.
    pub fn current_user_id(&self) -> Result<api::user::Id, Error> {
        match self.parts.headers.typed_try_get::<UserIdHeader>() {
            Ok(Some(UserIdHeader(id))) => Ok(id.into()),
            Ok(None) => Err(api::UserError::Missing.into()),
            Err(_) => Err(api::UserError::Malformed.into()),
        }
        .map_err(self.error())
    }
}

impl juniper::Context for Context {}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = JuniperResponse;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service =
            parts.extensions.get::<Service>().cloned().ok_or_else(|| {
                log::error!("missing `Service` extension");
                JuniperResponse {
                    status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
                    response: GraphQLBatchResponse::Single(
                        GraphQLResponse::error(
                            Error::internal().into_field_error(),
                        ),
                    ),
                }
            })?;

        Ok(Self {
            service,
            error_status_code: AtomicU16::new(
                http::StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            ),
            parts: parts.clone(),
        })
    }
}

/// Name of the [`UserIdHeader`].
pub static USER_ID_HEADER_NAME: HeaderName =
    HeaderName::from_static("x-user-id");

/// `X-User-Id` HTTP header identifying the [`User`] performing a request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UserIdHeader(pub Uuid);

impl Header for UserIdHeader {
    fn name() -> &'static HeaderName {
        &USER_ID_HEADER_NAME
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        values
            .next()
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok())
            .map(Self)
            .ok_or_else(headers::Error::invalid)
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        values.extend(HeaderValue::from_str(&self.0.to_string()).ok());
    }
}

#[cfg(test)]
mod spec {
    use axum_extra::headers::HeaderMapExt as _;
    use http::{HeaderMap, HeaderValue};
    use uuid::Uuid;

    use super::{UserIdHeader, USER_ID_HEADER_NAME};

    fn headers(value: &'static str) -> HeaderMap {
        let mut map = HeaderMap::new();
        drop(
            map.insert(
                USER_ID_HEADER_NAME.clone(),
                HeaderValue::from_static(value),
            ),
        );
        map
    }

    #[test]
    fn parses_user_id() {
        let id = Uuid::new_v4();
        let mut map = HeaderMap::new();
        map.typed_insert(UserIdHeader(id));

        assert_eq!(
            map.typed_try_get::<UserIdHeader>().unwrap(),
            Some(UserIdHeader(id)),
        );
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let map = headers(" 67e55044-10b1-426f-9247-bb680e5fe0c8 ");

        assert_eq!(
            map.typed_try_get::<UserIdHeader>().unwrap(),
            Some(UserIdHeader(
                "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap(),
            )),
        );
    }

    #[test]
    fn reports_missing_header() {
        let map = HeaderMap::new();

        assert_eq!(map.typed_try_get::<UserIdHeader>().unwrap(), None);
    }

    #[test]
    fn rejects_malformed_header() {
        for value in ["", "42", "not-a-uuid"] {
            let map = headers(value);

            assert!(map.typed_try_get::<UserIdHeader>().is_err(), "{value}");
        }
    }
}
