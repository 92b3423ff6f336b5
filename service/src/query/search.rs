//! [`Query`] for searching [`Property`]s.

use std::convert::Infallible;

use common::operations::{By, Insert, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{property, Property},
    infra::{database, Cache, Database},
    read::property::search,
    Service,
};

use super::Query;

/// [`Query`] for searching [`Property`]s matching the provided
/// [`search::Criteria`].
///
/// Results are memoized in the [`Cache`] of the [`Service`] by their
/// [`search::Filter`], so they may lag behind the [`Database`] for the time
/// to live of the [`Cache`].
#[derive(Clone, Debug, Default)]
pub struct SearchProperties(pub search::Criteria);

impl<Db, Ch> Query<SearchProperties> for Service<Db, Ch>
where
    Db: Database<
        Select<By<Vec<Property>, search::Filter>>,
        Ok = Vec<Property>,
        Err = Traced<database::Error>,
    >,
    Ch: Cache<
            Select<By<Option<Vec<Property>>, search::Filter>>,
            Ok = Option<Vec<Property>>,
            Err = Infallible,
        > + Cache<
            Insert<(search::Filter, Vec<Property>)>,
            Ok = (),
            Err = Infallible,
        >,
{
    type Ok = Vec<Property>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        SearchProperties(criteria): SearchProperties,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let filter = search::Filter::try_from(criteria)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        if filter.is_unsatisfiable() {
            return Ok(vec![]);
        }

        let cached = self
            .cache()
            .execute(Select(By::<Option<Vec<Property>>, _>::new(
                filter.clone(),
            )))
            .await
            .unwrap_or_else(|e| match e {});
        if let Some(found) = cached {
            log::debug!("`{filter:?}` search results are taken from cache");
            return Ok(found);
        }

        let found = self
            .database()
            .execute(Select(By::<Vec<Property>, _>::new(filter.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        self.cache()
            .execute(Insert((filter, found.clone())))
            .await
            .unwrap_or_else(|e| match e {});

        Ok(found)
    }
}

/// Error of [`SearchProperties`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Search criteria are malformed.
    #[display("Invalid search criteria: {_0}")]
    #[from]
    Validation(property::ValidationError),
}
