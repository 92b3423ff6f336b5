//! [`EvictExpiredSearchResults`] [`Task`].

use std::{convert::Infallible, time};

use common::operations::{By, Delete, Perform, Start};
use smart_default::SmartDefault;
use tokio::time::interval;
use tracing as log;

use crate::{
    infra::{cache::Expired, Cache},
    Service,
};

use super::Task;

/// Configuration for [`EvictExpiredSearchResults`] [`Task`].
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// Interval between evictions.
    #[default(time::Duration::from_secs(60))]
    pub interval: time::Duration,
}

/// [`Task`] for evicting expired [`Property`] search results from the
/// [`Cache`].
///
/// [`Property`]: crate::domain::Property
#[derive(Clone, Copy, Debug)]
pub struct EvictExpiredSearchResults<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, Ch> Task<Start<By<EvictExpiredSearchResults<Self>, Config>>>
    for Service<Db, Ch>
where
    EvictExpiredSearchResults<Self>:
        Task<Perform<()>, Ok = (), Err = Infallible> + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<EvictExpiredSearchResults<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = EvictExpiredSearchResults {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            task.execute(Perform(()))
                .await
                .unwrap_or_else(|e| match e {});
        }
    }
}

impl<Db, Ch> Task<Perform<()>> for EvictExpiredSearchResults<Service<Db, Ch>>
where
    Ch: Cache<Delete<Expired>, Ok = usize, Err = Infallible>,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let evicted = self.service.cache().execute(Delete(Expired)).await?;
        if evicted > 0 {
            log::debug!("evicted {evicted} expired search results");
        }
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::operations::{Insert, Perform};

    use crate::{
        domain::Property,
        infra::{cache::InMemory, Memory},
        read::property::search,
        Config, Service,
    };

    use super::{EvictExpiredSearchResults, Task as _};

    #[tokio::test]
    async fn evicts_expired_entries() {
        let cache =
            InMemory::<search::Filter, Vec<Property>>::new(Duration::ZERO);
        let (service, _bg) =
            Service::new(Config::default(), Memory::new(), cache.clone());
        cache
            .execute(Insert((search::Filter::default(), vec![])))
            .await
            .unwrap();
        assert_eq!(cache.len(), 1);

        let task = EvictExpiredSearchResults {
            config: super::Config::default(),
            service,
        };
        task.execute(Perform(())).await.unwrap();

        assert!(cache.is_empty());
    }
}
