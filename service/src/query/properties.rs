//! [`Query`] collection related to multiple [`Property`]s.

use common::operations::By;

use crate::domain::{user, Property};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Property`]s owned by the [`User`] with the provided
/// [`user::Id`].
///
/// Unknown [`User`]s own nothing, so get an empty list.
///
/// [`User`]: crate::domain::User
pub type ByOwner = DatabaseQuery<By<Vec<Property>, user::Id>>;

#[cfg(test)]
mod spec {
    use crate::{domain::user, fixture, Query as _};

    use super::ByOwner;

    #[tokio::test]
    async fn lists_only_own_properties() {
        let svc = fixture::service();
        let alice = fixture::user(&svc).await;
        let bob = fixture::user(&svc).await;
        let a1 = fixture::property(&svc, alice.id, "Downtown", 2, "150").await;
        let b1 = fixture::property(&svc, bob.id, "Uptown", 3, "300").await;
        let a2 = fixture::property(&svc, alice.id, "Midtown", 1, "90").await;

        let alices = svc.execute(ByOwner::by(alice.id)).await.unwrap();
        assert_eq!(alices, vec![a1, a2]);

        let bobs = svc.execute(ByOwner::by(bob.id)).await.unwrap();
        assert_eq!(bobs, vec![b1]);

        let strangers =
            svc.execute(ByOwner::by(user::Id::new())).await.unwrap();
        assert!(strangers.is_empty());
    }
}
