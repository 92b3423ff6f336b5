//! In-memory [`Database`] implementation.

use std::sync::Arc;

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Update,
};
use dashmap::DashMap;
use tracerr::Traced;

use crate::{
    domain::{property, user, Property, User},
    infra::{database, Database},
    read::property::search,
};

/// In-memory [`Database`] for development and testing.
///
/// Clones share the same storage. Transactions are not isolated: every
/// write is visible immediately and [`Commit`] does nothing.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Stored [`User`]s.
    users: Arc<DashMap<user::Id, User>>,

    /// Stored [`Property`]s.
    properties: Arc<DashMap<property::Id, Property>>,
}

impl Memory {
    /// Creates a new empty [`Memory`] [`Database`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the stored [`Property`]s satisfying the provided `predicate`
    /// in their listing order.
    fn properties_where(
        &self,
        predicate: impl Fn(&Property) -> bool,
    ) -> Vec<Property> {
        let mut found = self
            .properties
            .iter()
            .filter(|p| predicate(p.value()))
            .map(|p| p.value().clone())
            .collect::<Vec<_>>();
        found.sort_by_key(|p| (p.created_at, p.id));
        found
    }
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.users.get(&by.into_inner()).map(|u| u.value().clone()))
    }
}

impl Database<Select<By<Option<User>, &user::Email>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        Ok(self
            .users
            .iter()
            .find(|u| u.email == *email)
            .map(|u| u.value().clone()))
    }
}

impl Database<Select<By<Vec<User>, ()>>> for Memory {
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<User>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut users = self
            .users
            .iter()
            .map(|u| u.value().clone())
            .collect::<Vec<_>>();
        users.sort_by_key(|u| (u.created_at, u.id));
        Ok(users)
    }
}

impl Database<Insert<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.users.insert(user.id, user);
        Ok(())
    }
}

impl Database<Select<By<Option<Property>, property::Id>>> for Memory {
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .properties
            .get(&by.into_inner())
            .map(|p| p.value().clone()))
    }
}

impl Database<Select<By<Vec<Property>, user::Id>>> for Memory {
    type Ok = Vec<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Property>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let owner_id = by.into_inner();
        Ok(self.properties_where(|p| p.access_for(owner_id).allowed()))
    }
}

impl Database<Select<By<Vec<Property>, search::Filter>>> for Memory {
    type Ok = Vec<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Property>, search::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        Ok(self.properties_where(|p| filter.matches(p)))
    }
}

impl Database<Insert<Property>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.properties.insert(property.id, property);
        Ok(())
    }
}

/// Changes the mutable attributes of an existing [`Property`].
///
/// Does nothing if the [`Property`] doesn't exist.
impl Database<Update<Property>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        if let Some(mut stored) = self.properties.get_mut(&property.id) {
            stored.location = property.location;
            stored.num_rooms = property.num_rooms;
            stored.price = property.price;
            stored.status = property.status;
        }
        Ok(())
    }
}

impl Database<Delete<By<Property, property::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.properties.remove(&by.into_inner());
        Ok(())
    }
}

impl Database<Lock<By<Property, property::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select, Update};

    use crate::{
        domain::{property, user, Property},
        fixture,
        infra::Database as _,
    };

    #[tokio::test]
    async fn update_ignores_unknown_property() {
        let svc = fixture::service();
        let ghost =
            fixture::new_property(user::Id::new(), "Downtown", 2, "150");

        svc.database().execute(Update(ghost.clone())).await.unwrap();

        let found = svc
            .database()
            .execute(Select(By::<Option<Property>, _>::new(ghost.id)))
            .await
            .unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn update_keeps_owner_and_creation_time() {
        let svc = fixture::service();
        let owner = fixture::user(&svc).await;
        let stored =
            fixture::property(&svc, owner.id, "Downtown", 2, "150").await;

        let mut changed =
            fixture::new_property(user::Id::new(), "Uptown", 4, "300");
        changed.id = stored.id;
        changed.status = property::Status::Sold;
        svc.database().execute(Update(changed)).await.unwrap();

        let found = svc
            .database()
            .execute(Select(By::<Option<Property>, _>::new(stored.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.owner_id, owner.id);
        assert_eq!(found.created_at, stored.created_at);
        assert_eq!(found.location.as_ref(), "Uptown");
        assert_eq!(found.num_rooms.get(), 4);
        assert_eq!(found.status, property::Status::Sold);
    }
}
