//! Fixtures for testing the [`Service`] against in-memory infrastructure.

use std::{thread, time::Duration};

use common::{operations::Insert, DateTime};

use crate::{
    domain::{property, user, Property, User},
    infra::{cache::InMemory, Database as _, Memory},
    read::property::search,
    Config, Service,
};

/// [`Service`] backed by in-memory infrastructure.
pub(crate) type TestService =
    Service<Memory, InMemory<search::Filter, Vec<Property>>>;

/// Creates a new [`TestService`] caching search results for 5 minutes.
pub(crate) fn service() -> TestService {
    service_with_ttl(Duration::from_secs(300))
}

/// Creates a new [`TestService`] caching search results for the provided
/// `ttl`.
pub(crate) fn service_with_ttl(ttl: Duration) -> TestService {
    let (svc, _) =
        Service::new(Config::default(), Memory::new(), InMemory::new(ttl));
    svc
}

/// Stores a new [`User`] with a unique [`user::Email`].
pub(crate) async fn user(svc: &TestService) -> User {
    let id = user::Id::new();
    let user = User {
        id,
        name: user::Name::new("Jane Doe").unwrap(),
        email: user::Email::new(format!("{id}@example.com")).unwrap(),
        mobile: None,
        role: user::Role::Owner,
        created_at: DateTime::now().coerce(),
    };
    svc.database().execute(Insert(user.clone())).await.unwrap();
    user
}

/// Creates a new [`Property`] without storing it.
///
/// Every call yields a strictly later [`Property::created_at`], so listing
/// order is predictable.
pub(crate) fn new_property(
    owner_id: user::Id,
    location: &str,
    num_rooms: u16,
    price: &str,
) -> Property {
    thread::sleep(Duration::from_micros(10));
    Property {
        id: property::Id::new(),
        owner_id,
        location: property::Location::new(location).unwrap(),
        num_rooms: property::NumRooms::new(num_rooms).unwrap(),
        price: price.parse().unwrap(),
        status: property::Status::Available,
        created_at: DateTime::now().coerce(),
    }
}

/// Stores a new [`Property`].
pub(crate) async fn property(
    svc: &TestService,
    owner_id: user::Id,
    location: &str,
    num_rooms: u16,
    price: &str,
) -> Property {
    let property = new_property(owner_id, location, num_rooms, price);
    svc.database()
        .execute(Insert(property.clone()))
        .await
        .unwrap();
    property
}
