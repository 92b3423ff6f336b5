//! [`Command`] for adding a new [`Property`].

use common::operations::{By, Commit, Insert, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{property, user, Property, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for adding a new [`Property`] on behalf of its owner.
#[derive(Clone, Debug)]
pub struct AddProperty {
    /// ID of the [`User`] owning the new [`Property`].
    pub owner_id: user::Id,

    /// Raw attributes of the new [`Property`].
    ///
    /// All of them are required.
    pub fields: property::Fields,
}

impl<Db, Ch> Command<AddProperty> for Service<Db, Ch>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AddProperty) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AddProperty { owner_id, fields } = cmd;

        let owner = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(owner_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(owner_id))
            .map_err(tracerr::wrap!())?;

        let property = property::Patch::try_from(fields)
            .and_then(|patch| patch.into_property(owner.id))
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(property)
    }
}

/// Error of [`AddProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),

    /// Provided [`Property`] attributes are malformed or incomplete.
    #[display("Invalid `Property`: {_0}")]
    #[from]
    Validation(property::ValidationError),
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use crate::{
        domain::{
            property::{self, Field, Status, ValidationError},
            user,
        },
        fixture, query,
    };

    use super::{AddProperty, Command as _, ExecutionError};

    fn fields() -> property::Fields {
        property::Fields {
            location: Some("Downtown".into()),
            num_rooms: Some(3),
            price: Some("150.50".into()),
            status: Some("AVAILABLE".into()),
        }
    }

    #[tokio::test]
    async fn adds_property_owned_by_caller() {
        let svc = fixture::service();
        let owner = fixture::user(&svc).await;

        let added = svc
            .execute(AddProperty {
                owner_id: owner.id,
                fields: fields(),
            })
            .await
            .unwrap();

        assert_eq!(added.owner_id, owner.id);
        assert_eq!(added.location.as_ref(), "Downtown");
        assert_eq!(added.num_rooms.get(), 3);
        assert_eq!(added.price.amount(), Decimal::new(15050, 2));
        assert_eq!(added.status, Status::Available);

        let listed = svc
            .execute(query::properties::ByOwner::by(owner.id))
            .await
            .unwrap();
        assert_eq!(listed, vec![added]);
    }

    #[tokio::test]
    async fn generates_new_ids() {
        let svc = fixture::service();
        let owner = fixture::user(&svc).await;

        let first = svc
            .execute(AddProperty {
                owner_id: owner.id,
                fields: fields(),
            })
            .await
            .unwrap();
        let second = svc
            .execute(AddProperty {
                owner_id: owner.id,
                fields: fields(),
            })
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn rejects_unknown_owner() {
        let svc = fixture::service();
        let stranger = user::Id::new();

        let err = svc
            .execute(AddProperty {
                owner_id: stranger,
                fields: fields(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::UserNotExists(id) if *id == stranger,
        ));
    }

    #[tokio::test]
    async fn rejects_missing_fields() {
        let svc = fixture::service();
        let owner = fixture::user(&svc).await;

        let err = svc
            .execute(AddProperty {
                owner_id: owner.id,
                fields: property::Fields {
                    price: None,
                    ..fields()
                },
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Validation(ValidationError::Missing(Field::Price)),
        ));
        let listed = svc
            .execute(query::properties::ByOwner::by(owner.id))
            .await
            .unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn rejects_malformed_fields() {
        let svc = fixture::service();
        let owner = fixture::user(&svc).await;

        let err = svc
            .execute(AddProperty {
                owner_id: owner.id,
                fields: property::Fields {
                    status: Some("RENTED".into()),
                    ..fields()
                },
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Validation(ValidationError::Invalid {
                field: Field::Status,
                ..
            }),
        ));
    }
}
