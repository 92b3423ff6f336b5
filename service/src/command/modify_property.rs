//! [`Command`] for modifying an existing [`Property`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{property, user, Property},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for partially updating a [`Property`] by its owner.
#[derive(Clone, Debug)]
pub struct ModifyProperty {
    /// ID of the [`Property`] to be modified.
    pub property_id: property::Id,

    /// ID of the [`User`] who modifies the [`Property`].
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,

    /// Raw attributes to be changed.
    ///
    /// Absent ones are left untouched.
    pub fields: property::Fields,
}

impl<Db, Ch> Command<ModifyProperty> for Service<Db, Ch>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Update<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ModifyProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ModifyProperty {
            property_id,
            initiator_id,
            fields,
        } = cmd;

        let property = self
            .database()
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;
        if !property.access_for(initiator_id).allowed() {
            return Err(tracerr::new!(E::NotOwner {
                property_id,
                user_id: initiator_id,
            }));
        }

        let patch = property::Patch::try_from(fields)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent modifications and deletions.
        tx.execute(Lock(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut property = tx
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;

        patch.apply_to(&mut property);

        tx.execute(Update(property.clone()))
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

/// Error of [`ModifyProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] doesn't own the [`Property`].
    ///
    /// [`User`]: crate::domain::User
    #[display(
        "`User(id: {user_id})` is not the owner of \
         `Property(id: {property_id})`"
    )]
    NotOwner {
        /// ID of the [`Property`].
        property_id: property::Id,

        /// ID of the [`User`].
        ///
        /// [`User`]: crate::domain::User
        user_id: user::Id,
    },

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// Provided [`Property`] attributes are malformed.
    #[display("Invalid `Property`: {_0}")]
    #[from]
    Validation(property::ValidationError),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{
            property::{self, Field, Status, ValidationError},
            user,
        },
        fixture, query,
    };

    use super::{Command as _, ExecutionError, ModifyProperty};

    #[tokio::test]
    async fn changes_only_supplied_fields() {
        let svc = fixture::service();
        let owner = fixture::user(&svc).await;
        let before =
            fixture::property(&svc, owner.id, "Downtown", 2, "150").await;

        let after = svc
            .execute(ModifyProperty {
                property_id: before.id,
                initiator_id: owner.id,
                fields: property::Fields {
                    price: Some("175".into()),
                    ..property::Fields::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(after.price, "175".parse().unwrap());
        assert_eq!(after.id, before.id);
        assert_eq!(after.owner_id, before.owner_id);
        assert_eq!(after.location, before.location);
        assert_eq!(after.num_rooms, before.num_rooms);
        assert_eq!(after.status, before.status);
        assert_eq!(after.created_at, before.created_at);

        let stored = svc
            .execute(query::property::ById::by(before.id))
            .await
            .unwrap();
        assert_eq!(stored, Some(after));
    }

    #[tokio::test]
    async fn changes_status() {
        let svc = fixture::service();
        let owner = fixture::user(&svc).await;
        let before =
            fixture::property(&svc, owner.id, "Downtown", 2, "150").await;

        let after = svc
            .execute(ModifyProperty {
                property_id: before.id,
                initiator_id: owner.id,
                fields: property::Fields {
                    status: Some("SOLD".into()),
                    ..property::Fields::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(after.status, Status::Sold);
        assert_eq!(after.price, before.price);
    }

    #[tokio::test]
    async fn empty_fields_change_nothing() {
        let svc = fixture::service();
        let owner = fixture::user(&svc).await;
        let before =
            fixture::property(&svc, owner.id, "Downtown", 2, "150").await;

        let after = svc
            .execute(ModifyProperty {
                property_id: before.id,
                initiator_id: owner.id,
                fields: property::Fields::default(),
            })
            .await
            .unwrap();

        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn denies_non_owner() {
        let svc = fixture::service();
        let owner = fixture::user(&svc).await;
        let stranger = fixture::user(&svc).await;
        let before =
            fixture::property(&svc, owner.id, "Downtown", 2, "150").await;

        let err = svc
            .execute(ModifyProperty {
                property_id: before.id,
                initiator_id: stranger.id,
                fields: property::Fields {
                    price: Some("1".into()),
                    ..property::Fields::default()
                },
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::NotOwner { property_id, user_id }
                if *property_id == before.id && *user_id == stranger.id,
        ));
        let stored = svc
            .execute(query::property::ById::by(before.id))
            .await
            .unwrap();
        assert_eq!(stored, Some(before));
    }

    #[tokio::test]
    async fn reports_missing_property_before_ownership() {
        let svc = fixture::service();
        let missing = property::Id::new();

        let err = svc
            .execute(ModifyProperty {
                property_id: missing,
                initiator_id: user::Id::new(),
                fields: property::Fields::default(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::PropertyNotExists(id) if *id == missing,
        ));
    }

    #[tokio::test]
    async fn checks_ownership_before_validation() {
        let svc = fixture::service();
        let owner = fixture::user(&svc).await;
        let before =
            fixture::property(&svc, owner.id, "Downtown", 2, "150").await;

        let err = svc
            .execute(ModifyProperty {
                property_id: before.id,
                initiator_id: user::Id::new(),
                fields: property::Fields {
                    num_rooms: Some(-1),
                    ..property::Fields::default()
                },
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotOwner { .. }));
    }

    #[tokio::test]
    async fn rejects_malformed_fields() {
        let svc = fixture::service();
        let owner = fixture::user(&svc).await;
        let before =
            fixture::property(&svc, owner.id, "Downtown", 2, "150").await;

        let err = svc
            .execute(ModifyProperty {
                property_id: before.id,
                initiator_id: owner.id,
                fields: property::Fields {
                    location: Some("Uptown".into()),
                    price: Some("-10".into()),
                    ..property::Fields::default()
                },
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::Validation(ValidationError::Invalid {
                field: Field::Price,
                ..
            }),
        ));
        let stored = svc
            .execute(query::property::ById::by(before.id))
            .await
            .unwrap();
        assert_eq!(stored, Some(before));
    }
}
