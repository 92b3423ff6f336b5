//! [`Command`] for deleting a [`Property`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{property, user, Property},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for permanently deleting a [`Property`] by its owner.
#[derive(Clone, Copy, Debug)]
pub struct DeleteProperty {
    /// ID of the [`Property`] to be deleted.
    pub property_id: property::Id,

    /// ID of the [`User`] who deletes the [`Property`].
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,
}

impl<Db, Ch> Command<DeleteProperty> for Service<Db, Ch>
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
        > + Database<
            Delete<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    /// Deleted [`Property`].
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteProperty {
            property_id,
            initiator_id,
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

        let property = tx
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Delete(By::new(property_id)))
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

/// Error of [`DeleteProperty`] [`Command`] execution.
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
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{property, user},
        fixture, query,
    };

    use super::{Command as _, DeleteProperty, ExecutionError};

    #[tokio::test]
    async fn deletes_permanently() {
        let svc = fixture::service();
        let owner = fixture::user(&svc).await;
        let kept = fixture::property(&svc, owner.id, "Uptown", 3, "300").await;
        let doomed =
            fixture::property(&svc, owner.id, "Downtown", 2, "150").await;

        let deleted = svc
            .execute(DeleteProperty {
                property_id: doomed.id,
                initiator_id: owner.id,
            })
            .await
            .unwrap();
        assert_eq!(deleted, doomed);

        let stored = svc
            .execute(query::property::ById::by(doomed.id))
            .await
            .unwrap();
        assert_eq!(stored, None);
        let listed = svc
            .execute(query::properties::ByOwner::by(owner.id))
            .await
            .unwrap();
        assert_eq!(listed, vec![kept]);
    }

    #[tokio::test]
    async fn second_deletion_reports_missing_property() {
        let svc = fixture::service();
        let owner = fixture::user(&svc).await;
        let doomed =
            fixture::property(&svc, owner.id, "Downtown", 2, "150").await;
        let cmd = DeleteProperty {
            property_id: doomed.id,
            initiator_id: owner.id,
        };

        _ = svc.execute(cmd).await.unwrap();
        let err = svc.execute(cmd).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::PropertyNotExists(id) if *id == doomed.id,
        ));
    }

    #[tokio::test]
    async fn denies_non_owner() {
        let svc = fixture::service();
        let owner = fixture::user(&svc).await;
        let property =
            fixture::property(&svc, owner.id, "Downtown", 2, "150").await;

        let err = svc
            .execute(DeleteProperty {
                property_id: property.id,
                initiator_id: user::Id::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotOwner { .. }));
        let stored = svc
            .execute(query::property::ById::by(property.id))
            .await
            .unwrap();
        assert_eq!(stored, Some(property));
    }

    #[tokio::test]
    async fn reports_missing_property() {
        let svc = fixture::service();
        let missing = property::Id::new();

        let err = svc
            .execute(DeleteProperty {
                property_id: missing,
                initiator_id: user::Id::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::PropertyNotExists(id) if *id == missing,
        ));
    }
}
