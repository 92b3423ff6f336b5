//! [`Property`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{property, user, Property},
    infra::{
        database::{
            self,
            postgres::{Connection, LikePattern},
            Postgres,
        },
        Database,
    },
    read::property::search,
};

/// Builds a [`Property`] out of the provided [`Row`].
fn property_from_row(row: &Row) -> Property {
    Property {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        location: row.get("location"),
        num_rooms: property::NumRooms::new(row.get::<_, i32>("num_rooms"))
            .expect("`num_rooms` out of range"),
        price: row.get("price"),
        status: row.get("status"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Property>, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, owner_id, location, num_rooms, price, status, \
                   created_at \
            FROM properties \
            WHERE id = $1::UUID \
            LIMIT 1";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(property_from_row))
    }
}

impl<C> Database<Select<By<Vec<Property>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Property>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let owner_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, owner_id, location, num_rooms, price, status, \
                   created_at \
            FROM properties \
            WHERE owner_id = $1::UUID \
            ORDER BY created_at, id";
        Ok(self
            .query(SQL, &[&owner_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(property_from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Property>, search::Filter>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Property>, search::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let search::Filter {
            location,
            num_rooms,
            min_price,
            max_price,
        } = by.into_inner();

        let location = location.as_deref().map(LikePattern::containing);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];

        let location_idx = location.as_ref().map(|l| {
            ps.push(l);
            ps.len()
        });
        let num_rooms_idx = num_rooms.as_ref().map(|n| {
            ps.push(n);
            ps.len()
        });
        let min_price_idx = min_price.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });
        let max_price_idx = max_price.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });

        let sql = format!(
            "SELECT id, owner_id, location, num_rooms, price, status, \
                    created_at \
             FROM properties \
             WHERE true \
                   {location_filtering} \
                   {num_rooms_filtering} \
                   {min_price_filtering} \
                   {max_price_filtering} \
             ORDER BY created_at, id",
            location_filtering =
                location_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND location ILIKE ${idx}::VARCHAR"))
                }),
            num_rooms_filtering =
                num_rooms_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND num_rooms = ${idx}::INT8"))
                }),
            min_price_filtering =
                min_price_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND price >= ${idx}::NUMERIC"))
                }),
            max_price_filtering =
                max_price_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND price <= ${idx}::NUMERIC"))
                }),
        );
        Ok(self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(property_from_row)
            .collect())
    }
}

impl<C> Database<Insert<Property>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        let Property {
            id,
            owner_id,
            location,
            num_rooms,
            price,
            status,
            created_at,
        } = property;

        let num_rooms = i32::from(num_rooms.get());

        const SQL: &str = "\
            INSERT INTO properties (\
                id, owner_id, location, num_rooms, price, status, created_at\
            ) VALUES (\
                $1::UUID, $2::UUID, \
                $3::VARCHAR, $4::INT4, $5::NUMERIC, $6::INT2, \
                $7::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &owner_id,
                &location,
                &num_rooms,
                &price,
                &status,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

/// Changes the mutable attributes of an existing [`Property`].
///
/// Does nothing if the [`Property`] doesn't exist.
impl<C> Database<Update<Property>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        let Property {
            id,
            location,
            num_rooms,
            price,
            status,
            ..
        } = property;

        let num_rooms = i32::from(num_rooms.get());

        const SQL: &str = "\
            UPDATE properties \
            SET location = $2::VARCHAR, \
                num_rooms = $3::INT4, \
                price = $4::NUMERIC, \
                status = $5::INT2 \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id, &location, &num_rooms, &price, &status])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Property, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM properties \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Property, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM properties \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
