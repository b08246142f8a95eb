use chrono::{NaiveDateTime, Utc};

use crate::error::DBError;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct ParcelDao {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) location: String,
    pub(crate) area: f64,
    pub(crate) owner_id: i64,
    pub(crate) created_at: NaiveDateTime,
}

impl ParcelDao {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &String {
        &self.name
    }

    pub fn location(&self) -> &String {
        &self.location
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn owner_id(&self) -> i64 {
        self.owner_id
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }
}

pub async fn insert(
    conn: &sqlx::SqlitePool,
    name: &str,
    location: &str,
    area: f64,
    owner_id: i64,
) -> Result<ParcelDao, DBError> {
    Ok(sqlx::query_as::<_, ParcelDao>(
        "INSERT INTO parcels (name, location, area, owner_id, created_at) VALUES (?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(name)
    .bind(location)
    .bind(area)
    .bind(owner_id)
    .bind(Utc::now().naive_utc())
    .fetch_one(conn)
    .await?)
}

pub async fn count(conn: &sqlx::SqlitePool) -> Result<i64, DBError> {
    let record =
        sqlx::query_as::<_, super::CountRecord>("SELECT count(*) as count FROM parcels")
            .fetch_one(conn)
            .await?;
    Ok(record.count())
}

/// READ parcels
pub async fn read(conn: &sqlx::SqlitePool) -> Result<Vec<ParcelDao>, DBError> {
    Ok(sqlx::query_as::<_, ParcelDao>("SELECT * FROM parcels")
        .fetch_all(conn)
        .await?)
}

pub async fn get(conn: &sqlx::SqlitePool, parcel_id: i64) -> Result<Option<ParcelDao>, DBError> {
    Ok(
        sqlx::query_as::<_, ParcelDao>("SELECT * FROM parcels WHERE id = ?")
            .bind(parcel_id)
            .fetch_optional(conn)
            .await?,
    )
}

/// Removes the parcel with all sensors, readings and alerts below it
pub async fn delete(conn: &sqlx::SqlitePool, remove_id: i64) -> Result<(), DBError> {
    sqlx::query(
        "DELETE FROM sensor_data WHERE sensor_id IN (SELECT id FROM sensors WHERE parcel_id = ?)",
    )
    .bind(remove_id)
    .execute(conn)
    .await?;
    sqlx::query(
        "DELETE FROM alerts WHERE sensor_id IN (SELECT id FROM sensors WHERE parcel_id = ?)",
    )
    .bind(remove_id)
    .execute(conn)
    .await?;
    sqlx::query("DELETE FROM sensors WHERE parcel_id = ?")
        .bind(remove_id)
        .execute(conn)
        .await?;
    sqlx::query("DELETE FROM parcels WHERE id = ?")
        .bind(remove_id)
        .execute(conn)
        .await?;
    Ok(())
}
