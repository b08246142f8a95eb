use crate::error::DBError;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct SensorDao {
    pub(crate) id: i64,
    pub(crate) id_code: String,
    pub(crate) parcel_id: i64,
    pub(crate) sensor_type: String,
    pub(crate) unit: String,
    pub(crate) description: String,
    pub(crate) threshold_low: f64,
    pub(crate) threshold_high: f64,
    pub(crate) active: bool,
}

impl SensorDao {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn id_code(&self) -> &String {
        &self.id_code
    }

    pub fn parcel_id(&self) -> i64 {
        self.parcel_id
    }

    pub fn sensor_type(&self) -> &String {
        &self.sensor_type
    }

    pub fn unit(&self) -> &String {
        &self.unit
    }

    pub fn description(&self) -> &String {
        &self.description
    }

    pub fn threshold_low(&self) -> f64 {
        self.threshold_low
    }

    pub fn threshold_high(&self) -> f64 {
        self.threshold_high
    }

    pub fn active(&self) -> bool {
        self.active
    }
}

pub struct NewSensor {
    pub id_code: String,
    pub parcel_id: i64,
    pub sensor_type: String,
    pub unit: Option<String>,
    pub description: String,
    pub threshold_low: f64,
    pub threshold_high: f64,
}

/// Measurement unit a sensor type commonly reports in
pub fn default_unit(sensor_type: &str) -> &'static str {
    if sensor_type == "temperature" {
        "°C"
    } else if sensor_type.contains("humidity") {
        "%"
    } else if sensor_type == "luminosity" {
        "lux"
    } else {
        ""
    }
}

pub async fn insert(conn: &sqlx::SqlitePool, new_sensor: NewSensor) -> Result<SensorDao, DBError> {
    let unit = new_sensor
        .unit
        .unwrap_or_else(|| default_unit(&new_sensor.sensor_type).to_owned());

    Ok(sqlx::query_as::<_, SensorDao>(
        r#"INSERT INTO sensors
            (id_code, parcel_id, sensor_type, unit, description, threshold_low, threshold_high, active)
            VALUES (?, ?, ?, ?, ?, ?, ?, 1) RETURNING *"#,
    )
    .bind(&new_sensor.id_code)
    .bind(new_sensor.parcel_id)
    .bind(&new_sensor.sensor_type)
    .bind(unit)
    .bind(&new_sensor.description)
    .bind(new_sensor.threshold_low)
    .bind(new_sensor.threshold_high)
    .fetch_one(conn)
    .await?)
}

/// READ sensors
pub async fn read(conn: &sqlx::SqlitePool) -> Result<Vec<SensorDao>, DBError> {
    Ok(sqlx::query_as::<_, SensorDao>("SELECT * FROM sensors")
        .fetch_all(conn)
        .await?)
}

pub async fn read_by_parcel(
    conn: &sqlx::SqlitePool,
    parcel_id: i64,
) -> Result<Vec<SensorDao>, DBError> {
    Ok(
        sqlx::query_as::<_, SensorDao>("SELECT * FROM sensors WHERE parcel_id = ?")
            .bind(parcel_id)
            .fetch_all(conn)
            .await?,
    )
}

pub async fn get(conn: &sqlx::SqlitePool, sensor_id: i64) -> Result<Option<SensorDao>, DBError> {
    Ok(
        sqlx::query_as::<_, SensorDao>("SELECT * FROM sensors WHERE id = ?")
            .bind(sensor_id)
            .fetch_optional(conn)
            .await?,
    )
}

/// Sensors are only ever edited via description and threshold bounds
pub async fn update(
    conn: &sqlx::SqlitePool,
    sensor_id: i64,
    description: &str,
    threshold_low: f64,
    threshold_high: f64,
) -> Result<SensorDao, DBError> {
    sqlx::query_as::<_, SensorDao>(
        r#"UPDATE sensors SET description = ?, threshold_low = ?, threshold_high = ?
            WHERE id = ? RETURNING *"#,
    )
    .bind(description)
    .bind(threshold_low)
    .bind(threshold_high)
    .bind(sensor_id)
    .fetch_optional(conn)
    .await?
    .ok_or(DBError::SensorNotFound(sensor_id))
}

/// Removes the sensor with all its readings and alerts
pub async fn delete(conn: &sqlx::SqlitePool, remove_id: i64) -> Result<(), DBError> {
    sqlx::query("DELETE FROM sensor_data WHERE sensor_id = ?")
        .bind(remove_id)
        .execute(conn)
        .await?;
    sqlx::query("DELETE FROM alerts WHERE sensor_id = ?")
        .bind(remove_id)
        .execute(conn)
        .await?;
    sqlx::query("DELETE FROM sensors WHERE id = ?")
        .bind(remove_id)
        .execute(conn)
        .await?;
    Ok(())
}
