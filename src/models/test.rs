use chrono::{Duration, Utc};

use super::alert::{self, AlertKind};
use super::parcel;
use super::sensor;
use super::sensor_data;
use super::*;

async fn insert_test_sensor(conn: &sqlx::SqlitePool) -> sensor::SensorDao {
    let parcel = parcel::insert(conn, "North Field Alpha", "34.0522, -118.2437", 150.5, 1)
        .await
        .unwrap();
    sensor::insert(
        conn,
        sensor::NewSensor {
            id_code: "S-TEMP-01".to_owned(),
            parcel_id: parcel.id(),
            sensor_type: "temperature".to_owned(),
            unit: None,
            description: "Air Temp Main".to_owned(),
            threshold_low: 10.0,
            threshold_high: 35.0,
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn crud_parcels() {
    let conn = establish_test_db_connection().await;

    // create
    let parcel = parcel::insert(&conn, "Green Valley South", "36.1699, -115.1398", 85.2, 1)
        .await
        .unwrap();

    // read
    assert!(!parcel::read(&conn).await.unwrap().is_empty());
    assert_eq!(1, parcel::count(&conn).await.unwrap());
    let fetched = parcel::get(&conn, parcel.id()).await.unwrap().unwrap();
    assert_eq!("Green Valley South", fetched.name().as_str());
    assert_eq!(85.2, fetched.area());

    // delete
    parcel::delete(&conn, parcel.id()).await.unwrap();
    assert!(parcel::get(&conn, parcel.id()).await.unwrap().is_none());
}

#[tokio::test]
async fn parcel_delete_cascades() {
    let conn = establish_test_db_connection().await;
    let sensor = insert_test_sensor(&conn).await;
    sensor_data::insert(&conn, sensor.id(), Utc::now().naive_utc(), 20.0)
        .await
        .unwrap();
    alert::insert_open(
        &conn,
        sensor.id(),
        AlertKind::High,
        "msg",
        Utc::now().naive_utc(),
    )
    .await
    .unwrap();

    parcel::delete(&conn, sensor.parcel_id()).await.unwrap();

    assert!(sensor::get(&conn, sensor.id()).await.unwrap().is_none());
    assert!(sensor_data::get_latest(&conn, sensor.id())
        .await
        .unwrap()
        .is_none());
    assert_eq!(0, alert::count_unacknowledged(&conn).await.unwrap());
}

#[tokio::test]
async fn crud_sensors() {
    let conn = establish_test_db_connection().await;
    let sensor = insert_test_sensor(&conn).await;

    // the temperature unit was defaulted
    assert_eq!("°C", sensor.unit().as_str());
    assert!(sensor.active());

    // read
    assert_eq!(1, sensor::read(&conn).await.unwrap().len());
    assert_eq!(
        1,
        sensor::read_by_parcel(&conn, sensor.parcel_id())
            .await
            .unwrap()
            .len()
    );

    // update
    let updated = sensor::update(&conn, sensor.id(), "Greenhouse Temp", 15.0, 30.0)
        .await
        .unwrap();
    assert_eq!("Greenhouse Temp", updated.description().as_str());
    assert_eq!(15.0, updated.threshold_low());
    assert_eq!(30.0, updated.threshold_high());

    // delete
    sensor::delete(&conn, sensor.id()).await.unwrap();
    assert!(sensor::get(&conn, sensor.id()).await.unwrap().is_none());
}

#[tokio::test]
async fn update_unknown_sensor_fails() {
    let conn = establish_test_db_connection().await;
    let res = sensor::update(&conn, i64::MAX, "nope", 0.0, 1.0).await;
    assert!(matches!(res, Err(DBError::SensorNotFound(_))));
}

#[tokio::test]
async fn default_units() {
    assert_eq!("°C", sensor::default_unit("temperature"));
    assert_eq!("%", sensor::default_unit("soil_humidity"));
    assert_eq!("%", sensor::default_unit("ambient_humidity"));
    assert_eq!("lux", sensor::default_unit("luminosity"));
    assert_eq!("", sensor::default_unit("ph"));
}

#[tokio::test]
async fn crud_sensor_data() {
    let conn = establish_test_db_connection().await;
    let sensor = insert_test_sensor(&conn).await;
    let now = Utc::now().naive_utc();

    // create, out of insertion order on purpose
    sensor_data::insert(&conn, sensor.id(), now - Duration::hours(1), 19.5)
        .await
        .unwrap();
    let latest = sensor_data::insert(&conn, sensor.id(), now, 21.0).await.unwrap();
    sensor_data::insert(&conn, sensor.id(), now - Duration::hours(2), 18.0)
        .await
        .unwrap();

    // raw echoes the value
    assert_eq!("21", latest.raw().as_str());

    // latest is by max timestamp, not by rowid
    let fetched = sensor_data::get_latest(&conn, sensor.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(21.0, fetched.value());

    // ascending since
    let since = sensor_data::get_since(&conn, sensor.id(), now - Duration::hours(3))
        .await
        .unwrap();
    let values: Vec<f64> = since.iter().map(|dao| dao.value()).collect();
    assert_eq!(vec![18.0, 19.5, 21.0], values);

    // bounded range is newest first and capped
    let range = sensor_data::get_range(&conn, sensor.id(), None, Some(now), 2)
        .await
        .unwrap();
    let values: Vec<f64> = range.iter().map(|dao| dao.value()).collect();
    assert_eq!(vec![21.0, 19.5], values);
}

#[tokio::test]
async fn crud_alerts() {
    let conn = establish_test_db_connection().await;
    let sensor = insert_test_sensor(&conn).await;
    let now = Utc::now().naive_utc();

    // create
    let alert_dao = alert::insert_open(&conn, sensor.id(), AlertKind::High, "too hot", now)
        .await
        .unwrap();
    assert!(!alert_dao.acknowledged());

    // read
    assert!(alert::find_open(&conn, sensor.id(), AlertKind::High)
        .await
        .unwrap()
        .is_some());
    assert!(alert::find_open(&conn, sensor.id(), AlertKind::Low)
        .await
        .unwrap()
        .is_none());
    assert_eq!(1, alert::count_unacknowledged(&conn).await.unwrap());

    // filters
    assert_eq!(
        1,
        alert::read(&conn, Some(AlertKind::High), false)
            .await
            .unwrap()
            .len()
    );
    assert!(alert::read(&conn, Some(AlertKind::Low), false)
        .await
        .unwrap()
        .is_empty());

    // acknowledge
    alert::acknowledge(&conn, alert_dao.id()).await.unwrap();
    assert_eq!(0, alert::count_unacknowledged(&conn).await.unwrap());
    assert!(alert::read(&conn, None, false).await.unwrap().is_empty());
    assert_eq!(1, alert::read(&conn, None, true).await.unwrap().len());
}

#[tokio::test]
async fn open_alert_unique_per_kind() {
    let conn = establish_test_db_connection().await;
    let sensor = insert_test_sensor(&conn).await;
    let now = Utc::now().naive_utc();

    alert::insert_open(&conn, sensor.id(), AlertKind::High, "first", now)
        .await
        .unwrap();

    // the partial index rejects a second open row of the same kind,
    // even when the application-level check was bypassed
    let res = alert::insert_open(&conn, sensor.id(), AlertKind::High, "second", now).await;
    assert!(matches!(
        res,
        Err(DBError::SqlError(sqlx::Error::Database(ref e))) if e.is_unique_violation()
    ));

    // the opposite kind is an independent alert
    alert::insert_open(&conn, sensor.id(), AlertKind::Low, "too cold", now)
        .await
        .unwrap();
    assert_eq!(2, alert::count_unacknowledged(&conn).await.unwrap());
}

#[tokio::test]
async fn recent_alerts_capped_and_ordered() {
    let conn = establish_test_db_connection().await;
    let sensor = insert_test_sensor(&conn).await;
    let now = Utc::now().naive_utc();

    let mut ids = Vec::new();
    for i in 0..7 {
        let dao = alert::insert_open(&conn, 100 + i, AlertKind::High, "msg", now)
            .await
            .unwrap();
        ids.push(dao.id());
    }
    // an acknowledged alert does not show up as recent
    let acked = alert::insert_open(&conn, sensor.id(), AlertKind::Low, "msg", now)
        .await
        .unwrap();
    alert::acknowledge(&conn, acked.id()).await.unwrap();

    let recent = alert::recent_unacknowledged(&conn, 5).await.unwrap();
    assert_eq!(5, recent.len());
    let recent_ids: Vec<i64> = recent.iter().map(|dao| dao.id()).collect();
    let mut expected: Vec<i64> = ids[2..].to_vec();
    expected.reverse();
    assert_eq!(expected, recent_ids);
}
