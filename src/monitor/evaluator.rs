use serde::Serialize;

use crate::models::alert::AlertKind;
use crate::models::sensor::SensorDao;
use crate::models::sensor_data::SensorDataDao;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SensorStatus {
    Ok,
    ViolationHigh,
    ViolationLow,
    NoData,
}

impl SensorStatus {
    pub fn violation_kind(&self) -> Option<AlertKind> {
        match self {
            SensorStatus::ViolationHigh => Some(AlertKind::High),
            SensorStatus::ViolationLow => Some(AlertKind::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub status: SensorStatus,
    pub message: Option<String>,
}

/// Classifies the latest reading of a sensor against its configured band.
///
/// Comparisons are strict, a value sitting exactly on a bound is in range.
/// Threshold ordering is not validated here: a sensor configured with
/// low > high simply never reports OK.
pub fn evaluate(sensor: &SensorDao, latest: Option<&SensorDataDao>) -> Evaluation {
    let Some(reading) = latest else {
        return Evaluation {
            status: SensorStatus::NoData,
            message: None,
        };
    };

    let value = reading.value();
    if value < sensor.threshold_low() {
        Evaluation {
            status: SensorStatus::ViolationLow,
            message: Some(format!(
                "Value {:.1} {} is below minimum threshold {} {}",
                value,
                sensor.unit(),
                sensor.threshold_low(),
                sensor.unit()
            )),
        }
    } else if value > sensor.threshold_high() {
        Evaluation {
            status: SensorStatus::ViolationHigh,
            message: Some(format!(
                "Value {:.1} {} is above maximum threshold {} {}",
                value,
                sensor.unit(),
                sensor.threshold_high(),
                sensor.unit()
            )),
        }
    } else {
        Evaluation {
            status: SensorStatus::Ok,
            message: None,
        }
    }
}
