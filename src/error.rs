use std::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DBError {
    #[error(transparent)]
    SqlError(#[from] sqlx::Error),
    #[error("Did not find sensor: {0}")]
    SensorNotFound(i64),
    #[error("Did not find parcel: {0}")]
    ParcelNotFound(i64),
    #[error("Did not find alert: {0}")]
    AlertNotFound(i64),
}

#[derive(Debug, Error)]
#[error(transparent)]
pub enum ObserverError {
    User(Box<dyn error::Error>),
    NotFound(Box<dyn error::Error>),
    Internal(Box<dyn error::Error>),
}
unsafe impl Send for ObserverError {}

impl From<DBError> for ObserverError {
    fn from(err: DBError) -> Self {
        match err {
            DBError::SensorNotFound(_) | DBError::ParcelNotFound(_) | DBError::AlertNotFound(_) => {
                ObserverError::NotFound(Box::from(err))
            }
            DBError::SqlError(_) => ObserverError::Internal(Box::from(err)),
        }
    }
}
