pub mod coordinate;
pub mod error;

use std::sync::Arc;

use tracing::debug;

use crate::{session::MountSession, transport::MountStatus};
use coordinate::Coordinate;
use error::StatusError;

/// On-demand position reads. Every read triggers a fresh status refresh.
pub struct StatusPoller {
    session: Arc<MountSession>,
}

impl StatusPoller {
    pub fn new(session: Arc<MountSession>) -> Self {
        Self { session }
    }

    pub async fn read_status(&self) -> Result<Coordinate, StatusError> {
        let status = self.refresh().await?;
        coordinate_of(&status)
    }

    /// Full status snapshot, including flags the coordinate read drops.
    pub async fn refresh(&self) -> Result<MountStatus, StatusError> {
        let status = self
            .session
            .command("status refresh", |t| async move { t.refresh_status().await })
            .await?
            .map_err(|e| StatusError::StaleOrUnavailable(e.to_string()))?;
        debug!("Status refresh: {:?}", status);
        Ok(status)
    }
}

/// Validated position out of a status snapshot.
pub fn coordinate_of(status: &MountStatus) -> Result<Coordinate, StatusError> {
    match (status.ra_hours, status.dec_degrees) {
        (Some(ra), Some(dec)) => Coordinate::new(ra, dec).ok_or_else(|| {
            StatusError::StaleOrUnavailable(format!(
                "mount reported out-of-range position ra={} dec={}",
                ra, dec
            ))
        }),
        _ => Err(StatusError::StaleOrUnavailable(
            "mount has not reported a position yet".to_string(),
        )),
    }
}
