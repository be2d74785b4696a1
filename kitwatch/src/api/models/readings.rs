//! Request models for sensor ingestion.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::types::KitId;

/// Body of a sensor create request: the target kit plus the kind's own fields.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateReading<R> {
    pub kit_id: KitId,
    #[serde(flatten)]
    pub payload: R,
}

/// Path of a trailing-window read
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct WindowPath {
    /// Kit to read, positive
    pub kit_id: KitId,
    /// Trailing window length in minutes, positive
    pub minutes: i64,
}

#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct KitPath {
    pub kit_id: KitId,
}
