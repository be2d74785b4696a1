//! Concrete sensor kinds and their column mappings.

use serde::{Deserialize, Serialize};
use sqlx::{Row, postgres::PgRow};
use std::str::FromStr;
use utoipa::ToSchema;

use super::readings::{PgQuery, Reading};

fn ensure_finite(field: &str, value: f64) -> Result<(), String> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(format!("{field} must be a finite number"))
    }
}

/// Temperature and relative humidity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Temperature {
    pub temperature: f64,
    pub humidity: f64,
}

impl Reading for Temperature {
    const KIND: &'static str = "temperature";
    const TABLE: &'static str = "temperature_readings";
    const COLUMNS: &'static [&'static str] = &["temperature", "humidity"];

    fn validate(&self) -> Result<(), String> {
        ensure_finite("temperature", self.temperature)?;
        ensure_finite("humidity", self.humidity)
    }

    fn bind<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query.bind(self.temperature).bind(self.humidity)
    }

    fn decode(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            temperature: row.try_get("temperature")?,
            humidity: row.try_get("humidity")?,
        })
    }
}

/// Ambient light level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Light {
    pub light_level: f64,
}

impl Reading for Light {
    const KIND: &'static str = "light";
    const TABLE: &'static str = "light_readings";
    const COLUMNS: &'static [&'static str] = &["light_level"];

    fn validate(&self) -> Result<(), String> {
        ensure_finite("light_level", self.light_level)?;
        if self.light_level < 0.0 {
            return Err("light_level must be greater than or equal to 0".to_string());
        }
        Ok(())
    }

    fn bind<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query.bind(self.light_level)
    }

    fn decode(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            light_level: row.try_get("light_level")?,
        })
    }
}

/// Presence sensor trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Motion {
    pub motion_detected: bool,
}

impl Reading for Motion {
    const KIND: &'static str = "motion";
    const TABLE: &'static str = "motion_readings";
    const COLUMNS: &'static [&'static str] = &["motion_detected"];

    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    fn bind<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query.bind(self.motion_detected)
    }

    fn decode(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            motion_detected: row.try_get("motion_detected")?,
        })
    }
}

/// Air quality index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AirQuality {
    pub air_quality_index: i32,
}

impl Reading for AirQuality {
    const KIND: &'static str = "air quality";
    const TABLE: &'static str = "air_quality_readings";
    const COLUMNS: &'static [&'static str] = &["air_quality_index"];

    fn validate(&self) -> Result<(), String> {
        if self.air_quality_index < 0 {
            return Err("air_quality_index must be greater than or equal to 0".to_string());
        }
        Ok(())
    }

    fn bind<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query.bind(self.air_quality_index)
    }

    fn decode(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            air_quality_index: row.try_get("air_quality_index")?,
        })
    }
}

/// Composite garden reading. `time` is the device clock (unix seconds), kept alongside the
/// server-assigned `recorded_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Garden {
    pub temperature: f64,
    pub ground_humidity: f64,
    pub environment_humidity: f64,
    pub ph_level: f64,
    pub time: i64,
}

impl Reading for Garden {
    const KIND: &'static str = "garden";
    const TABLE: &'static str = "garden_readings";
    const COLUMNS: &'static [&'static str] = &["temperature", "ground_humidity", "environment_humidity", "ph_level", "device_time"];

    fn validate(&self) -> Result<(), String> {
        ensure_finite("temperature", self.temperature)?;
        ensure_finite("ground_humidity", self.ground_humidity)?;
        ensure_finite("environment_humidity", self.environment_humidity)?;
        ensure_finite("ph_level", self.ph_level)?;
        if !(0.0..=14.0).contains(&self.ph_level) {
            return Err("ph_level must be between 0 and 14".to_string());
        }
        if self.time <= 0 {
            return Err("time must be a positive unix timestamp".to_string());
        }
        Ok(())
    }

    fn bind<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.temperature)
            .bind(self.ground_humidity)
            .bind(self.environment_humidity)
            .bind(self.ph_level)
            .bind(self.time)
    }

    fn decode(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            temperature: row.try_get("temperature")?,
            ground_humidity: row.try_get("ground_humidity")?,
            environment_humidity: row.try_get("environment_humidity")?,
            ph_level: row.try_get("ph_level")?,
            time: row.try_get("device_time")?,
        })
    }
}

/// Which threshold an alert crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    UnderMin,
    HigherMax,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::UnderMin => "under_min",
            AlertType::HigherMax => "higher_max",
        }
    }
}

impl FromStr for AlertType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "under_min" => Ok(AlertType::UnderMin),
            "higher_max" => Ok(AlertType::HigherMax),
            other => Err(format!("unknown alert type '{other}'")),
        }
    }
}

/// Threshold alert raised by a kit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Alert {
    pub alert_type: AlertType,
    pub message: String,
}

impl Reading for Alert {
    const KIND: &'static str = "alert";
    const TABLE: &'static str = "alerts";
    const COLUMNS: &'static [&'static str] = &["alert_type", "message"];

    fn validate(&self) -> Result<(), String> {
        if self.message.trim().is_empty() {
            return Err("message must not be empty".to_string());
        }
        Ok(())
    }

    fn bind<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query.bind(self.alert_type.as_str()).bind(self.message.clone())
    }

    fn decode(row: &PgRow) -> Result<Self, sqlx::Error> {
        let alert_type: String = row.try_get("alert_type")?;
        Ok(Self {
            alert_type: alert_type.parse().map_err(|e: String| sqlx::Error::Decode(e.into()))?,
            message: row.try_get("message")?,
        })
    }
}
