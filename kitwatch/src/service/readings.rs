//! Sensor ingestion and retrieval use cases.
//!
//! One generic [`ReadingService`] serves every sensor kind. Arguments are validated before the
//! store is touched, so a rejected request never costs a query.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::instrument;

use crate::db::{
    errors::DbError,
    handlers::{ReadingStore, Readings},
    in_memory::InMemoryStore,
    models::{
        readings::{Reading, RecordWindow, SensorRecord},
        sensors::{AirQuality, Alert, Garden, Light, Motion, Temperature},
    },
};
use crate::errors::{Error, Result};
use crate::types::KitId;

fn ensure_positive_kit(kit_id: KitId) -> Result<()> {
    if kit_id <= 0 {
        return Err(Error::InvalidArgument {
            message: format!("kit_id must be a positive integer, got {kit_id}"),
        });
    }
    Ok(())
}

/// Record and query readings of one sensor kind.
pub struct ReadingService<R: Reading> {
    store: Arc<dyn ReadingStore<R>>,
}

impl<R: Reading> Clone for ReadingService<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<R: Reading> ReadingService<R> {
    pub fn new(store: Arc<dyn ReadingStore<R>>) -> Self {
        Self { store }
    }

    /// Persist one reading for `kit_id`.
    #[instrument(skip(self, payload), fields(kind = R::KIND), err)]
    pub async fn record(&self, kit_id: KitId, payload: R) -> Result<SensorRecord<R>> {
        ensure_positive_kit(kit_id)?;
        payload.validate().map_err(|message| Error::InvalidArgument { message })?;

        self.store.create(kit_id, &payload).await.map_err(|err| match err {
            DbError::ForeignKeyViolation { .. } => Error::ReferentialIntegrity { kit_id },
            other => Error::from_store(other, format!("record {} reading", R::KIND)),
        })
    }

    /// Readings of `kit_id` from the last `minutes` minutes, newest first.
    #[instrument(skip(self), fields(kind = R::KIND), err)]
    pub async fn recent(&self, kit_id: KitId, minutes: i64) -> Result<Vec<SensorRecord<R>>> {
        if minutes <= 0 {
            return Err(Error::InvalidArgument {
                message: format!("minutes must be a positive integer, got {minutes}"),
            });
        }
        ensure_positive_kit(kit_id)?;

        self.store
            .list(kit_id, RecordWindow::Trailing { minutes })
            .await
            .map_err(|err| Error::from_store(err, format!("list recent {} readings", R::KIND)))
    }

    /// Every reading of `kit_id`, newest first.
    #[instrument(skip(self), fields(kind = R::KIND), err)]
    pub async fn history(&self, kit_id: KitId) -> Result<Vec<SensorRecord<R>>> {
        ensure_positive_kit(kit_id)?;

        self.store
            .list(kit_id, RecordWindow::All)
            .await
            .map_err(|err| Error::from_store(err, format!("list {} history", R::KIND)))
    }
}

/// One reading service per sensor kind.
#[derive(Clone)]
pub struct ReadingServices {
    pub temperature: ReadingService<Temperature>,
    pub light: ReadingService<Light>,
    pub motion: ReadingService<Motion>,
    pub air_quality: ReadingService<AirQuality>,
    pub garden: ReadingService<Garden>,
    pub alerts: ReadingService<Alert>,
}

impl ReadingServices {
    pub fn postgres(pool: &PgPool) -> Self {
        fn service<R: Reading>(pool: &PgPool) -> ReadingService<R> {
            ReadingService::new(Arc::new(Readings::<R>::new(pool.clone())))
        }

        Self {
            temperature: service(pool),
            light: service(pool),
            motion: service(pool),
            air_quality: service(pool),
            garden: service(pool),
            alerts: service(pool),
        }
    }

    pub fn in_memory(store: &InMemoryStore) -> Self {
        fn service<R: Reading>(store: &InMemoryStore) -> ReadingService<R> {
            ReadingService::new(Arc::new(store.clone()))
        }

        Self {
            temperature: service(store),
            light: service(store),
            motion: service(store),
            air_quality: service(store),
            garden: service(store),
            alerts: service(store),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{
        handlers::{KitStore, UserStore},
        models::{kits::KitCreateDBRequest, sensors::AlertType, users::UserCreateDBRequest},
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and fails them all.
    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl<R: Reading> ReadingStore<R> for CountingStore {
        async fn create(&self, _kit_id: KitId, _payload: &R) -> crate::db::errors::Result<SensorRecord<R>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(DbError::Other(anyhow::anyhow!("unexpected store call")))
        }

        async fn list(&self, _kit_id: KitId, _window: RecordWindow) -> crate::db::errors::Result<Vec<SensorRecord<R>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(DbError::Other(anyhow::anyhow!("unexpected store call")))
        }
    }

    /// Always reports the database as unreachable.
    struct DownStore;

    #[async_trait::async_trait]
    impl<R: Reading> ReadingStore<R> for DownStore {
        async fn create(&self, _kit_id: KitId, _payload: &R) -> crate::db::errors::Result<SensorRecord<R>> {
            Err(DbError::Unavailable(sqlx::Error::PoolTimedOut))
        }

        async fn list(&self, _kit_id: KitId, _window: RecordWindow) -> crate::db::errors::Result<Vec<SensorRecord<R>>> {
            Err(DbError::Unavailable(sqlx::Error::PoolTimedOut))
        }
    }

    async fn seeded_store() -> (InMemoryStore, KitId) {
        let store = InMemoryStore::new();
        let owner = UserStore::create(
            &store,
            &UserCreateDBRequest {
                email: "owner@example.com".to_string(),
                password_hash: "hash".to_string(),
                first_name: "Kit".to_string(),
                last_name: "Owner".to_string(),
            },
        )
        .await
        .unwrap();
        let kit = KitStore::create(
            &store,
            &KitCreateDBRequest {
                owner_user_id: owner.id,
                name: "greenhouse".to_string(),
                description: "test kit".to_string(),
            },
        )
        .await
        .unwrap();
        (store, kit.id)
    }

    #[test_log::test(tokio::test)]
    async fn test_invalid_arguments_never_reach_the_store() {
        let store = Arc::new(CountingStore::default());
        let service = ReadingService::<Temperature>::new(store.clone());

        for (kit_id, minutes) in [(0, 10), (-5, 10), (1, 0), (1, -1), (0, 0)] {
            let err = service.recent(kit_id, minutes).await.unwrap_err();
            assert!(matches!(err, Error::InvalidArgument { .. }), "({kit_id}, {minutes})");
        }

        let err = service
            .record(0, Temperature { temperature: 20.0, humidity: 50.0 })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));

        let err = service
            .record(1, Temperature { temperature: f64::NAN, humidity: 50.0 })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));

        assert!(matches!(service.history(-1).await, Err(Error::InvalidArgument { .. })));

        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_minutes_is_checked_before_kit() {
        let service = ReadingService::<Light>::new(Arc::new(CountingStore::default()));
        let err = service.recent(0, 0).await.unwrap_err();
        assert!(err.to_string().contains("minutes"));
    }

    #[tokio::test]
    async fn test_recent_is_newest_first() {
        let (store, kit_id) = seeded_store().await;
        let services = ReadingServices::in_memory(&store);

        for temperature in [18.0, 19.0, 20.0] {
            services
                .temperature
                .record(kit_id, Temperature { temperature, humidity: 40.0 })
                .await
                .unwrap();
        }

        let records = services.temperature.recent(kit_id, 1).await.unwrap();
        let temperatures: Vec<f64> = records.iter().map(|r| r.payload.temperature).collect();
        assert_eq!(temperatures, vec![20.0, 19.0, 18.0]);
        assert!(records.windows(2).all(|w| w[0].recorded_at >= w[1].recorded_at));
        assert!(records.iter().all(|r| r.kit_id == kit_id));
    }

    #[tokio::test]
    async fn test_identical_and_concurrent_records_all_append() {
        let (store, kit_id) = seeded_store().await;
        let service = ReadingServices::in_memory(&store).temperature;
        let reading = Temperature { temperature: 21.5, humidity: 45.0 };

        let first = service.record(kit_id, reading.clone()).await.unwrap();
        let second = service.record(kit_id, reading.clone()).await.unwrap();
        assert_ne!(first.id, second.id);

        let (third, fourth) = tokio::join!(service.record(kit_id, reading.clone()), service.record(kit_id, reading.clone()));
        let (third, fourth) = (third.unwrap(), fourth.unwrap());
        assert_ne!(third.id, fourth.id);

        let records = service.recent(kit_id, 1).await.unwrap();
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|record| record.payload == reading));

        let mut ids: Vec<_> = records.iter().map(|record| record.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
        for id in [first.id, second.id, third.id, fourth.id] {
            assert!(ids.contains(&id));
        }
    }

    #[tokio::test]
    async fn test_kit_without_readings_is_empty_not_error() {
        let (store, kit_id) = seeded_store().await;
        let services = ReadingServices::in_memory(&store);

        assert!(services.motion.recent(kit_id, 60).await.unwrap().is_empty());
        assert!(services.alerts.history(kit_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_kit_is_referential_integrity_error() {
        let (store, _) = seeded_store().await;
        let services = ReadingServices::in_memory(&store);

        let alert = Alert {
            alert_type: AlertType::UnderMin,
            message: "too cold".to_string(),
        };
        let err = services.alerts.record(999_999, alert).await.unwrap_err();
        assert!(matches!(err, Error::ReferentialIntegrity { kit_id: 999_999 }));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);

        // Nothing was persisted for the unknown kit
        assert!(services.alerts.history(999_999).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_store_is_store_unavailable() {
        let service = ReadingService::<AirQuality>::new(Arc::new(DownStore));

        let err = service.recent(1, 5).await.unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable { .. }));

        let err = service.record(1, AirQuality { air_quality_index: 12 }).await.unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_garden_record_keeps_device_time() {
        let (store, kit_id) = seeded_store().await;
        let services = ReadingServices::in_memory(&store);

        let garden = Garden {
            temperature: 22.0,
            ground_humidity: 35.0,
            environment_humidity: 60.0,
            ph_level: 6.8,
            time: 1_700_000_000,
        };
        let created = services.garden.record(kit_id, garden.clone()).await.unwrap();
        assert_eq!(created.payload, garden);

        let value = serde_json::to_value(&created).unwrap();
        assert_eq!(value["time"], 1_700_000_000);
        assert_eq!(value["kit_id"], kit_id);
        assert!(value.get("recorded_at").is_some());
    }
}
