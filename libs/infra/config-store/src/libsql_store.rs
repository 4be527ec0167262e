// [libs/infra/config-store/src/libsql_store.rs]
/*!
 * =================================================================
 * APARATO: LIBSQL-BACKED CONFIG STORE (V1.0 - EDGE CORE)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA OPACA SOBRE LIBSQL/TURSO
 *
 * # Mathematical Proof (In-Memory Consistency):
 * Para garantizar que el esquema sea visible entre hilos en modo RAM,
 * el cliente detecta URLs de memoria y aplica el ancla de persistencia
 * antes de la ejecución del bootstrap, asegurando que las tablas
 * residan en un segmento de memoria compartido.
 *
 * NOTA: libSQL no ofrece pub/sub nativo; la notificación de invalidación
 * de cache (§4.A) se resuelve aquí mediante un bus de difusión en
 * proceso. Entre procesos distintos, el operador del backend real debe
 * conectar su propio canal de notificación al método `publish`.
 * =================================================================
 */

use crate::client::{ConfigStoreClient, ScoredMember};
use crate::errors::StoreError;
use async_trait::async_trait;
use dashmap::DashMap;
use libsql::{params, Builder, Connection, Database};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, instrument};

const PUBSUB_CHANNEL_CAPACITY: usize = 1024;

const BOOTSTRAP_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS waf_kv (
    store_key TEXT PRIMARY KEY,
    document  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS waf_set_members (
    store_key TEXT NOT NULL,
    member    TEXT NOT NULL,
    PRIMARY KEY (store_key, member)
);
CREATE TABLE IF NOT EXISTS waf_hash_fields (
    store_key TEXT NOT NULL,
    field     TEXT NOT NULL,
    document  TEXT NOT NULL,
    PRIMARY KEY (store_key, field)
);
CREATE TABLE IF NOT EXISTS waf_sorted_set (
    store_key TEXT NOT NULL,
    member    TEXT NOT NULL,
    score     REAL NOT NULL,
    PRIMARY KEY (store_key, member)
);
CREATE TABLE IF NOT EXISTS waf_list (
    store_key  TEXT NOT NULL,
    position   INTEGER NOT NULL,
    document   TEXT NOT NULL,
    PRIMARY KEY (store_key, position)
);
CREATE TABLE IF NOT EXISTS waf_counters (
    store_key TEXT PRIMARY KEY,
    value     INTEGER NOT NULL
);
"#;

async fn apply_bootstrap_schema(connection: &Connection) -> Result<(), libsql::Error> {
    connection.execute_batch(BOOTSTRAP_SCHEMA).await
}

/// Cliente de almacén respaldado por libSQL/Turso.
pub struct LibsqlConfigStore {
    database_driver: Arc<Database>,
    _memory_persistence_anchor: Option<Arc<Connection>>,
    channels: DashMap<String, broadcast::Sender<String>>,
}

impl LibsqlConfigStore {
    #[instrument(skip(database_access_token))]
    pub async fn connect(
        database_connection_url: &str,
        database_access_token: Option<String>,
    ) -> Result<Self, StoreError> {
        if database_connection_url.is_empty() {
            return Err(StoreError::ConfigurationError("DATABASE_URL_UNDEFINED".into()));
        }

        info!("🔌 [CONFIG_STORE]: Initiating tactical link synchronization to [{}]", database_connection_url);

        let is_remote = database_connection_url.starts_with("libsql://")
            || database_connection_url.starts_with("https://");
        let is_memory = database_connection_url.contains(":memory:")
            || database_connection_url.contains("mode=memory");

        let database_driver = if is_remote {
            let token = database_access_token.ok_or_else(|| {
                StoreError::ConfigurationError("Remote access denied (token missing)".into())
            })?;
            Builder::new_remote(database_connection_url.to_string(), token).build().await
        } else {
            Builder::new_local(database_connection_url).build().await
        }
        .map_err(|fault| StoreError::StoreUnavailable(format!("DRIVER_IGNITION_FAILURE: {fault}")))?;

        let shared_driver = Arc::new(database_driver);
        let mut anchor = None;

        if is_memory {
            let anchor_connection = shared_driver
                .connect()
                .map_err(|fault| StoreError::StoreUnavailable(format!("ANCHOR_FAULT: {fault}")))?;
            apply_bootstrap_schema(&anchor_connection)
                .await
                .map_err(|fault| StoreError::StoreUnavailable(format!("SCHEMA_SYNC_FAULT: {fault}")))?;
            anchor = Some(Arc::new(anchor_connection));
            info!("⚓ [CONFIG_STORE]: Memory strata solidified and anchored.");
        } else {
            let bootstrap_connection = shared_driver
                .connect()
                .map_err(|fault| StoreError::StoreUnavailable(format!("BOOTSTRAP_LINK_FAULT: {fault}")))?;
            apply_bootstrap_schema(&bootstrap_connection)
                .await
                .map_err(|fault| StoreError::StoreUnavailable(format!("SCHEMA_SYNC_FAULT: {fault}")))?;
        }

        Ok(Self {
            database_driver: shared_driver,
            _memory_persistence_anchor: anchor,
            channels: DashMap::new(),
        })
    }

    fn connection(&self) -> Result<Connection, StoreError> {
        self.database_driver.connect().map_err(|fault| {
            error!("⚠️ [CONFIG_STORE]: Connection allocation failed: {}", fault);
            StoreError::StoreUnavailable(fault.to_string())
        })
    }

    fn channel_sender(&self, channel: &str) -> broadcast::Sender<String> {
        if let Some(existing) = self.channels.get(channel) {
            return existing.clone();
        }
        let (sender, _receiver) = broadcast::channel(PUBSUB_CHANNEL_CAPACITY);
        self.channels.insert(channel.to_string(), sender.clone());
        sender
    }
}

#[async_trait]
impl ConfigStoreClient for LibsqlConfigStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let connection = self.connection()?;
        let mut rows = connection
            .query("SELECT document FROM waf_kv WHERE store_key = ?1", params![key])
            .await?;
        match rows.next().await? {
            Some(row) => {
                let raw_document: String = row.get(0)?;
                let parsed = serde_json::from_str(&raw_document)
                    .map_err(|fault| StoreError::MalformedDocument(fault.to_string()))?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let connection = self.connection()?;
        let serialized = value.to_string();
        connection
            .execute(
                "INSERT INTO waf_kv (store_key, document) VALUES (?1, ?2)
                 ON CONFLICT(store_key) DO UPDATE SET document = excluded.document",
                params![key, serialized],
            )
            .await?;
        Ok(())
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let connection = self.connection()?;
        connection
            .execute(
                "INSERT OR IGNORE INTO waf_set_members (store_key, member) VALUES (?1, ?2)",
                params![key, member],
            )
            .await?;
        Ok(())
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let connection = self.connection()?;
        connection
            .execute(
                "DELETE FROM waf_set_members WHERE store_key = ?1 AND member = ?2",
                params![key, member],
            )
            .await?;
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let connection = self.connection()?;
        let mut rows = connection
            .query("SELECT member FROM waf_set_members WHERE store_key = ?1", params![key])
            .await?;
        let mut members = Vec::new();
        while let Some(row) = rows.next().await? {
            members.push(row.get::<String>(0)?);
        }
        Ok(members)
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<Value>, StoreError> {
        let connection = self.connection()?;
        let mut rows = connection
            .query(
                "SELECT document FROM waf_hash_fields WHERE store_key = ?1 AND field = ?2",
                params![key, field],
            )
            .await?;
        match rows.next().await? {
            Some(row) => {
                let raw_document: String = row.get(0)?;
                let parsed = serde_json::from_str(&raw_document)
                    .map_err(|fault| StoreError::MalformedDocument(fault.to_string()))?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    async fn hash_set(&self, key: &str, field: &str, value: Value) -> Result<(), StoreError> {
        let connection = self.connection()?;
        let serialized = value.to_string();
        connection
            .execute(
                "INSERT INTO waf_hash_fields (store_key, field, document) VALUES (?1, ?2, ?3)
                 ON CONFLICT(store_key, field) DO UPDATE SET document = excluded.document",
                params![key, field, serialized],
            )
            .await?;
        Ok(())
    }

    async fn sorted_set_range(&self, key: &str) -> Result<Vec<ScoredMember>, StoreError> {
        let connection = self.connection()?;
        let mut rows = connection
            .query(
                "SELECT member, score FROM waf_sorted_set WHERE store_key = ?1 ORDER BY score ASC",
                params![key],
            )
            .await?;
        let mut members = Vec::new();
        while let Some(row) = rows.next().await? {
            members.push(ScoredMember { member: row.get(0)?, score: row.get(1)? });
        }
        Ok(members)
    }

    async fn sorted_set_add(&self, key: &str, member: &str, score: f64) -> Result<(), StoreError> {
        let connection = self.connection()?;
        connection
            .execute(
                "INSERT INTO waf_sorted_set (store_key, member, score) VALUES (?1, ?2, ?3)
                 ON CONFLICT(store_key, member) DO UPDATE SET score = excluded.score",
                params![key, member, score],
            )
            .await?;
        Ok(())
    }

    async fn list_push(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let connection = self.connection()?;
        let mut rows = connection
            .query(
                "SELECT COALESCE(MAX(position), -1) FROM waf_list WHERE store_key = ?1",
                params![key],
            )
            .await?;
        let next_position: i64 = match rows.next().await? {
            Some(row) => row.get::<i64>(0)? + 1,
            None => 0,
        };
        connection
            .execute(
                "INSERT INTO waf_list (store_key, position, document) VALUES (?1, ?2, ?3)",
                params![key, next_position, value.to_string()],
            )
            .await?;
        Ok(())
    }

    async fn list_range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Value>, StoreError> {
        let connection = self.connection()?;
        let mut rows = connection
            .query(
                "SELECT document FROM waf_list WHERE store_key = ?1 ORDER BY position ASC",
                params![key],
            )
            .await?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next().await? {
            let raw_document: String = row.get(0)?;
            documents.push(
                serde_json::from_str(&raw_document)
                    .map_err(|fault| StoreError::MalformedDocument(fault.to_string()))?,
            );
        }
        let length = documents.len() as i64;
        if length == 0 {
            return Ok(Vec::new());
        }
        let normalize = |index: i64| -> i64 {
            if index < 0 { (length + index).max(0) } else { index.min(length - 1) }
        };
        let first = normalize(start) as usize;
        let last = normalize(stop) as usize;
        if first > last {
            return Ok(Vec::new());
        }
        Ok(documents[first..=last].to_vec())
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        let connection = self.connection()?;
        connection
            .execute(
                "INSERT INTO waf_counters (store_key, value) VALUES (?1, ?2)
                 ON CONFLICT(store_key) DO UPDATE SET value = value + excluded.value",
                params![key, delta],
            )
            .await?;
        let mut rows = connection
            .query("SELECT value FROM waf_counters WHERE store_key = ?1", params![key])
            .await?;
        let row = rows.next().await?.ok_or_else(|| {
            StoreError::StoreUnavailable("counter vanished after write".into())
        })?;
        Ok(row.get::<i64>(0)?)
    }

    async fn publish(&self, channel: &str, message: &str) -> Result<(), StoreError> {
        let _ = self.channel_sender(channel).send(message.to_string());
        Ok(())
    }

    fn subscribe(&self, channel: &str) -> broadcast::Receiver<String> {
        self.channel_sender(channel).subscribe()
    }
}
