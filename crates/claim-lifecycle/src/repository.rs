//! Persistence backends for claims and officer profiles
//!
//! Redis data model:
//! - claim:{id} → JSON-encoded claim
//! - claims:all → Set of all claim ids
//! - officer:{id} → JSON-encoded officer profile
//! - officers:all → Set of all officer ids

use async_trait::async_trait;
use fra_common::{Error, Result};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::models::{Claim, OfficerProfile};

/// Durable storage behind the in-memory claim store
#[async_trait]
pub trait ClaimRepository: Send + Sync {
    async fn load_claims(&self) -> Result<Vec<Claim>>;

    async fn save_claim(&self, claim: &Claim) -> Result<()>;

    async fn load_officers(&self) -> Result<Vec<OfficerProfile>>;

    async fn save_officer(&self, officer: &OfficerProfile) -> Result<()>;
}

/// Process-local repository; contents vanish with the process
#[derive(Default)]
pub struct MemoryRepository {
    claims: Mutex<HashMap<String, Claim>>,
    officers: Mutex<HashMap<String, OfficerProfile>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClaimRepository for MemoryRepository {
    async fn load_claims(&self) -> Result<Vec<Claim>> {
        Ok(self.claims.lock().await.values().cloned().collect())
    }

    async fn save_claim(&self, claim: &Claim) -> Result<()> {
        self.claims
            .lock()
            .await
            .insert(claim.id.clone(), claim.clone());
        Ok(())
    }

    async fn load_officers(&self) -> Result<Vec<OfficerProfile>> {
        Ok(self.officers.lock().await.values().cloned().collect())
    }

    async fn save_officer(&self, officer: &OfficerProfile) -> Result<()> {
        self.officers
            .lock()
            .await
            .insert(officer.id.clone(), officer.clone());
        Ok(())
    }
}

fn storage_error(err: redis::RedisError) -> Error {
    Error::Storage(err.to_string())
}

/// Redis-backed repository
pub struct RedisRepository {
    conn: ConnectionManager,
}

impl RedisRepository {
    /// Connect to Redis
    pub async fn new(redis_url: &str) -> Result<Self> {
        info!("Connecting to Redis at {}", redis_url);

        let client = redis::Client::open(redis_url).map_err(storage_error)?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(storage_error)?;

        info!("Successfully connected to Redis");

        Ok(Self { conn })
    }

    /// Check that Redis answers
    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    async fn load_all<T: serde::de::DeserializeOwned>(
        &self,
        index: &str,
        prefix: &str,
    ) -> Result<Vec<T>> {
        let mut conn = self.conn.clone();
        let ids: Vec<String> = conn.smembers(index).await.map_err(storage_error)?;

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            let json: Option<String> = conn
                .get(format!("{}:{}", prefix, id))
                .await
                .map_err(storage_error)?;

            match json {
                Some(data) => records.push(serde_json::from_str(&data)?),
                None => warn!("Index {} references missing {}:{}", index, prefix, id),
            }
        }

        debug!("Loaded {} records from {}", records.len(), index);
        Ok(records)
    }

    async fn save<T: serde::Serialize>(
        &self,
        index: &str,
        prefix: &str,
        id: &str,
        record: &T,
    ) -> Result<()> {
        let json = serde_json::to_string(record)?;
        let mut conn = self.conn.clone();

        // Record and index entry land together or not at all
        let _: () = redis::pipe()
            .atomic()
            .set(format!("{}:{}", prefix, id), json)
            .ignore()
            .sadd(index, id)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(storage_error)?;

        Ok(())
    }
}

#[async_trait]
impl ClaimRepository for RedisRepository {
    async fn load_claims(&self) -> Result<Vec<Claim>> {
        self.load_all("claims:all", "claim").await
    }

    async fn save_claim(&self, claim: &Claim) -> Result<()> {
        self.save("claims:all", "claim", &claim.id, claim).await?;
        debug!("Saved claim {} status: {}", claim.id, claim.status());
        Ok(())
    }

    async fn load_officers(&self) -> Result<Vec<OfficerProfile>> {
        self.load_all("officers:all", "officer").await
    }

    async fn save_officer(&self, officer: &OfficerProfile) -> Result<()> {
        self.save("officers:all", "officer", &officer.id, officer)
            .await
    }
}
