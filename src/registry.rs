use crate::{
    alias,
    cache::AliasCache,
    config::AppConfig,
    db,
    error::{AppError, Result},
    models::{AliasMapping, ShortLink},
};
use chrono::Utc;
use sqlx::SqlitePool;

/// How auto-generated aliases are minted.
#[derive(Debug, Clone, Copy)]
pub struct AliasPolicy {
    pub length: usize,
    pub max_attempts: u32,
}

impl Default for AliasPolicy {
    fn default() -> Self {
        Self {
            length: 7,
            max_attempts: 5,
        }
    }
}

/// The alias store: owns the pool, the resolution cache, and the rules for
/// minting aliases. Built once at startup and shared through handler state.
#[derive(Clone, Debug)]
pub struct AliasRegistry {
    pool: SqlitePool,
    cache: AliasCache,
    base_url: String,
    policy: AliasPolicy,
}

impl AliasRegistry {
    pub fn new(pool: SqlitePool, base_url: impl Into<String>, policy: AliasPolicy) -> Self {
        Self {
            pool,
            cache: AliasCache::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            policy,
        }
    }

    /// Build the registry from configuration and warm its cache.
    pub async fn init(pool: SqlitePool, config: &AppConfig) -> Result<Self> {
        let registry = Self::new(
            pool,
            config.base_url.clone(),
            AliasPolicy {
                length: config.alias_length,
                max_attempts: config.max_alias_attempts,
            },
        );
        db::warm_cache(&registry.pool, &registry.cache).await?;
        Ok(registry)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Public link for an alias, e.g. `https://go.example.com/abc1234`.
    pub fn short_url(&self, alias: &str) -> String {
        format!("{}/{}", self.base_url, alias)
    }

    fn link(&self, mapping: AliasMapping) -> ShortLink {
        ShortLink {
            short_url: self.short_url(&mapping.alias),
            alias: mapping.alias,
            full_url: mapping.full_url,
            created_at: mapping.created_at,
        }
    }

    /// Validate the request, pick an alias, and persist the mapping.
    ///
    /// Nothing is written unless both `full_url` and `custom_alias` pass
    /// validation.
    pub async fn create(&self, full_url: &str, custom_alias: Option<&str>) -> Result<ShortLink> {
        let mapping = self.create_mapping(full_url, custom_alias).await?;
        Ok(self.link(mapping))
    }

    async fn create_mapping(
        &self,
        full_url: &str,
        custom_alias: Option<&str>,
    ) -> Result<AliasMapping> {
        tracing::info!(
            "Shortening {} (custom alias: {:?})",
            full_url,
            custom_alias
        );
        let full_url = alias::full_url(full_url)?;

        match alias::custom_alias(custom_alias)? {
            Some(custom) => match self.try_insert(custom.clone(), &full_url).await? {
                Some(mapping) => Ok(mapping),
                None => {
                    tracing::info!("Alias '{}' is already taken", custom);
                    Err(AppError::Conflict(custom))
                }
            },
            None => self.create_generated(&full_url).await,
        }
    }

    async fn create_generated(&self, full_url: &str) -> Result<AliasMapping> {
        for attempt in 1..=self.policy.max_attempts {
            let candidate = alias::random_alias(self.policy.length);
            if let Some(mapping) = self.try_insert(candidate.clone(), full_url).await? {
                return Ok(mapping);
            }
            tracing::warn!(
                "Alias collision on '{}' (attempt {})",
                candidate,
                attempt
            );
        }
        tracing::error!(
            "Gave up generating an alias after {} attempts",
            self.policy.max_attempts
        );
        Err(AppError::Exhausted(self.policy.max_attempts))
    }

    /// Insert under the alias lock and publish to the cache. `None` means the
    /// alias already exists.
    async fn try_insert(&self, alias: String, full_url: &str) -> Result<Option<AliasMapping>> {
        let mapping = AliasMapping {
            alias,
            full_url: full_url.to_owned(),
            created_at: Utc::now(),
        };

        let _guard = self.cache.lock(&mapping.alias).await;
        if !db::insert_mapping(&self.pool, &mapping).await? {
            return Ok(None);
        }
        self.cache.set(&mapping.alias, &mapping.full_url);
        tracing::info!("Created alias '{}' -> {}", mapping.alias, mapping.full_url);
        Ok(Some(mapping))
    }

    /// Look up the full URL for an alias.
    ///
    /// Cache hits return without locking. On a miss the database is read
    /// under the alias lock and the cache is backfilled.
    pub async fn resolve(&self, alias: &str) -> Result<String> {
        if let Some(url) = self.cache.get(alias) {
            return Ok(url);
        }
        if !alias::is_valid_alias(alias) {
            return Err(AppError::NotFound(alias.to_owned()));
        }

        let _guard = self.cache.lock(alias).await;
        if let Some(url) = self.cache.get(alias) {
            return Ok(url);
        }
        match db::get_mapping(&self.pool, alias).await? {
            Some(mapping) => {
                self.cache.set(&mapping.alias, &mapping.full_url);
                Ok(mapping.full_url)
            }
            None => Err(AppError::NotFound(alias.to_owned())),
        }
    }

    /// Permanently remove a mapping.
    pub async fn delete(&self, alias: &str) -> Result<()> {
        tracing::info!("Deleting alias '{}'", alias);

        let _guard = self.cache.lock(alias).await;
        let deleted = db::delete_mapping(&self.pool, alias).await?;
        self.cache.remove(alias);

        if deleted {
            tracing::info!("Deleted alias '{}'", alias);
            Ok(())
        } else {
            tracing::warn!("Alias '{}' not found for delete", alias);
            Err(AppError::NotFound(alias.to_owned()))
        }
    }

    /// Every live mapping, newest first.
    pub async fn list(&self) -> Result<Vec<ShortLink>> {
        let mappings = db::list_mappings(&self.pool).await?;
        Ok(mappings.into_iter().map(|m| self.link(m)).collect())
    }

    /// Number of aliases currently held in the resolution cache.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}
