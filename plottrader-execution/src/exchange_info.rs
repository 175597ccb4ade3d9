//! Per-venue symbol-info cache: fetches and persists exchange trading
//! rules, refreshing on a staleness timer and giving a cache miss one
//! "second chance" refresh before failing.
//!
//! The refresh/second-chance/snapshot logic is written once here and
//! shared by both markets via [`ExchangeInfoSource`] rather than
//! duplicated per venue.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ExecutionError;
use crate::filters::SymbolFilters;

const STALE_AFTER: Duration = Duration::from_secs(24 * 3600);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Snapshot<T> {
    fetched_at_unix: u64,
    symbols: T,
}

/// Anything that can fetch the raw symbol table from a venue. Implemented
/// by each concrete client, parameterized over whatever shape its
/// `exchangeInfo` response takes.
pub trait ExchangeInfoSource {
    type SymbolTable: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;

    fn fetch(&self) -> impl std::future::Future<Output = Result<Self::SymbolTable, ExecutionError>> + Send;

    /// Looks up one symbol's filters within an already-fetched table.
    fn filters_for<'a>(table: &'a Self::SymbolTable, symbol: &str) -> Option<&'a SymbolFilters>;
}

/// A venue-scoped, file-backed cache of `T::SymbolTable`.
pub struct SymbolCache<T: ExchangeInfoSource> {
    path: PathBuf,
    source: T,
    table: parking_lot::RwLock<Option<(T::SymbolTable, SystemTime)>>,
}

impl<T: ExchangeInfoSource> SymbolCache<T> {
    pub fn new(snapshot_dir: impl AsRef<Path>, file_name: &str, source: T) -> Self {
        Self {
            path: snapshot_dir.as_ref().join(file_name),
            source,
            table: parking_lot::RwLock::new(None),
        }
    }

    fn load_from_disk(&self) -> Option<(T::SymbolTable, SystemTime)> {
        let bytes = fs::read(&self.path).ok()?;
        let snapshot: Snapshot<T::SymbolTable> = serde_json::from_slice(&bytes).ok()?;
        let fetched_at = SystemTime::UNIX_EPOCH + Duration::from_secs(snapshot.fetched_at_unix);
        Some((snapshot.symbols, fetched_at))
    }

    fn persist(&self, table: &T::SymbolTable) -> Result<(), ExecutionError> {
        let fetched_at_unix = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let snapshot = Snapshot { fetched_at_unix, symbols: table.clone() };
        let bytes = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| ExecutionError::Snapshot(std::io::Error::other(e)))?;
        let mut file = fs::File::create(&self.path)?;
        file.write_all(&bytes)?;
        #[cfg(unix)]
        {
            let mut perms = file.metadata()?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)?;
        }
        Ok(())
    }

    fn is_stale(fetched_at: SystemTime) -> bool {
        fetched_at.elapsed().map(|age| age > STALE_AFTER).unwrap_or(true)
    }

    async fn refresh(&self) -> Result<T::SymbolTable, ExecutionError> {
        let table = self.source.fetch().await?;
        self.persist(&table)?;
        *self.table.write() = Some((table.clone(), SystemTime::now()));
        Ok(table)
    }

    /// Returns the cached table, refreshing it first if missing, stale, or
    /// absent from disk.
    pub async fn get(&self) -> Result<T::SymbolTable, ExecutionError> {
        if let Some((table, fetched_at)) = self.table.read().clone() {
            if !Self::is_stale(fetched_at) {
                return Ok(table);
            }
            debug!("exchange info cache stale, refreshing");
        } else if let Some((table, fetched_at)) = self.load_from_disk() {
            if !Self::is_stale(fetched_at) {
                *self.table.write() = Some((table.clone(), fetched_at));
                return Ok(table);
            }
        }
        self.refresh().await
    }

    /// Looks up filters for `symbol`, retrying once with a forced refresh
    /// on a miss (a symbol can legitimately be newly listed since the last
    /// snapshot) before reporting `UnknownSymbol`.
    pub async fn symbol(&self, symbol: &str) -> Result<SymbolFilters, ExecutionError> {
        let table = self.get().await?;
        if let Some(filters) = T::filters_for(&table, symbol) {
            return Ok(filters.clone());
        }

        warn!(symbol, "symbol not found in cached exchange info, refreshing once");
        let table = self.refresh().await?;
        T::filters_for(&table, symbol)
            .cloned()
            .ok_or_else(|| ExecutionError::UnknownSymbol(symbol.to_string()))
    }
}
