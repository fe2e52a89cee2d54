//! Location-to-forecast refresh pipeline.
//!
//! Each `refresh` is an attempt with a monotonically increasing id. Attempts
//! run concurrently, but only the attempt holding the latest id at commit
//! time may write its outcome; the check happens under the state store's
//! write lock. Starting a new attempt also cancels the previous one so its
//! location/network work is abandoned where possible.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use skycast_core::{AppError, NetworkError, ProviderError, WeatherConfig};
use skycast_weather::{
    ConnectivityProbe, ForecastSnapshot, LocationError, LocationProvider, WeatherClient,
};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::app_state::{AppState, StateStore};
use crate::error_mapping::IntoAppError;
use crate::permission::PermissionGate;

/// Identifies one `refresh` invocation.
pub type AttemptId = u64;

const DEFAULT_FORECAST_DAYS: u8 = 3;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    pub forecast_days: u8,
    /// Upper bound on a weather fetch; expiry is a provider error.
    pub request_timeout: Duration,
    /// Upper bound on a position lookup; expiry counts as a failed lookup.
    pub location_timeout: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            forecast_days: DEFAULT_FORECAST_DAYS,
            request_timeout: DEFAULT_TIMEOUT,
            location_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl From<&WeatherConfig> for ResolverSettings {
    fn from(config: &WeatherConfig) -> Self {
        Self {
            forecast_days: config.forecast_days,
            request_timeout: config.request_timeout(),
            location_timeout: config.location_timeout(),
        }
    }
}

enum Outcome {
    Fetched(ForecastSnapshot),
    Failed(AppError),
    Superseded,
}

/// Orchestrates refreshes and owns the resolver-written fields of `AppState`.
///
/// Cheap to clone; clones share the same state and attempt counter.
#[derive(Clone)]
pub struct ForecastResolver {
    inner: Arc<Inner>,
}

struct Inner {
    client: Arc<dyn WeatherClient>,
    location: Arc<dyn LocationProvider>,
    connectivity: Arc<dyn ConnectivityProbe>,
    settings: ResolverSettings,
    store: StateStore,
    latest: AtomicU64,
    last_query: Mutex<Option<String>>,
    in_flight: Mutex<Option<CancellationToken>>,
    permission: PermissionGate,
    tracker: TaskTracker,
    runtime: Handle,
}

impl ForecastResolver {
    /// Create a resolver on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` when called outside a tokio runtime.
    pub fn new(
        client: Arc<dyn WeatherClient>,
        location: Arc<dyn LocationProvider>,
        connectivity: Arc<dyn ConnectivityProbe>,
        settings: ResolverSettings,
    ) -> Result<Self, AppError> {
        Self::with_state(client, location, connectivity, settings, AppState::new())
    }

    /// Like [`ForecastResolver::new`] but starting from `initial` state.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` when called outside a tokio runtime.
    pub fn with_state(
        client: Arc<dyn WeatherClient>,
        location: Arc<dyn LocationProvider>,
        connectivity: Arc<dyn ConnectivityProbe>,
        settings: ResolverSettings,
        initial: AppState,
    ) -> Result<Self, AppError> {
        let runtime = Handle::try_current()
            .map_err(|e| AppError::Internal(format!("No tokio runtime available: {}", e)))?;

        Ok(Self {
            inner: Arc::new(Inner {
                client,
                location,
                connectivity,
                settings,
                store: StateStore::new(initial),
                latest: AtomicU64::new(0),
                last_query: Mutex::new(None),
                in_flight: Mutex::new(None),
                permission: PermissionGate::new(),
                tracker: TaskTracker::new(),
                runtime,
            }),
        })
    }

    /// Start a refresh. Fire-and-forget: the outcome is only observable
    /// through state changes. A non-empty `explicit_query` is used verbatim;
    /// otherwise the device position is resolved.
    pub fn refresh(&self, explicit_query: Option<&str>) -> AttemptId {
        let query = explicit_query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        // Counter bump, cancellation and the Loading transition happen under
        // one lock so concurrent callers cannot interleave them.
        let (attempt, cancel) = {
            let mut in_flight = self.inner.in_flight.lock();
            let attempt = self.inner.latest.fetch_add(1, Ordering::SeqCst) + 1;
            let cancel = CancellationToken::new();
            if let Some(previous) = in_flight.replace(cancel.clone()) {
                previous.cancel();
            }
            self.inner.store.update(AppState::begin_attempt);
            (attempt, cancel)
        };

        tracing::info!(attempt, query = ?query, "Starting forecast refresh");

        let worker = self.clone();
        let pipeline = self.inner.runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Outcome::Superseded,
                outcome = worker.run(attempt, query) => outcome,
            }
        });

        let committer = self.clone();
        self.inner.tracker.spawn_on(
            async move {
                let outcome = match pipeline.await {
                    Ok(outcome) => outcome,
                    Err(e) if e.is_cancelled() => Outcome::Superseded,
                    Err(e) => {
                        tracing::error!(attempt, "Refresh task failed: {}", e);
                        Outcome::Failed(AppError::Internal(e.to_string()))
                    }
                };
                committer.commit(attempt, outcome);
            },
            &self.inner.runtime,
        );

        attempt
    }

    /// Explicit search submission from the user.
    pub fn submit_search(&self, query: &str) -> Option<AttemptId> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        self.inner.store.update(|s| {
            s.search_mode_active = true;
            s.pending_query.clear();
        });
        Some(self.refresh(Some(query)))
    }

    pub fn set_pending_query(&self, query: &str) {
        self.inner.store.update(|s| s.pending_query = query.to_string());
    }

    /// Leave search mode without searching.
    pub fn cancel_search(&self) {
        self.inner.store.update(|s| {
            s.search_mode_active = false;
            s.pending_query.clear();
        });
    }

    /// Permission-system callback. A grant may resume a pending first load.
    pub fn set_location_permission(&self, granted: bool) {
        self.inner.store.update_if(|s| {
            if s.has_location_permission == granted {
                return false;
            }
            s.has_location_permission = granted;
            true
        });

        if granted && self.inner.permission.grant() {
            tracing::debug!("Location permission signal delivered");
        }
    }

    /// Clear the pending notice once the presentation layer has shown it.
    pub fn dismiss_notice(&self, id: u64) {
        self.inner.store.update_if(|s| {
            if s.notice.as_ref().map(|n| n.id) != Some(id) {
                return false;
            }
            s.notice = None;
            true
        });
    }

    pub fn state(&self) -> AppState {
        self.inner.store.current()
    }

    pub fn store(&self) -> &StateStore {
        &self.inner.store
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.inner.store.subscribe()
    }

    pub fn latest_attempt(&self) -> AttemptId {
        self.inner.latest.load(Ordering::SeqCst)
    }

    /// Wait until every attempt started so far has settled.
    pub async fn wait_idle(&self) {
        let tracker = &self.inner.tracker;
        tracker.close();
        tracker.wait().await;
        tracker.reopen();
    }

    fn is_latest(&self, attempt: AttemptId) -> bool {
        self.inner.latest.load(Ordering::SeqCst) == attempt
    }

    async fn run(&self, attempt: AttemptId, explicit_query: Option<String>) -> Outcome {
        let query = match explicit_query {
            Some(query) => query,
            None => match self.locate(attempt).await {
                Ok(query) => query,
                Err(e) => return Outcome::Failed(e),
            },
        };

        *self.inner.last_query.lock() = Some(query.clone());
        self.fetch(&query).await
    }

    /// Resolve the device position into a query string.
    async fn locate(&self, attempt: AttemptId) -> Result<String, AppError> {
        let online = self.inner.connectivity.is_online().await;
        self.inner.store.update_if(|s| {
            if !self.is_latest(attempt) || s.is_online == online {
                return false;
            }
            s.is_online = online;
            true
        });

        if !online {
            tracing::warn!(attempt, "Device offline, skipping location lookup");
            return Err(NetworkError::Offline.into());
        }

        if !self.inner.store.read(|s| s.has_location_permission) {
            tracing::info!(attempt, "No location permission and no query");
            self.await_permission_grant(true);
            return Err(AppError::PermissionDenied);
        }

        let lookup = tokio::time::timeout(
            self.inner.settings.location_timeout,
            self.inner.location.current_position(),
        )
        .await;

        match lookup {
            Ok(Ok(position)) => Ok(position.to_query()),
            Ok(Err(LocationError::PermissionDenied)) => {
                tracing::info!(attempt, "Location provider denied access");
                self.await_permission_grant(false);
                Err(AppError::PermissionDenied)
            }
            Ok(Err(e)) => self.last_resort(attempt, e),
            Err(_) => self.last_resort(attempt, LocationError::Timeout),
        }
    }

    fn last_resort(&self, attempt: AttemptId, error: LocationError) -> Result<String, AppError> {
        match self.inner.last_query.lock().clone() {
            Some(query) => {
                tracing::warn!(attempt, "Location lookup failed ({}), reusing last query", error);
                Ok(query)
            }
            None => Err(error.into_app_error()),
        }
    }

    async fn fetch(&self, query: &str) -> Outcome {
        let settings = &self.inner.settings;
        let request = self.inner.client.fetch(query, settings.forecast_days);

        match tokio::time::timeout(settings.request_timeout, request).await {
            Ok(Ok(mut snapshot)) => {
                snapshot.sort_chronologically();
                Outcome::Fetched(snapshot)
            }
            Ok(Err(e)) => Outcome::Failed(e.into_app_error()),
            Err(_) => Outcome::Failed(ProviderError::Timeout.into()),
        }
    }

    fn commit(&self, attempt: AttemptId, outcome: Outcome) {
        match outcome {
            Outcome::Superseded => {
                tracing::debug!(attempt, "Refresh superseded, result dropped");
            }
            Outcome::Fetched(snapshot) => {
                let place = snapshot.location.name.clone();
                let committed = self.inner.store.update_if(|s| {
                    if !self.is_latest(attempt) {
                        return false;
                    }
                    s.commit_success(snapshot);
                    true
                });

                if committed {
                    tracing::info!(attempt, place = %place, "Forecast committed");
                } else {
                    tracing::debug!(attempt, "Stale forecast dropped");
                }
            }
            Outcome::Failed(error) => {
                let committed = self.inner.store.update_if(|s| {
                    if !self.is_latest(attempt) {
                        return false;
                    }
                    s.commit_failure(&error);
                    true
                });

                if committed {
                    tracing::warn!(attempt, status = %error.status(), "Forecast refresh failed: {}", error);
                } else {
                    tracing::debug!(attempt, "Stale failure dropped");
                }
            }
        }
    }

    /// Re-run the first load once, when permission arrives later.
    ///
    /// With `recheck`, a grant that landed before the gate was armed fires it
    /// immediately.
    fn await_permission_grant(&self, recheck: bool) {
        if !self.inner.store.read(|s| s.is_first_load) {
            return;
        }
        let Some(granted) = self.inner.permission.arm() else {
            return;
        };

        tracing::debug!("Waiting for location permission to resume first load");
        let inner = Arc::downgrade(&self.inner);
        self.inner.runtime.spawn(async move {
            if granted.await.is_err() {
                return;
            }
            let Some(inner) = inner.upgrade() else {
                return;
            };
            let resolver = ForecastResolver { inner };
            if resolver.inner.store.read(|s| s.is_first_load) {
                tracing::info!("Location permission granted, retrying first load");
                resolver.refresh(None);
            }
        });

        if recheck && self.inner.store.read(|s| s.has_location_permission) {
            self.inner.permission.grant();
        }
    }
}
