//! The view-state machine presentation code drives and observes.
//!
//! Every request publishes [`ViewState::Loading`] before any I/O starts, then
//! fetches current conditions and the forecast concurrently and publishes a
//! single `Success` or `Error`. Requests carry a sequence token; a result is
//! published only while its token is still the newest, so a slow response
//! can never overwrite the state of a later request.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::Mutex;
use tokio::{
    runtime::Handle,
    sync::{mpsc, watch},
    task::JoinHandle,
};

use crate::{
    error::QueryError,
    location::{self, DeviceLocation},
    model::{LocationQuery, ViewState},
    reducer::reduce_to_daily,
    source::WeatherSource,
};

/// Shown for any failed city lookup. An unknown city is the common case, so
/// the detail is not surfaced.
pub const CITY_ERROR_MESSAGE: &str = "City not found or network error.";

/// Prefix for failed coordinate lookups; the failure detail follows it.
pub const LOCATION_ERROR_PREFIX: &str = "Failed to load weather";

/// Which entry point issued a request. Decides the user-facing error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Location,
    City,
}

impl Origin {
    fn error_state(self, detail: &dyn fmt::Display) -> ViewState {
        let message = match self {
            Origin::Location => format!("{LOCATION_ERROR_PREFIX}: {detail}"),
            Origin::City => CITY_ERROR_MESSAGE.to_string(),
        };

        ViewState::Error { message }
    }
}

#[derive(Debug)]
struct Published {
    state: watch::Sender<ViewState>,
    /// One unbounded queue per `transitions()` observer.
    observers: Mutex<Vec<mpsc::UnboundedSender<ViewState>>>,
    latest: AtomicU64,
}

impl Published {
    /// Queue `state` for every observer, dropping the ones that went away.
    /// Called with the state lock held so queues see publish order.
    fn notify(&self, state: &ViewState) {
        self.observers.lock().retain(|tx| tx.send(state.clone()).is_ok());
    }

    /// Start a new request: bump the token and publish `Loading` under the
    /// state lock.
    fn begin(&self) -> u64 {
        let mut token = 0;
        self.state.send_modify(|state| {
            token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            *state = ViewState::Loading;
            self.notify(state);
        });
        token
    }

    /// Publish `next` if `token` is still the newest request. Returns whether
    /// it was published.
    fn finish(&self, token: u64, next: ViewState) -> bool {
        self.state.send_if_modified(|state| {
            if self.latest.load(Ordering::SeqCst) != token {
                return false;
            }
            self.notify(&next);
            *state = next;
            true
        })
    }
}

/// Owns the current [`ViewState`] for one screen and drives a
/// [`WeatherSource`] to update it.
///
/// Lookups run on the runtime captured at construction, so request methods
/// may be called from any thread.
#[derive(Debug)]
pub struct WeatherOrchestrator {
    source: Arc<dyn WeatherSource>,
    published: Arc<Published>,
    runtime: Handle,
}

impl WeatherOrchestrator {
    /// Build an orchestrator bound to the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime; use
    /// [`WeatherOrchestrator::with_runtime`] there.
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self::with_runtime(source, Handle::current())
    }

    pub fn with_runtime(source: Arc<dyn WeatherSource>, runtime: Handle) -> Self {
        let (state, _) = watch::channel(ViewState::Loading);

        Self {
            source,
            published: Arc::new(Published {
                state,
                observers: Mutex::new(Vec::new()),
                latest: AtomicU64::new(0),
            }),
            runtime,
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ViewState {
        self.published.state.borrow().clone()
    }

    /// Latest-value view of the state; await `changed()` for updates.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.published.state.subscribe()
    }

    /// Every transition from now on, in publish order, including repeated
    /// `Loading`. The queue is unbounded, so a slow reader misses nothing.
    pub fn transitions(&self) -> mpsc::UnboundedReceiver<ViewState> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.published.observers.lock().push(tx);
        rx
    }

    /// Load weather for device coordinates.
    ///
    /// Returns the handle of the background task. Dropping it detaches the
    /// task; aborting it cancels the lookup and leaves the state at `Loading`
    /// until the next request.
    pub fn request_by_location(&self, lat: f64, lon: f64) -> JoinHandle<()> {
        self.spawn(LocationQuery::coordinates(lat, lon), Origin::Location)
    }

    /// Load weather for a user-typed city name.
    pub fn request_by_city(&self, name: &str) -> JoinHandle<()> {
        self.spawn(LocationQuery::city(name), Origin::City)
    }

    /// Dispatch an already-built query to the matching entry point.
    pub fn request(&self, query: LocationQuery) -> JoinHandle<()> {
        match query {
            LocationQuery::Coordinates { lat, lon } => self.request_by_location(lat, lon),
            LocationQuery::CityName { name } => self.request_by_city(&name),
        }
    }

    /// Load weather for whatever the device reported, falling back to
    /// `default_city` when there is no usable fix.
    pub fn request_for_device(
        &self,
        device: DeviceLocation,
        default_city: &str,
    ) -> JoinHandle<()> {
        match location::query_for(device, default_city) {
            Ok(LocationQuery::CityName { name }) => {
                tracing::warn!(
                    ?device,
                    city = %name,
                    "device location unavailable, using default city"
                );
                self.request_by_city(&name)
            }
            Ok(query) => self.request(query),
            Err(err) => self.spawn(Err(err), Origin::City),
        }
    }

    fn spawn(
        &self,
        query: Result<LocationQuery, QueryError>,
        origin: Origin,
    ) -> JoinHandle<()> {
        let token = self.published.begin();
        let source = Arc::clone(&self.source);
        let published = Arc::clone(&self.published);

        self.runtime.spawn(async move {
            let next = load(source.as_ref(), query, origin).await;
            if !published.finish(token, next) {
                tracing::debug!(token, "discarding result of superseded request");
            }
        })
    }
}

async fn load(
    source: &dyn WeatherSource,
    query: Result<LocationQuery, QueryError>,
    origin: Origin,
) -> ViewState {
    let query = match query {
        Ok(query) => query,
        Err(err) => {
            tracing::warn!(%err, "rejected weather request");
            return origin.error_state(&err);
        }
    };

    tracing::info!(%query, "loading weather");

    let fetched = tokio::try_join!(source.fetch_current(&query), source.fetch_forecast(&query));

    match fetched {
        Ok((current, forecast)) => {
            let daily = reduce_to_daily(&forecast);
            if daily.is_empty() {
                tracing::warn!(%query, samples = forecast.len(), "forecast has no midday samples");
                return origin.error_state(&"forecast has no midday samples");
            }

            ViewState::Success { current, forecast: daily }
        }
        Err(err) => {
            tracing::warn!(%query, %err, "weather lookup failed");
            origin.error_state(&err)
        }
    }
}
