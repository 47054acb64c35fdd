// ── Maps service facade ──
//
// `MapsProvider` is the seam between the map screen and the hosted
// services. `GoogleMaps` implements it over `waymark_api::MapsClient`;
// tests substitute scripted providers. `MapsService` wraps a provider with
// the suggestion cache and is cheaply cloneable into spawned tasks.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};
use waymark_api::models::AutocompleteRequest;
use waymark_api::{Endpoints, MapsClient, TlsMode, TransportConfig, TravelMode};

use crate::cache::SuggestionCache;
use crate::config::{LocationSource, SearchConfig, ServiceConfig};
use crate::convert::route_from_api;
use crate::error::CoreError;
use crate::model::{LatLng, Place, Route, Suggestion};

/// Hosted place, geocoding, routing and location lookups.
///
/// Empty results are data (`Ok(vec![])`, `Ok(None)`), not errors.
pub trait MapsProvider: Send + Sync + 'static {
    /// Candidate places for partially typed text.
    fn suggest(
        &self,
        input: &str,
        session_token: &str,
    ) -> impl Future<Output = Result<Vec<Suggestion>, CoreError>> + Send;

    /// First geocoding match for an address.
    fn geocode(&self, address: &str)
    -> impl Future<Output = Result<Option<Place>, CoreError>> + Send;

    /// A driving route between two coordinates.
    fn route(
        &self,
        origin: LatLng,
        destination: LatLng,
    ) -> impl Future<Output = Result<Option<Route>, CoreError>> + Send;

    /// The user's current position.
    fn locate(&self) -> impl Future<Output = Result<LatLng, CoreError>> + Send;
}

// ── Google provider ──────────────────────────────────────────────────

/// [`MapsProvider`] backed by the Google Maps Platform web services.
pub struct GoogleMaps {
    client: MapsClient,
    language: Option<String>,
    location: LocationSource,
}

impl GoogleMaps {
    /// Build the HTTP client from configuration.
    pub fn new(config: &ServiceConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: config
                .ca_cert
                .clone()
                .map_or(TlsMode::System, TlsMode::CustomCa),
            ..TransportConfig::default()
        }
        .with_timeout(config.timeout);

        let endpoints = Endpoints {
            maps: config.maps_url.clone(),
            geolocation: config.geolocation_url.clone(),
        };
        let client = MapsClient::new(config.api_key.clone(), endpoints, &transport)?;

        Ok(Self::with_client(
            client,
            config.language.clone(),
            config.location,
        ))
    }

    pub fn with_client(
        client: MapsClient,
        language: Option<String>,
        location: LocationSource,
    ) -> Self {
        Self {
            client,
            language,
            location,
        }
    }
}

impl MapsProvider for GoogleMaps {
    async fn suggest(&self, input: &str, session_token: &str) -> Result<Vec<Suggestion>, CoreError> {
        let request = AutocompleteRequest {
            input: input.to_owned(),
            session_token: Some(session_token.to_owned()),
            language: self.language.clone(),
        };
        let response = self.client.autocomplete(&request).await?;
        Ok(response
            .predictions
            .into_iter()
            .map(Suggestion::from)
            .collect())
    }

    async fn geocode(&self, address: &str) -> Result<Option<Place>, CoreError> {
        let response = self.client.geocode(address).await?;
        Ok(response.results.into_iter().next().map(Place::from))
    }

    async fn route(&self, origin: LatLng, destination: LatLng) -> Result<Option<Route>, CoreError> {
        let response = self
            .client
            .directions(origin.into(), destination.into(), TravelMode::Driving)
            .await?;
        response
            .routes
            .into_iter()
            .next()
            .map(|route| route_from_api(route, origin, destination))
            .transpose()
    }

    async fn locate(&self) -> Result<LatLng, CoreError> {
        match self.location {
            LocationSource::Fixed(position) => Ok(position),
            LocationSource::Google => {
                let response = self.client.geolocate().await?;
                debug!(accuracy_m = response.accuracy, "geolocated");
                Ok(response.location.into())
            }
        }
    }
}

// ── Service facade ───────────────────────────────────────────────────

/// Cloneable handle over a provider plus the shared suggestion cache.
pub struct MapsService<P> {
    provider: Arc<P>,
    cache: Arc<SuggestionCache>,
}

impl<P> Clone for MapsService<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<P: MapsProvider> MapsService<P> {
    pub fn new(provider: P, search: &SearchConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            cache: Arc::new(SuggestionCache::new(search.cache_ttl)),
        }
    }

    /// Suggestions for `input`, served from cache while fresh.
    ///
    /// Only non-empty lists are cached, so a place that starts matching
    /// later is not hidden behind a stale empty result.
    pub async fn suggestions(
        &self,
        input: &str,
        session_token: &str,
    ) -> Result<Arc<Vec<Suggestion>>, CoreError> {
        if let Some(hit) = self.cache.get(input) {
            debug!(input, "suggestion cache hit");
            return Ok(hit);
        }

        let items = Arc::new(
            self.provider
                .suggest(input, session_token)
                .await
                .inspect_err(|e| warn!(input, error = %e, "suggestion lookup failed"))?,
        );
        if !items.is_empty() {
            self.cache.insert(input, Arc::clone(&items));
        }
        Ok(items)
    }

    pub async fn geocode(&self, address: &str) -> Result<Option<Place>, CoreError> {
        let place = self
            .provider
            .geocode(address)
            .await
            .inspect_err(|e| warn!(address, error = %e, "geocoding failed"))?;
        match &place {
            Some(p) => info!(address, location = %p.location, "address resolved"),
            None => warn!(address, "address has no geocoding results"),
        }
        Ok(place)
    }

    pub async fn directions(
        &self,
        origin: LatLng,
        destination: LatLng,
    ) -> Result<Option<Route>, CoreError> {
        let route = self
            .provider
            .route(origin, destination)
            .await
            .inspect_err(|e| warn!(%origin, %destination, error = %e, "directions failed"))?;
        match &route {
            Some(r) => info!(distance = %r.distance_text, duration = %r.duration_text, "route found"),
            None => warn!(%origin, %destination, "no driving route"),
        }
        Ok(route)
    }

    pub async fn locate(&self) -> Result<LatLng, CoreError> {
        let position = self
            .provider
            .locate()
            .await
            .inspect_err(|e| warn!(error = %e, "geolocation failed"))?;
        info!(%position, "user located");
        Ok(position)
    }

    pub fn cache(&self) -> &SuggestionCache {
        &self.cache
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}
