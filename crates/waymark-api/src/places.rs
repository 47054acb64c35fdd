// Place Autocomplete endpoint
//
// Predictions for partially typed addresses. Requests sharing a session
// token are billed as a single search session.

use tracing::debug;

use crate::client::MapsClient;
use crate::error::Error;
use crate::models::{AutocompleteRequest, AutocompleteResponse};

impl MapsClient {
    /// Fetch predictions for a partial address.
    ///
    /// `GET /maps/api/place/autocomplete/json?input=...&sessiontoken=...`
    pub async fn autocomplete(
        &self,
        request: &AutocompleteRequest,
    ) -> Result<AutocompleteResponse, Error> {
        let url = self.maps_url("place/autocomplete/json")?;
        debug!(input = %request.input, "autocomplete");

        let mut params = vec![("input", request.input.as_str())];
        if let Some(token) = request.session_token.as_deref() {
            params.push(("sessiontoken", token));
        }
        if let Some(language) = request.language.as_deref() {
            params.push(("language", language));
        }
        self.get(url, &params).await
    }
}
