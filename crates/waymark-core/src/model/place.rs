use super::geo::LatLng;

/// One autocomplete candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// Provider place id.
    pub id: String,
    pub primary_text: String,
    pub secondary_text: String,
    /// Full text; becomes the search box contents on selection.
    pub description: String,
}

/// A geocoded address.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub label: String,
    pub location: LatLng,
}
