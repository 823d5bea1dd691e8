use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReverseGeocodeQuery {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchAddressQuery {
    pub q: String,
    /// Maximum number of matches, 1 to 20, default 5.
    pub limit: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeocodedAddress {
    pub display_name: String,
    pub city: Option<String>,
    /// ISO 3166-1 alpha-2, lowercase.
    pub country_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddressList {
    pub items: Vec<GeocodedAddress>,
}
