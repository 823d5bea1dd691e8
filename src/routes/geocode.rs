use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::geocode::{AddressList, GeocodedAddress, ReverseGeocodeQuery, SearchAddressQuery},
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reverse-geocode", get(reverse_geocode))
        .route("/search-address", get(search_address))
}

#[utoipa::path(
    get,
    path = "/api/v1/reverse-geocode",
    params(ReverseGeocodeQuery),
    responses(
        (status = 200, description = "Address at the coordinates", body = ApiResponse<GeocodedAddress>),
        (status = 400, description = "Coordinates out of range"),
        (status = 404, description = "No address at the coordinates"),
        (status = 502, description = "Geocoder failed"),
    ),
    tag = "Geocoding"
)]
pub async fn reverse_geocode(
    State(state): State<AppState>,
    Query(query): Query<ReverseGeocodeQuery>,
) -> AppResult<Json<ApiResponse<GeocodedAddress>>> {
    if !(-90.0..=90.0).contains(&query.lat) || !(-180.0..=180.0).contains(&query.lon) {
        return Err(AppError::BadRequest("coordinates are out of range".into()));
    }
    let address = state.geocoder.reverse(query.lat, query.lon).await?;
    Ok(Json(ApiResponse::success("OK", address, Some(Meta::empty()))))
}

#[utoipa::path(
    get,
    path = "/api/v1/search-address",
    params(SearchAddressQuery),
    responses(
        (status = 200, description = "Matching addresses", body = ApiResponse<AddressList>),
        (status = 400, description = "Empty query"),
        (status = 502, description = "Geocoder failed"),
    ),
    tag = "Geocoding"
)]
pub async fn search_address(
    State(state): State<AppState>,
    Query(query): Query<SearchAddressQuery>,
) -> AppResult<Json<ApiResponse<AddressList>>> {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(AppError::BadRequest("q is required".into()));
    }
    let limit = query.limit.unwrap_or(5).clamp(1, 20);
    let items = state.geocoder.search(q, limit).await?;
    let total = items.len() as i64;
    Ok(Json(ApiResponse::success(
        "OK",
        AddressList { items },
        Some(Meta::new(1, i64::from(limit), total)),
    )))
}
