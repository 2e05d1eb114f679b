use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::interface_adapters::state::AppState;

#[derive(Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

pub async fn get_geolocation(
    State(state): State<AppState>,
    Query(params): Query<Coordinates>,
) -> Json<String> {
    Json(state.geo.current_city(params.latitude, params.longitude).await)
}

pub async fn get_nearby_cities(
    State(state): State<AppState>,
    Query(params): Query<Coordinates>,
) -> Json<Vec<String>> {
    Json(state.geo.nearby_cities(params.latitude, params.longitude).await)
}
