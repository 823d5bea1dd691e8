use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn, raw_pool},
    geocoding::GeocodingClient,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub geocoder: GeocodingClient,
}

impl AppState {
    pub fn new(orm: OrmConn, config: AppConfig) -> anyhow::Result<Self> {
        let geocoder = GeocodingClient::new(&config.geocoder_url, &config.geocoder_user_agent)?;
        Ok(Self {
            pool: raw_pool(&orm),
            orm,
            config: Arc::new(config),
            geocoder,
        })
    }
}
