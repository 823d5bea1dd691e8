use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    /// ISO 3166-1 alpha-2 code, lowercase. Checkout rejects addresses elsewhere.
    pub supported_country: String,
    pub geocoder_url: String,
    pub geocoder_user_agent: String,
    pub static_dir: String,
    pub concurrency_limit: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_ttl_hours = env::var("JWT_TTL_HOURS")
            .ok()
            .and_then(|h| h.parse::<i64>().ok())
            .filter(|h| *h > 0)
            .unwrap_or(24);
        if chrono::Duration::try_hours(jwt_ttl_hours)
            .and_then(|ttl| chrono::Utc::now().checked_add_signed(ttl))
            .is_none()
        {
            anyhow::bail!("JWT_TTL_HOURS is out of range: {jwt_ttl_hours}");
        }
        let supported_country = env::var("SUPPORTED_COUNTRY")
            .map(|c| c.trim().to_lowercase())
            .unwrap_or_else(|_| "ru".to_string());
        let geocoder_url = env::var("GEOCODER_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string());
        let geocoder_user_agent = env::var("GEOCODER_USER_AGENT")
            .unwrap_or_else(|_| format!("marketplace-api/{}", env!("CARGO_PKG_VERSION")));
        let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string());
        let concurrency_limit = env::var("CONCURRENCY_LIMIT")
            .ok()
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(100);

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            jwt_ttl_hours,
            supported_country,
            geocoder_url,
            geocoder_user_agent,
            static_dir,
            concurrency_limit,
        })
    }
}
