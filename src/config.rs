use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub token_ttl_hours: i64,
    pub body_limit_bytes: usize,
    pub db_max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3000);
        let token_ttl_hours = parse_or("TOKEN_TTL_HOURS", 24);
        let body_limit_bytes = parse_or("APP_BODY_LIMIT_BYTES", 1024 * 1024);
        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", 10);
        Ok(Self {
            database_url,
            jwt_secret,
            host,
            port,
            token_ttl_hours,
            body_limit_bytes,
            db_max_connections,
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
