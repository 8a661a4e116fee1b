// config.rs
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub app_url: String,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    /// Smallest withdrawal the platform accepts, in paise (₹1,000 default).
    pub minimum_withdrawal: i64,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");
        let app_url =
            std::env::var("APP_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);

        let minimum_withdrawal = std::env::var("MINIMUM_WITHDRAWAL_PAISE")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(100_000);

        Config {
            database_url,
            app_url,
            jwt_secret,
            jwt_maxage: jwt_maxage.parse::<i64>().unwrap(),
            port,
            minimum_withdrawal,
        }
    }
}
