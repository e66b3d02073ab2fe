use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
    pub reset_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    /// Origin the public menu lives at; encoded into generated QR codes.
    pub menu_base_url: String,
    /// Directory for the best-effort local fallback store.
    pub local_store_path: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "barmenu".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "barmenu-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
            reset_ttl_minutes: std::env::var("JWT_RESET_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(30),
        };
        let storage = StorageConfig {
            endpoint: std::env::var("MINIO_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:9000".into()),
            bucket: std::env::var("MINIO_BUCKET").unwrap_or_else(|_| "public".into()),
            access_key: std::env::var("MINIO_ACCESS_KEY")?,
            secret_key: std::env::var("MINIO_SECRET_KEY")?,
            region: std::env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".into()),
        };
        let menu_base_url = std::env::var("MENU_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".into());
        let local_store_path =
            std::env::var("LOCAL_STORE_PATH").unwrap_or_else(|_| ".localstore".into());
        Ok(Self {
            database_url,
            jwt,
            storage,
            menu_base_url,
            local_store_path,
        })
    }
}
