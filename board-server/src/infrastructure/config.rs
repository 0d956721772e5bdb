use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub media_path: PathBuf,
    pub thumbnail_path: PathBuf,
    pub cors_origins: Vec<String>,
    pub max_upload_bytes: usize,
    /// Extended board: posts carry a deletion secret and the delete
    /// route is mounted.
    pub require_secret: bool,
    /// When off, the reply route is not mounted (simple-board variant).
    pub enable_replies: bool,
    pub rate_limiting: bool,
}

const DEFAULT_MAX_UPLOAD: usize = 100 * 1024 * 1024;

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PORT: {}", e))?;
        let media_path =
            PathBuf::from(std::env::var("MEDIA_PATH").unwrap_or_else(|_| "media".into()));
        let thumbnail_path = PathBuf::from(
            std::env::var("THUMBNAIL_PATH").unwrap_or_else(|_| "thumbnails".into()),
        );
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let max_upload_bytes = match std::env::var("MAX_UPLOAD_BYTES") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid MAX_UPLOAD_BYTES: {}", e))?,
            Err(_) => DEFAULT_MAX_UPLOAD,
        };

        Ok(Self {
            host,
            port,
            media_path,
            thumbnail_path,
            cors_origins,
            max_upload_bytes,
            require_secret: env_flag("REQUIRE_SECRET", true),
            enable_replies: env_flag("ENABLE_REPLIES", true),
            rate_limiting: env_flag("RATE_LIMITING", true),
        })
    }

    /// Media and thumbnail directories are created up front, like the
    /// upload-folder bootstrap the board has always done.
    pub fn ensure_dirs(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.media_path)?;
        std::fs::create_dir_all(&self.thumbnail_path)?;
        Ok(())
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
