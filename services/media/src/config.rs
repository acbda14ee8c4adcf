use serde::Deserialize;

/// Main configuration for the media service
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,
    /// S3 configuration
    pub s3: S3Config,
    /// Rekognition configuration
    #[serde(default)]
    pub rekognition: RekognitionConfig,
    /// API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Service name for logging/metrics
    #[serde(default = "default_service_name")]
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Metrics port
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

/// S3 storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    /// Bucket holding the images
    pub bucket: String,
    /// Prefix for public image URLs; the object key is appended as-is
    pub public_base_url: String,
    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint URL (for MinIO, LocalStack, etc.)
    pub endpoint_url: Option<String>,
    /// Force path-style access (required for MinIO)
    #[serde(default)]
    pub force_path_style: bool,
}

/// Rekognition configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RekognitionConfig {
    /// AWS region, defaults to the S3 region
    pub region: Option<String>,
    /// Custom endpoint URL
    pub endpoint_url: Option<String>,
}

/// HTTP API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// API listen address
    #[serde(default = "default_api_host")]
    pub host: String,
    /// API listen port
    #[serde(default = "default_api_port")]
    pub port: u16,
    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
    /// Allowed CORS origins (empty = any)
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Maximum accepted upload body in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

// Default value functions
fn default_service_name() -> String {
    "media-service".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024 // 10MB
}

impl Config {
    /// Load configuration from config files and environment
    pub fn load() -> anyhow::Result<Self> {
        let config = Self::builder()?
            .add_source(config::File::with_name("config/media").required(false))
            .add_source(config::File::with_name("/etc/media/media").required(false))
            // Override with environment variables
            // MEDIA__S3__BUCKET -> s3.bucket
            .add_source(
                config::Environment::with_prefix("MEDIA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize().map_err(Into::into)
    }

    /// Builder seeded with the service defaults
    fn builder() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(config::Config::builder()
            .set_default("service.name", "media-service")?
            .set_default("service.log_level", "info")?
            .set_default("service.metrics_port", 9090)?)
    }

    /// Region used for Rekognition calls
    pub fn rekognition_region(&self) -> &str {
        self.rekognition.region.as_deref().unwrap_or(&self.s3.region)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
            metrics_port: default_metrics_port(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            cors_enabled: default_true(),
            cors_origins: Vec::new(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn load_from_toml(toml: &str) -> anyhow::Result<Config> {
        let config = Config::builder()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    #[test]
    fn test_default_values() {
        assert_eq!(default_api_port(), 8080);
        assert_eq!(default_region(), "us-east-1");
        assert_eq!(default_max_upload_bytes(), 10 * 1024 * 1024);
    }

    #[test]
    fn test_minimal_config() {
        let config = load_from_toml(
            r#"
            [s3]
            bucket = "images"
            public_base_url = "https://images.s3.amazonaws.com/"
            "#,
        )
        .unwrap();

        assert_eq!(config.service.name, "media-service");
        assert_eq!(config.service.metrics_port, 9090);
        assert_eq!(config.s3.bucket, "images");
        assert_eq!(config.s3.region, "us-east-1");
        assert!(!config.s3.force_path_style);
        assert!(config.api.cors_enabled);
        assert!(config.api.cors_origins.is_empty());
        assert_eq!(config.rekognition_region(), "us-east-1");
    }

    #[test]
    fn test_rekognition_region_override() {
        let config = load_from_toml(
            r#"
            [s3]
            bucket = "images"
            public_base_url = "http://localhost:9000/images/"
            region = "eu-west-1"
            endpoint_url = "http://localhost:9000"
            force_path_style = true

            [rekognition]
            region = "us-west-2"

            [api]
            port = 9000
            cors_origins = ["http://localhost:3000"]
            "#,
        )
        .unwrap();

        assert_eq!(config.s3.endpoint_url.as_deref(), Some("http://localhost:9000"));
        assert!(config.s3.force_path_style);
        assert_eq!(config.rekognition_region(), "us-west-2");
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.api.cors_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn test_missing_bucket_is_rejected() {
        let result = load_from_toml(
            r#"
            [s3]
            public_base_url = "https://images.s3.amazonaws.com/"
            "#,
        );
        assert!(result.is_err());
    }
}
