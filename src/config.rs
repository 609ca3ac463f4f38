//! Configuration management for the Blind OCR server
//!
//! Built once at startup from the environment and handed to `AppState`.

use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::ocr::OcrProvider;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub ocr: OcrConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    pub provider: OcrProvider,
    pub tesseract_cmd: String,
    /// Tesseract language code (e.g. "eng", "eng+deu")
    pub language: String,
    pub ollama_url: String,
    pub ollama_model: String,
    /// Zoom factor used when rasterizing PDF pages
    pub render_scale: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
pub const MIN_RENDER_SCALE: f32 = 0.5;
pub const MAX_RENDER_SCALE: f32 = 4.0;

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            database: DatabaseConfig {
                url: "sqlite:./ocr_logs.db".to_string(),
                max_connections: 5,
            },
            ocr: OcrConfig::default(),
            admin: AdminConfig {
                username: "admin".to_string(),
                password: "admin123".to_string(),
            },
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        OcrConfig {
            provider: OcrProvider::Tesseract,
            tesseract_cmd: "tesseract".to_string(),
            language: "eng".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llava".to_string(),
            render_scale: 2.0,
        }
    }
}

impl Config {
    /// Read configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port),
                max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", defaults.server.max_upload_bytes),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: parse_var(
                    "DATABASE_MAX_CONNECTIONS",
                    defaults.database.max_connections,
                ),
            },
            ocr: OcrConfig {
                provider: match env::var("OCR_PROVIDER").ok().as_deref() {
                    Some("ollama") => OcrProvider::Ollama,
                    Some("tesseract") | None => OcrProvider::Tesseract,
                    Some(other) => {
                        tracing::warn!("Unknown OCR_PROVIDER '{}', using tesseract", other);
                        OcrProvider::Tesseract
                    }
                },
                tesseract_cmd: env::var("TESSERACT_CMD").unwrap_or(defaults.ocr.tesseract_cmd),
                language: env::var("OCR_LANGUAGE").unwrap_or(defaults.ocr.language),
                ollama_url: env::var("OLLAMA_URL").unwrap_or(defaults.ocr.ollama_url),
                ollama_model: env::var("OLLAMA_MODEL").unwrap_or(defaults.ocr.ollama_model),
                render_scale: parse_var::<f32>("PDF_RENDER_SCALE", defaults.ocr.render_scale)
                    .clamp(MIN_RENDER_SCALE, MAX_RENDER_SCALE),
            },
            admin: AdminConfig {
                username: env::var("ADMIN_USERNAME").unwrap_or(defaults.admin.username),
                password: env::var("ADMIN_PASSWORD").unwrap_or(defaults.admin.password),
            },
        }
    }
}

fn parse_var<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value '{}' for {}, using {}", raw, key, default);
            default
        }),
        Err(_) => default,
    }
}
