//! Shared domain types and configuration for the donation-transparency
//! scraping workspace.

pub mod app_config;
pub mod campaign;
pub mod config;
pub mod social;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use campaign::{progress_percent, CampaignSnapshot, CampaignStatus};
pub use config::{load_app_config, load_app_config_from_env};
pub use social::{
    ExtractionResult, FollowerStore, FollowerUpdate, Platform, SocialNetworkRecord,
    UNSUPPORTED_PLATFORMS,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown platform: {0}")]
    UnknownPlatform(String),
}
