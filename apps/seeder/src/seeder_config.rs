use std::env;
use std::time::Duration;

use pulse_core::{AppError, AppResult};
use tracing_subscriber::EnvFilter;
use url::Url;

const DEFAULT_POSTHOG_HOST: &str = "https://eu.i.posthog.com";

#[derive(Debug, Clone)]
pub struct SeederConfig {
    pub posthog_host: String,
    pub posthog_server_key: String,
    pub pause: Duration,
}

impl SeederConfig {
    pub fn load() -> AppResult<Self> {
        let posthog_host = env::var("POSTHOG_HOST")
            .map(|value| value.trim().to_owned())
            .unwrap_or_else(|_| DEFAULT_POSTHOG_HOST.to_owned());
        Url::parse(posthog_host.as_str())
            .map_err(|error| AppError::Validation(format!("invalid POSTHOG_HOST: {error}")))?;

        let posthog_server_key = required_non_empty_env("POSTHOG_SERVER_KEY")?;
        let pause = Duration::from_millis(parse_env_u64("SEED_PAUSE_MS", 150)?);

        Ok(Self {
            posthog_host,
            posthog_server_key,
            pause,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_non_empty_env(name: &str) -> AppResult<String> {
    let value = env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value.trim().to_owned())
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
