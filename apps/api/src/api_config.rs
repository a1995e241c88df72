use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use pulse_application::InsightModels;
use pulse_core::AppError;
use pulse_infrastructure::{DEFAULT_ANTHROPIC_MODEL, DEFAULT_LANGFUSE_HOST, DEFAULT_OPENAI_MODEL};
use tracing_subscriber::EnvFilter;
use url::Url;

const DEFAULT_POSTHOG_HOST: &str = "https://eu.i.posthog.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStoreKind {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsProviderConfig {
    Noop,
    /// Captured events are appended to the in-process event log.
    Memory,
    PostHog { host: String, server_key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmProviderConfig {
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangfuseConfig {
    pub host: String,
    pub public_key: String,
    pub secret_key: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: Option<String>,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub summary_store: SummaryStoreKind,
    pub analytics: AnalyticsProviderConfig,
    pub openai: Option<LlmProviderConfig>,
    pub anthropic: Option<LlmProviderConfig>,
    pub langfuse: Option<LangfuseConfig>,
    pub ai_evaluation_enabled: bool,
    pub insight_models: InsightModels,
    pub evaluation_model: Option<String>,
    pub aggregation_timeout: Option<Duration>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = optional_env("DATABASE_URL");
        if migrate_only && database_url.is_none() {
            return Err(AppError::Validation(
                "DATABASE_URL is required for migrate".to_owned(),
            ));
        }

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let summary_store = match env::var("SUMMARY_STORE")
            .unwrap_or_else(|_| "memory".to_owned())
            .as_str()
        {
            "memory" => SummaryStoreKind::Memory,
            "postgres" => {
                if database_url.is_none() {
                    return Err(AppError::Validation(
                        "SUMMARY_STORE=postgres requires DATABASE_URL".to_owned(),
                    ));
                }
                SummaryStoreKind::Postgres
            }
            other => {
                return Err(AppError::Validation(format!(
                    "SUMMARY_STORE must be either 'memory' or 'postgres', got '{other}'"
                )));
            }
        };

        let analytics = match env::var("ANALYTICS_PROVIDER")
            .unwrap_or_else(|_| "noop".to_owned())
            .as_str()
        {
            "noop" => AnalyticsProviderConfig::Noop,
            "memory" => AnalyticsProviderConfig::Memory,
            "posthog" => {
                let host = env::var("POSTHOG_HOST")
                    .unwrap_or_else(|_| DEFAULT_POSTHOG_HOST.to_owned());
                validate_url("POSTHOG_HOST", host.as_str())?;
                AnalyticsProviderConfig::PostHog {
                    host,
                    server_key: required_non_empty_env("POSTHOG_SERVER_KEY")?,
                }
            }
            other => {
                return Err(AppError::Validation(format!(
                    "ANALYTICS_PROVIDER must be one of 'noop', 'memory' or 'posthog', got '{other}'"
                )));
            }
        };

        let openai = optional_env("OPENAI_API_KEY").map(|api_key| LlmProviderConfig {
            api_key,
            model: optional_env("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_owned()),
        });
        let anthropic = optional_env("ANTHROPIC_API_KEY").map(|api_key| LlmProviderConfig {
            api_key,
            model: optional_env("ANTHROPIC_MODEL")
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_owned()),
        });

        let langfuse = match (
            optional_env("LANGFUSE_PUBLIC_KEY"),
            optional_env("LANGFUSE_SECRET_KEY"),
        ) {
            (Some(public_key), Some(secret_key)) => {
                let host = optional_env("LANGFUSE_HOST")
                    .unwrap_or_else(|| DEFAULT_LANGFUSE_HOST.to_owned());
                validate_url("LANGFUSE_HOST", host.as_str())?;
                Some(LangfuseConfig {
                    host,
                    public_key,
                    secret_key,
                })
            }
            _ => None,
        };

        let ai_evaluation_enabled = env::var("ENABLE_AI_EVALUATION")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");

        let insight_models = InsightModels {
            anomaly: optional_env("AI_ANOMALY_MODEL"),
            sql: optional_env("AI_SQL_MODEL"),
            pdr: optional_env("AI_PDR_MODEL"),
        };

        let evaluation_model = optional_env("AI_EVALUATION_MODEL");

        let aggregation_timeout = optional_env("AGGREGATION_TIMEOUT_MS")
            .map(|value| {
                value
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|error| {
                        AppError::Validation(format!("invalid AGGREGATION_TIMEOUT_MS: {error}"))
                    })
            })
            .transpose()?;

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            api_host,
            api_port,
            summary_store,
            analytics,
            openai,
            anthropic,
            langfuse,
            ai_evaluation_enabled,
            insight_models,
            evaluation_model,
            aggregation_timeout,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
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

fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value.trim().to_owned())
}

fn validate_url(name: &str, value: &str) -> Result<(), AppError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|error| AppError::Validation(format!("invalid {name}: {error}")))
}
