use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::error::{AppError, AppResult};

/// Supabase's default access token lifetime. A refresh margin this large
/// would refresh on every tick.
const MAX_REFRESH_MARGIN_SECS: u64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub supabase: SupabaseConfig,
    pub site: SiteConfig,
    pub session: SessionConfig,
    pub query: QueryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: SecretString,
    pub avatar_bucket: String,
    pub profiles_table: String,
    pub request_timeout_secs: Option<u64>,
}

impl Serialize for SupabaseConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("SupabaseConfig", 5)?;
        state.serialize_field("url", &self.url)?;
        let anon_key = if self.anon_key.expose_secret().is_empty() {
            ""
        } else {
            "[REDACTED]"
        };
        state.serialize_field("anon_key", anon_key)?;
        state.serialize_field("avatar_bucket", &self.avatar_bucket)?;
        state.serialize_field("profiles_table", &self.profiles_table)?;
        state.serialize_field("request_timeout_secs", &self.request_timeout_secs)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for SupabaseConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct SupabaseConfigHelper {
            url: String,
            anon_key: String,
            avatar_bucket: String,
            profiles_table: String,
            request_timeout_secs: Option<u64>,
        }

        let helper = SupabaseConfigHelper::deserialize(deserializer)?;
        Ok(SupabaseConfig {
            url: helper.url,
            anon_key: SecretString::from(helper.anon_key),
            avatar_bucket: helper.avatar_bucket,
            profiles_table: helper.profiles_table,
            request_timeout_secs: helper.request_timeout_secs,
        })
    }
}

impl SupabaseConfig {
    #[must_use]
    pub fn anon_key(&self) -> &str {
        self.anon_key.expose_secret()
    }

    pub fn base_url(&self) -> AppResult<url::Url> {
        url::Url::parse(&self.url).map_err(|e| AppError::ConfigError {
            message: format!("Invalid Supabase URL '{}': {e}", self.url),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub site_url: String,
}

impl SiteConfig {
    pub fn site_url(&self) -> AppResult<url::Url> {
        url::Url::parse(&self.site_url).map_err(|e| AppError::ConfigError {
            message: format!("Invalid site URL '{}': {e}", self.site_url),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub refresh_margin_secs: u64,
    pub refresh_tick_secs: u64,
}

impl SessionConfig {
    #[must_use]
    pub fn refresh_margin(&self) -> Duration {
        Duration::seconds(i64::try_from(self.refresh_margin_secs).unwrap_or(i64::MAX))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub stale_time_secs: u64,
    pub gc_time_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub include_location: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogFormat {
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "pretty")]
    Pretty,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: SecretString::from(""),
            avatar_bucket: "avatars".to_string(),
            profiles_table: "profiles".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supabase: SupabaseConfig::default(),
            site: SiteConfig {
                site_url: "http://localhost:5173".to_string(),
            },
            session: SessionConfig {
                refresh_margin_secs: 90,
                refresh_tick_secs: 30,
            },
            query: QueryConfig {
                stale_time_secs: 5 * 60,
                gc_time_secs: 10 * 60,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Pretty,
                include_location: false,
            },
        }
    }
}

impl Config {
    pub fn validate(&self) -> AppResult<()> {
        if self.supabase.url.trim().is_empty() || self.supabase.anon_key().trim().is_empty() {
            return Err(AppError::ConfigError {
                message: "Missing Supabase environment variables".to_string(),
            });
        }

        self.supabase.base_url()?;
        self.site.site_url()?;

        if self.supabase.avatar_bucket.trim().is_empty() {
            return Err(AppError::ConfigError {
                message: "avatar_bucket cannot be empty".to_string(),
            });
        }

        if self.supabase.profiles_table.trim().is_empty() {
            return Err(AppError::ConfigError {
                message: "profiles_table cannot be empty".to_string(),
            });
        }

        if self.supabase.request_timeout_secs == Some(0) {
            return Err(AppError::ConfigError {
                message: "request_timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.session.refresh_tick_secs == 0 {
            return Err(AppError::ConfigError {
                message: "refresh_tick_secs must be greater than 0".to_string(),
            });
        }

        if self.session.refresh_margin_secs >= MAX_REFRESH_MARGIN_SECS {
            return Err(AppError::ConfigError {
                message: format!("refresh_margin_secs must be less than {MAX_REFRESH_MARGIN_SECS}"),
            });
        }

        if self.query.stale_time_secs > self.query.gc_time_secs {
            return Err(AppError::ConfigError {
                message: "stale_time_secs must be <= gc_time_secs".to_string(),
            });
        }

        Ok(())
    }
}
