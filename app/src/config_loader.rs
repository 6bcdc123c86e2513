use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use petfinder_application::error::{AppError, AppResult};
use petfinder_application::infrastructure_config::Config;
use std::fs;
use std::path::Path;
use tracing::info;

/// Unprefixed names used by the hosted Supabase dashboard snippets.
const SUPABASE_ENV_KEYS: [&str; 2] = ["SUPABASE_URL", "SUPABASE_ANON_KEY"];

pub fn load_config() -> AppResult<Config> {
    generate_env_template_if_missing()?;

    let config: Config = layered_figment()
        .extract()
        .map_err(|e| AppError::ConfigError {
            message: format!("Failed to load configuration: {e}"),
        })?;

    config.validate()?;
    Ok(config)
}

fn layered_figment() -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if Path::new("config.toml").exists() {
        figment = figment.merge(Toml::file("config.toml"));
    }

    if Path::new("config.json").exists() {
        figment = figment.merge(Json::file("config.json"));
    }

    figment
        .merge(Env::prefixed("PETFINDER_").split("__"))
        .merge(
            Env::raw()
                .only(&SUPABASE_ENV_KEYS)
                .map(|key| key.as_str().replacen('_', ".", 1).into()),
        )
}

fn generate_env_template_if_missing() -> AppResult<()> {
    let env_file = ".env";
    let template_file = ".env.example";

    if Path::new(env_file).exists() || !Path::new(template_file).exists() {
        return Ok(());
    }

    fs::copy(template_file, env_file).map_err(|e| AppError::ConfigError {
        message: format!("Failed to generate .env file from template: {e}"),
    })?;

    info!("Generated .env from template. Fill in SUPABASE_URL and SUPABASE_ANON_KEY.");
    Ok(())
}
