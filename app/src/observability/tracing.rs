use std::{error::Error, io::stdout};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use petfinder_application::infrastructure_config::{Config, LogFormat};

/// HTTP client internals are only interesting when asked for explicitly.
const QUIET_DEPENDENCIES: &str = "hyper_util=warn,reqwest=warn,rustls=warn";

pub fn setup_logging(config: &Config) -> Result<(), Box<dyn Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},{QUIET_DEPENDENCIES}", config.logging.level))
    });

    match config.logging.format {
        LogFormat::Json => {
            let formatting_layer = BunyanFormattingLayer::new("petfinder-app".to_string(), stdout);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(JsonStorageLayer)
                .with(formatting_layer)
                .try_init()?;
        }
        LogFormat::Pretty => {
            let format = fmt::format().with_target(true).compact();

            let mut subscriber = tracing_subscriber::fmt()
                .event_format(format)
                .with_env_filter(env_filter);

            if config.logging.include_location {
                subscriber = subscriber.with_file(true).with_line_number(true);
            }

            subscriber
                .try_init()
                .map_err(|e| -> Box<dyn Error> { e })?;
        }
    }

    Ok(())
}
