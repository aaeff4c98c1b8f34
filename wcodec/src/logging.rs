use std::env;

use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

/// Our crates log decode progress, everything else only warns.
const DEFAULT_FILTER: &str = "warn,wcodec=info,wcodec_chunk=debug,wcodec_defs=debug";

/// Installs a stderr logger. `RUST_LOG` directives are appended to the default filter.
pub fn init_logging() -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let mut filter = DEFAULT_FILTER.to_owned();
    if let Ok(env_filter) = env::var(EnvFilter::DEFAULT_ENV) {
        filter.push(',');
        filter.push_str(&env_filter);
    }

    let subscriber = Registry::default()
        .with(EnvFilter::new(filter))
        .with(fmt::layer().compact().with_writer(std::io::stderr));
    tracing::subscriber::set_global_default(subscriber)
}
