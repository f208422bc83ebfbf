pub mod build_info;

use std::sync::Once;

use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Installs the global subscriber. `RUST_LOG` wins over `directives` when set;
/// output goes to stderr so stdout stays free for responses.
pub fn init_tracing(directives: &str) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            directives
                .split(',')
                .map(str::trim)
                .filter(|directive| !directive.is_empty())
                .filter_map(|directive| directive.parse::<Directive>().ok())
                .fold(EnvFilter::new("warn"), EnvFilter::add_directive)
        });

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
