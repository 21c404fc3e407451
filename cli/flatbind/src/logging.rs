//! Log subscriber setup.

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install the stderr subscriber once per process. `FLATBIND_LOG` wins over
/// `RUST_LOG`; with neither set, flatbind crates log at `info`.
pub fn init_logging(verbose: bool) {
    INIT.call_once(|| {
        let default = if verbose {
            "flatbind=debug,flatbind_core=debug"
        } else {
            "flatbind=info,flatbind_core=info"
        };
        let env_filter = EnvFilter::try_from_env("FLATBIND_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new(default));

        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .init();
    });
}
