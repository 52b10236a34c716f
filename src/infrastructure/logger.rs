use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, time::UtcTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static INIT: Once = Once::new();

pub struct Logger;

impl Logger {
    /// Initialize the global tracing subscriber. `RUST_LOG` overrides the
    /// configured level. Safe to call more than once.
    pub fn init(level: &str) {
        INIT.call_once(|| {
            let level = match level.to_lowercase().as_str() {
                "trace" => Level::TRACE,
                "debug" => Level::DEBUG,
                "info" => Level::INFO,
                "warn" => Level::WARN,
                "error" => Level::ERROR,
                _ => Level::INFO,
            };

            let env_filter = EnvFilter::new(
                std::env::var("RUST_LOG")
                    .unwrap_or_else(|_| format!("chatpay={level},actix_web=info")),
            );

            let console_layer = fmt::layer()
                .with_timer(UtcTime::rfc_3339())
                .with_target(true)
                .with_writer(std::io::stdout);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .init();
        });
    }
}
