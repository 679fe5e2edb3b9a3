use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,clim=debug";

/// Initialize structured JSON logging for the climate API.
/// RUST_LOG is respected when it parses; otherwise "info,clim=debug".
pub fn init(service_name: &str) {
    let requested = std::env::var("RUST_LOG").ok();
    let directives = filter_directives(requested.as_deref());

    tracing_subscriber::registry()
        .with(EnvFilter::new(&directives))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    if requested.as_deref().is_some_and(|r| r != directives) {
        tracing::warn!(requested = ?requested, "Ignoring unparseable RUST_LOG");
    }
    tracing::info!(service = %service_name, filter = %directives, "Logging initialized");
}

/// Pick the filter directives, falling back to the default when the
/// requested ones are empty or invalid
fn filter_directives(requested: Option<&str>) -> String {
    match requested.map(str::trim) {
        Some(raw) if !raw.is_empty() && EnvFilter::try_new(raw).is_ok() => raw.to_string(),
        _ => DEFAULT_FILTER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_when_unset_or_blank() {
        assert_eq!(filter_directives(None), DEFAULT_FILTER);
        assert_eq!(filter_directives(Some("  ")), DEFAULT_FILTER);
    }

    #[test]
    fn valid_directives_kept() {
        assert_eq!(
            filter_directives(Some("warn,clim_db=trace")),
            "warn,clim_db=trace"
        );
    }

    #[test]
    fn invalid_directives_fall_back() {
        assert_eq!(filter_directives(Some("clim_db=loudest")), DEFAULT_FILTER);
    }
}
