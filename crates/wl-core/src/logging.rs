//! Logging setup.
//!
//! Day-to-day output is plain stdout/stderr lines with bracketed tags
//! (`[REGISTRY]`, `[WEBHOOK]`). The `tracing` feature layers a structured
//! subscriber on top for deployments that want `RUST_LOG` control.

use crate::Result;

pub fn init(service_name: &str) -> Result<()> {
    let _ = service_name;

    #[cfg(feature = "tracing")]
    {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("info,wl_core=info,{service_name}=info"))
        });

        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(true)
            .init();
    }

    Ok(())
}
