//! Prometheus exposition for a single CLI run.

use anyhow::{Context, Result};
use prometheus::{Encoder, Registry, TextEncoder};

/// Registry holding every core metric.
pub fn registry() -> Result<Registry> {
    let registry = Registry::new();
    tvshelf_core::metrics::register_all(&registry).context("Failed to register metrics")?;
    Ok(registry)
}

/// Encode all gathered metrics in the Prometheus text format.
pub fn encode(registry: &Registry) -> Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&registry.gather(), &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not valid UTF-8")
}
