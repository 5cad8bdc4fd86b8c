use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - API base URL is set and the timeout is not 0
/// - At least one catalog page is configured
/// - Disclosure reveals at least one item per step
/// - Drag threshold and item geometry are not negative
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.api.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "api.base_url cannot be empty".to_string(),
        ));
    }
    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "api.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.catalog.pages.is_empty() {
        return Err(ConfigError::ValidationError(
            "catalog.pages cannot be empty".to_string(),
        ));
    }

    if config.disclosure.load_more_count == 0 {
        return Err(ConfigError::ValidationError(
            "disclosure.load_more_count cannot be 0".to_string(),
        ));
    }

    let drag = &config.drag;
    if drag.threshold_px < 0.0 || drag.item_width < 0.0 || drag.gap < 0.0 {
        return Err(ConfigError::ValidationError(
            "drag.threshold_px, drag.item_width and drag.gap cannot be negative".to_string(),
        ));
    }

    Ok(())
}
