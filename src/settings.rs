//! Routing settings.
//!
//! Settings can be built in code, loaded from JSON, or overridden field by
//! field on the [`DispatcherBuilder`](crate::DispatcherBuilder).
//!
//! ```
//! use routewire::RoutingSettings;
//!
//! let settings = RoutingSettings::from_json(r#"{ "verbose_error_messages": true }"#).unwrap();
//! assert!(settings.verbose_error_messages);
//! assert_eq!(settings.max_concurrent_requests, 256);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, RouteError};

/// Default maximum number of requests a dispatcher runs at once.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 256;

/// Settings shared by the default handlers and the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingSettings {
    /// Append the error text to 500 responses.
    pub verbose_error_messages: bool,
    /// Requests beyond this limit are refused with `CapacityExceeded`.
    pub max_concurrent_requests: usize,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            verbose_error_messages: false,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

impl RoutingSettings {
    /// Parse settings from JSON; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or a field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the settings are usable by a dispatcher.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_requests == 0 {
            return Err(RouteError::Config(
                "max_concurrent_requests must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
