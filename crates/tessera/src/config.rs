//! Service configuration.
//!
//! Configuration is read from TOML. Every key is optional; missing keys take
//! their defaults.
//!
//! ```toml
//! [pagination]
//! default_per_page = 20
//! max_per_page = 200
//! ```
//!
//! ```
//! use tessera::ServiceConfig;
//!
//! let config = ServiceConfig::from_toml_str("[pagination]\ndefault_per_page = 20\n")?;
//! assert_eq!(config.pagination.default_per_page, 20);
//! assert_eq!(config.pagination.max_per_page, 500);
//! # Ok::<(), tessera::ConfigError>(())
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tessera_core::{PageRequest, StoreError, StoreResult, DEFAULT_PER_PAGE, MAX_PER_PAGE};

use crate::error::{ConfigError, ConfigResult, WidgetResult};

/// Top-level service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Paging limits for widget listings.
    pub pagination: PaginationConfig,
}

/// Paging limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationConfig {
    /// Page size used when the caller does not ask for one.
    pub default_per_page: u32,
    /// Largest page size a caller may ask for. Never above the store limit.
    pub max_per_page: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
        }
    }
}

impl PaginationConfig {
    /// Check the limits against each other and the store limit.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_per_page == 0 || self.max_per_page > MAX_PER_PAGE {
            return Err(ConfigError::invalid(
                "pagination.max_per_page",
                format!("must be within 1..={MAX_PER_PAGE}"),
            ));
        }
        if self.default_per_page == 0 || self.default_per_page > self.max_per_page {
            return Err(ConfigError::invalid(
                "pagination.default_per_page",
                format!("must be within 1..={}", self.max_per_page),
            ));
        }
        Ok(())
    }

    /// The request used when the caller does not send one.
    ///
    /// Fails if `default_per_page` is outside the store's page size bounds.
    pub fn default_request(&self) -> StoreResult<PageRequest> {
        PageRequest::new(0, self.default_per_page)
    }

    /// Resolve the caller's request against these limits.
    pub fn resolve(&self, request: Option<PageRequest>) -> WidgetResult<PageRequest> {
        let Some(request) = request else {
            return Ok(self.default_request()?);
        };
        if request.per_page() > self.max_per_page {
            return Err(StoreError::invalid_page_request(format!(
                "per_page {} exceeds the configured maximum of {}",
                request.per_page(),
                self.max_per_page
            ))
            .into());
        }
        Ok(request)
    }
}

impl ServiceConfig {
    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(target: "tessera::config", path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// Check every section.
    pub fn validate(&self) -> ConfigResult<()> {
        self.pagination.validate()
    }
}
