//! Navigator configuration.

use std::path::Path;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::index::{IndexMapper, wrap};
use crate::intent::ClickZones;

/// Configuration for one spread navigator.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct NavigatorConfig {
    /// Path prefix of the page images; `_0001.webp` etc. is appended.
    pub base_path: String,

    /// Number of pages in the sequence.
    #[builder(default = "0")]
    #[serde(default)]
    pub total_count: usize,

    /// Absolute number of the first page.
    #[builder(default = "1")]
    #[serde(default = "default_first_index")]
    pub first_index: i64,

    /// Absolute page to start on (None = first page).
    #[builder(default)]
    #[serde(default)]
    pub initial_index: Option<i64>,

    /// Image file extension.
    #[builder(default = "default_extension()")]
    #[serde(default = "default_extension")]
    pub extension: String,

    /// How many pages ahead to prefetch after each transition.
    #[builder(default = "3")]
    #[serde(default = "default_prefetch_radius")]
    pub prefetch_radius: usize,

    /// Enable wheel zoom.
    #[builder(default = "false")]
    #[serde(default)]
    pub zoom_enabled: bool,

    /// Zoom change per wheel event.
    #[builder(default = "0.2")]
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f32,

    /// Lower bound for the maximum zoom level.
    #[builder(default = "3.0")]
    #[serde(default = "default_min_max_zoom")]
    pub min_max_zoom: f32,

    /// Duration of the incoming fade, in milliseconds.
    #[builder(default = "200")]
    #[serde(default = "default_fade_in_ms")]
    pub fade_in_ms: u64,

    /// Duration of the outgoing slide, in milliseconds.
    #[builder(default = "400")]
    #[serde(default = "default_slide_out_ms")]
    pub slide_out_ms: u64,

    /// Click zone mapping for the two halves of the display.
    #[builder(default)]
    #[serde(default)]
    pub click_zones: ClickZones,
}

fn default_first_index() -> i64 {
    1
}

fn default_extension() -> String {
    "webp".to_string()
}

fn default_prefetch_radius() -> usize {
    3
}

fn default_zoom_step() -> f32 {
    0.2
}

fn default_min_max_zoom() -> f32 {
    3.0
}

fn default_fade_in_ms() -> u64 {
    200
}

fn default_slide_out_ms() -> u64 {
    400
}

impl NavigatorConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.base_path {
            Some(ref base) if base.is_empty() => {
                return Err("Base path cannot be empty".to_string());
            }
            None => return Err("Base path is required".to_string()),
            _ => {}
        }
        if let Some(first) = self.first_index {
            if first < 0 {
                return Err(format!("First index must not be negative, got {first}"));
            }
        }
        let first = self.first_index.unwrap_or_else(default_first_index);
        let total = self.total_count.unwrap_or_default();
        let last = i64::try_from(total).ok().and_then(|total| first.checked_add(total));
        if last.is_none() {
            return Err(format!(
                "Page numbers overflow: first index {first} with {total} pages"
            ));
        }
        if let Some(step) = self.zoom_step {
            if !(step > 0.0) {
                return Err(format!("Zoom step must be positive, got {step}"));
            }
        }
        if let Some(max) = self.min_max_zoom {
            if !(max >= 1.0) {
                return Err(format!("Maximum zoom must be at least 1.0, got {max}"));
            }
        }
        Ok(())
    }
}

impl NavigatorConfig {
    /// Create a new config builder.
    pub fn builder() -> NavigatorConfigBuilder {
        NavigatorConfigBuilder::default()
    }

    /// Create a config with defaults for everything but the sequence itself.
    pub fn new(base_path: impl Into<String>, total_count: usize) -> Self {
        Self {
            base_path: base_path.into(),
            total_count,
            first_index: default_first_index(),
            initial_index: None,
            extension: default_extension(),
            prefetch_radius: default_prefetch_radius(),
            zoom_enabled: false,
            zoom_step: default_zoom_step(),
            min_max_zoom: default_min_max_zoom(),
            fade_in_ms: default_fade_in_ms(),
            slide_out_ms: default_slide_out_ms(),
            click_zones: ClickZones::default(),
        }
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    /// Read a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Re-run builder validation on an already constructed config.
    pub fn check(&self) -> Result<(), ConfigError> {
        let builder = NavigatorConfigBuilder {
            base_path: Some(self.base_path.clone()),
            total_count: Some(self.total_count),
            first_index: Some(self.first_index),
            zoom_step: Some(self.zoom_step),
            min_max_zoom: Some(self.min_max_zoom),
            ..Default::default()
        };
        builder
            .validate()
            .map_err(|message| ConfigError::Invalid { message })
    }

    /// Index mapper for this sequence.
    pub fn mapper(&self) -> IndexMapper {
        IndexMapper::new(self.first_index, self.total_count)
    }

    /// Relative slot to start on.
    pub fn initial_relative(&self) -> usize {
        self.initial_index
            .and_then(|absolute| self.mapper().wrap_absolute(absolute))
            .unwrap_or(0)
    }

    /// URL of the image for a relative slot.
    pub fn url_for(&self, relative: usize) -> String {
        image_url(&self.base_path, self.mapper().to_absolute(relative), &self.extension)
    }

    pub fn fade_in(&self) -> Duration {
        Duration::from_millis(self.fade_in_ms)
    }

    pub fn slide_out(&self) -> Duration {
        Duration::from_millis(self.slide_out_ms)
    }
}

/// Build the URL of a page image: `{base_path}_{absolute:04}.{extension}`.
pub fn image_url(base_path: &str, absolute: i64, extension: &str) -> String {
    format!("{base_path}_{absolute:04}.{extension}")
}
