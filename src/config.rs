//! CLI configuration

/// Defaults for `build`/`check`, overridable by flags
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub strict: bool,
    pub hub_scale: f64,
    pub analyses: bool,
    pub layout: Option<String>,
    pub warn_collisions: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            strict: false,
            hub_scale: 1.0,
            analyses: true,
            layout: None,
            warn_collisions: false,
        }
    }
}

impl CliConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("DGML_STRICT") {
            config.strict = matches!(v.as_str(), "1" | "true" | "yes");
        }

        if let Some(v) = lookup("DGML_HUB_SCALE") {
            if let Ok(scale) = v.parse() {
                config.hub_scale = scale;
            }
        }

        if let Some(v) = lookup("DGML_NO_ANALYSES") {
            config.analyses = !matches!(v.as_str(), "1" | "true" | "yes");
        }

        if let Some(v) = lookup("DGML_LAYOUT") {
            if !v.is_empty() {
                config.layout = Some(v);
            }
        }

        if let Some(v) = lookup("DGML_WARN_COLLISIONS") {
            config.warn_collisions = matches!(v.as_str(), "1" | "true" | "yes");
        }

        config
    }
}
