//! Runtime settings (layered: code > env > defaults).

/// Number of prior messages fed to a turn when nothing overrides it.
pub const DEFAULT_MAX_HISTORY: usize = 10;

/// Environment variable overriding [`AgentSettings::max_history`].
pub const MAX_HISTORY_ENV: &str = "SWITCHYARD_MAX_HISTORY";

/// Turn-level settings for an [`Agent`](crate::agent::Agent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    /// How many of the most recent incoming messages a turn keeps.
    pub max_history: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}

impl AgentSettings {
    /// Load from environment variables, honoring a `.env` file if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Invalid or zero values
    /// fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        if let Some(raw) = lookup(MAX_HISTORY_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(value) if value > 0 => settings.max_history = value,
                _ => tracing::warn!(
                    variable = MAX_HISTORY_ENV,
                    value = %raw,
                    "ignoring invalid history window"
                ),
            }
        }
        settings
    }

    /// Set the history window. Zero is not a usable window and falls back
    /// to [`DEFAULT_MAX_HISTORY`].
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = if max_history == 0 {
            DEFAULT_MAX_HISTORY
        } else {
            max_history
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_overrides_default_window() {
        let settings = AgentSettings::from_lookup(|key| {
            (key == MAX_HISTORY_ENV).then(|| "4".to_string())
        });
        assert_eq!(settings.max_history, 4);
    }

    #[test]
    fn invalid_values_keep_default() {
        for raw in ["zero", "0", "-3", ""] {
            let settings = AgentSettings::from_lookup(|_| Some(raw.to_string()));
            assert_eq!(settings.max_history, DEFAULT_MAX_HISTORY, "value {raw:?}");
        }
    }

    #[test]
    fn zero_window_from_code_keeps_default() {
        let settings = AgentSettings::default().with_max_history(3).with_max_history(0);
        assert_eq!(settings.max_history, DEFAULT_MAX_HISTORY);
    }

    #[test]
    fn missing_variable_keeps_default() {
        assert_eq!(AgentSettings::from_lookup(|_| None), AgentSettings::default());
    }
}
