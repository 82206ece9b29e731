use crate::adapters::object_store::ListingMode;

pub const LIST_ALL_PAGES_ENV: &str = "FOLDER_MOVE_LIST_ALL_PAGES";
pub const MAX_KEYS_ENV: &str = "FOLDER_MOVE_MAX_KEYS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandlerConfig {
    pub listing_mode: ListingMode,
    /// Page size requested from the store; `None` keeps the service default.
    pub max_keys: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
    pub reason: &'static str,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid value '{}' for {}: {}",
            self.value, self.name, self.reason
        )
    }
}

impl std::error::Error for ConfigError {}

impl HandlerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let listing_mode = match lookup(LIST_ALL_PAGES_ENV) {
            None => ListingMode::FirstPage,
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "" | "0" | "false" | "no" => ListingMode::FirstPage,
                "1" | "true" | "yes" => ListingMode::AllPages,
                _ => {
                    return Err(ConfigError {
                        name: LIST_ALL_PAGES_ENV,
                        value,
                        reason: "expected true or false",
                    })
                }
            },
        };

        let max_keys = match lookup(MAX_KEYS_ENV) {
            None => None,
            Some(value) if value.trim().is_empty() => None,
            Some(value) => match value.trim().parse::<i32>() {
                Ok(parsed) if parsed > 0 => Some(parsed),
                _ => {
                    return Err(ConfigError {
                        name: MAX_KEYS_ENV,
                        value,
                        reason: "expected a positive integer",
                    })
                }
            },
        };

        Ok(Self {
            listing_mode,
            max_keys,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        move |name| values.get(name).cloned()
    }

    #[test]
    fn defaults_to_single_page_listing() {
        let config = HandlerConfig::from_lookup(lookup_from(&[])).expect("config should load");
        assert_eq!(config, HandlerConfig::default());
        assert_eq!(config.listing_mode, ListingMode::FirstPage);
        assert_eq!(config.max_keys, None);
    }

    #[test]
    fn reads_pagination_and_page_size() {
        let config = HandlerConfig::from_lookup(lookup_from(&[
            (LIST_ALL_PAGES_ENV, "TRUE"),
            (MAX_KEYS_ENV, " 250 "),
        ]))
        .expect("config should load");

        assert_eq!(config.listing_mode, ListingMode::AllPages);
        assert_eq!(config.max_keys, Some(250));
    }

    #[test]
    fn rejects_unrecognized_flag() {
        let error = HandlerConfig::from_lookup(lookup_from(&[(LIST_ALL_PAGES_ENV, "maybe")]))
            .expect_err("flag should be rejected");
        assert_eq!(error.name, LIST_ALL_PAGES_ENV);
        assert!(error.to_string().contains("maybe"));
    }

    #[test]
    fn rejects_non_positive_page_size() {
        for value in ["0", "-5", "lots"] {
            let error = HandlerConfig::from_lookup(lookup_from(&[(MAX_KEYS_ENV, value)]))
                .expect_err("page size should be rejected");
            assert_eq!(error.name, MAX_KEYS_ENV);
        }
    }
}
