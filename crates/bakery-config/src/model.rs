use std::{env, path::PathBuf};

use bakery_domain::TransitionPolicy;
use serde::{de::Deserializer, Deserialize, Serialize};

use crate::ConfigError;

/// Overrides the root directory holding config and data.
pub const HOME_ENV_VAR: &str = "BAKERY_LEDGER_HOME";
const DEFAULT_HOME_DIR: &str = ".bakery_ledger";
/// Longest monthly series the summary will build.
pub const MAX_TRAILING_MONTHS: usize = 120;

/// Stores back-office preferences and reporting tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "Config::default_currency_label")]
    pub currency_label: String,
    #[serde(default, deserialize_with = "lenient_policy")]
    pub transition_policy: TransitionPolicy,
    #[serde(default = "Config::default_trailing_months")]
    pub trailing_months: usize,
    #[serde(default = "Config::default_top_products_limit")]
    pub top_products_limit: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for record files. Defaults to `<home>/data`.
    pub data_dir: Option<PathBuf>,

    #[serde(default = "Config::default_log_filter")]
    pub log_filter: String,

    /// Tokens the back office accepts. Empty means local requests are trusted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub admin_tokens: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_label: Self::default_currency_label(),
            transition_policy: TransitionPolicy::default(),
            trailing_months: Self::default_trailing_months(),
            top_products_limit: Self::default_top_products_limit(),
            data_dir: None,
            log_filter: Self::default_log_filter(),
            admin_tokens: Vec::new(),
        }
    }
}

impl Config {
    pub fn default_currency_label() -> String {
        "Rs".into()
    }

    pub fn default_trailing_months() -> usize {
        12
    }

    pub fn default_top_products_limit() -> usize {
        10
    }

    pub fn default_log_filter() -> String {
        "bakery_ledger=info,bakery_core=info,bakery_storage_json=warn".into()
    }

    /// `$BAKERY_LEDGER_HOME`, else `~/.bakery_ledger`.
    pub fn resolve_home_dir() -> PathBuf {
        if let Some(home) = env::var_os(HOME_ENV_VAR).filter(|value| !value.is_empty()) {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_HOME_DIR)
    }

    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(path) = &self.data_dir {
            return path.clone();
        }

        Self::resolve_home_dir().join("data")
    }

    /// Rejects values the reporting layer cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.currency_label.trim().is_empty() {
            return Err(ConfigError::Invalid("currencyLabel must not be empty".into()));
        }
        if !(1..=MAX_TRAILING_MONTHS).contains(&self.trailing_months) {
            return Err(ConfigError::Invalid(format!(
                "trailingMonths must be between 1 and {}, got {}",
                MAX_TRAILING_MONTHS, self.trailing_months
            )));
        }
        if self.top_products_limit == 0 {
            return Err(ConfigError::Invalid("topProductsLimit must be at least 1".into()));
        }
        if self.admin_tokens.iter().any(|token| token.trim().is_empty()) {
            return Err(ConfigError::Invalid("adminTokens must not contain blank tokens".into()));
        }
        Ok(())
    }

    /// Formats an amount with the configured currency label.
    pub fn format_amount(&self, amount: f64) -> String {
        format!("{} {:.2}", self.currency_label, amount)
    }
}

fn lenient_policy<'de, D>(deserializer: D) -> Result<TransitionPolicy, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(
        match value.as_deref().map(str::trim).map(str::to_ascii_lowercase) {
            Some(policy) if policy == "permissive" => TransitionPolicy::Permissive,
            _ => TransitionPolicy::Strict,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"currencyLabel": "LKR"}"#).unwrap();
        assert_eq!(cfg.currency_label, "LKR");
        assert_eq!(cfg.transition_policy, TransitionPolicy::Strict);
        assert_eq!(cfg.trailing_months, 12);
        assert_eq!(cfg.top_products_limit, 10);
        assert!(cfg.log_filter.starts_with("bakery_ledger=info"));
        assert!(cfg.admin_tokens.is_empty());
    }

    #[test]
    fn blank_admin_tokens_are_rejected() {
        let cfg: Config = serde_json::from_str(r#"{"adminTokens": ["s3cret", " "]}"#).unwrap();
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
        let cfg: Config = serde_json::from_str(r#"{"adminTokens": ["s3cret"]}"#).unwrap();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn unknown_policy_falls_back_to_strict() {
        let cfg: Config = serde_json::from_str(r#"{"transitionPolicy": "anything"}"#).unwrap();
        assert_eq!(cfg.transition_policy, TransitionPolicy::Strict);
        let cfg: Config = serde_json::from_str(r#"{"transitionPolicy": " Permissive "}"#).unwrap();
        assert_eq!(cfg.transition_policy, TransitionPolicy::Permissive);
    }

    #[test]
    fn explicit_data_dir_wins() {
        let cfg = Config {
            data_dir: Some(PathBuf::from("/srv/bakery")),
            ..Config::default()
        };
        assert_eq!(cfg.resolve_data_dir(), PathBuf::from("/srv/bakery"));
        assert_eq!(cfg.format_amount(1250.5), "Rs 1250.50");
    }

    #[test]
    fn validate_rejects_unusable_tunables() {
        assert!(Config::default().validate().is_ok());

        let zero_months = Config {
            trailing_months: 0,
            ..Config::default()
        };
        assert!(matches!(zero_months.validate(), Err(ConfigError::Invalid(_))));

        let no_products = Config {
            top_products_limit: 0,
            ..Config::default()
        };
        assert!(no_products.validate().is_err());

        let blank_label = Config {
            currency_label: "  ".into(),
            ..Config::default()
        };
        assert!(blank_label.validate().is_err());
    }
}
