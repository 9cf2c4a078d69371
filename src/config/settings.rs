//! User settings for ynab-sensors
//!
//! Manages the configured budgets (one polling instance each), their
//! selection filters and refresh options, plus global polling preferences.
//! Older settings files are migrated to the current schema on load.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

use super::paths::SensorPaths;
use crate::error::{YnabError, YnabResult};
use crate::storage::file_io::write_json_private;
use crate::models::{currency_fraction_digits, currency_symbol, AccountId, BudgetId, CategoryId};

/// Schema version written by this build
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Default refresh interval in minutes
pub const DEFAULT_UPDATE_INTERVAL_MINUTES: u32 = 10;

/// Allowed refresh interval range in minutes
pub const MIN_UPDATE_INTERVAL_MINUTES: u32 = 5;
pub const MAX_UPDATE_INTERVAL_MINUTES: u32 = 60;

/// Which records of a kind to import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection<T> {
    /// Every record that passes the closed/hidden filters
    All,
    /// Only these ids
    Only(Vec<T>),
}

impl<T: PartialEq> Selection<T> {
    pub fn contains(&self, id: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.contains(id),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Self::All
    }
}

/// How "underfunded" is decided for a category with a goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnderfundedRule {
    /// Balance is below the goal target
    #[default]
    BalanceBelowTarget,
    /// YNAB still reports an amount left to fund the goal
    GoalOverallLeft,
}

/// Attention flag policy for categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AttentionPolicy {
    #[serde(default)]
    pub underfunded_rule: UnderfundedRule,

    /// Report Underfunded instead of Overspent when both apply
    #[serde(default)]
    pub underfunded_first: bool,
}

/// Per-budget refresh options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetOptions {
    #[serde(default = "default_update_interval")]
    pub update_interval_minutes: u32,

    #[serde(default)]
    pub include_closed_accounts: bool,

    #[serde(default)]
    pub include_hidden_categories: bool,
}

fn default_update_interval() -> u32 {
    DEFAULT_UPDATE_INTERVAL_MINUTES
}

impl Default for BudgetOptions {
    fn default() -> Self {
        Self {
            update_interval_minutes: default_update_interval(),
            include_closed_accounts: false,
            include_hidden_categories: false,
        }
    }
}

impl BudgetOptions {
    /// Refresh interval, clamped to the supported range
    pub fn update_interval(&self) -> Duration {
        let minutes = self
            .update_interval_minutes
            .clamp(MIN_UPDATE_INTERVAL_MINUTES, MAX_UPDATE_INTERVAL_MINUTES);
        Duration::from_secs(u64::from(minutes) * 60)
    }
}

/// One configured budget instance
#[derive(Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    pub budget_id: BudgetId,

    /// Name of the budget in YNAB
    pub budget_name: String,

    /// User-chosen instance name used in entity names
    pub instance_name: String,

    /// Personal access token
    pub access_token: String,

    #[serde(default)]
    pub accepted_terms: bool,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default)]
    pub selected_accounts: Selection<AccountId>,

    #[serde(default)]
    pub selected_categories: Selection<CategoryId>,

    #[serde(default)]
    pub options: BudgetOptions,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl fmt::Debug for BudgetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BudgetConfig")
            .field("budget_id", &self.budget_id)
            .field("budget_name", &self.budget_name)
            .field("instance_name", &self.instance_name)
            .field("access_token", &"<redacted>")
            .field("accepted_terms", &self.accepted_terms)
            .field("currency", &self.currency)
            .field("selected_accounts", &self.selected_accounts)
            .field("selected_categories", &self.selected_categories)
            .field("options", &self.options)
            .finish()
    }
}

impl BudgetConfig {
    /// Create a budget config with default selections and options
    pub fn new(
        budget_id: impl Into<BudgetId>,
        budget_name: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        let budget_name = budget_name.into();
        Self {
            budget_id: budget_id.into(),
            instance_name: budget_name.clone(),
            budget_name,
            access_token: access_token.into(),
            accepted_terms: true,
            currency: default_currency(),
            selected_accounts: Selection::All,
            selected_categories: Selection::All,
            options: BudgetOptions::default(),
        }
    }

    /// Instance name reduced to `[A-Za-z0-9_]`, used in entity ids and file names
    pub fn sanitized_instance_name(&self) -> String {
        sanitize_name(&self.instance_name)
    }

    pub fn currency_symbol(&self) -> &'static str {
        currency_symbol(&self.currency)
    }

    pub fn currency_fraction_digits(&self) -> u32 {
        currency_fraction_digits(&self.currency)
    }

    /// Validate the budget config
    pub fn validate(&self) -> YnabResult<()> {
        if self.budget_id.as_str().trim().is_empty() {
            return Err(YnabError::Validation("Budget id cannot be empty".into()));
        }
        if self.access_token.trim().is_empty() {
            return Err(YnabError::Validation("Access token cannot be empty".into()));
        }
        if !self.accepted_terms {
            return Err(YnabError::Validation(
                "Terms not accepted, please accept terms to continue".into(),
            ));
        }
        if self.sanitized_instance_name().is_empty() {
            return Err(YnabError::Validation(format!(
                "Instance name '{}' has no usable characters",
                self.instance_name
            )));
        }
        Ok(())
    }
}

/// Replace spaces with underscores and drop anything outside `[A-Za-z0-9_]`
pub fn sanitize_name(name: &str) -> String {
    name.replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Where loaded settings came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsOrigin {
    /// Current schema, read as is (or defaults when no file exists)
    #[default]
    Current,
    /// Migrated in memory from an older schema
    Migrated,
    /// The file could not be read as a whole; what could be salvaged was kept
    Fallback,
}

/// User settings for ynab-sensors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Upper bound for one refresh, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Consecutive failures after which sensors report unavailable (0 = never)
    #[serde(default = "default_unavailable_after")]
    pub unavailable_after_failures: u32,

    #[serde(default)]
    pub attention: AttentionPolicy,

    #[serde(default)]
    pub budgets: Vec<BudgetConfig>,

    #[serde(skip)]
    origin: SettingsOrigin,
}

fn default_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

fn default_request_timeout() -> u64 {
    30
}

fn default_unavailable_after() -> u32 {
    3
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            request_timeout_secs: default_request_timeout(),
            unavailable_after_failures: default_unavailable_after(),
            attention: AttentionPolicy::default(),
            budgets: Vec::new(),
            origin: SettingsOrigin::Current,
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    ///
    /// Files written by older versions are migrated and written back. A file
    /// that cannot be read as a whole (corrupt, or from a newer version) never
    /// stops the program: whatever still parses is kept and the rest falls back
    /// to defaults.
    pub fn load_or_create(paths: &SensorPaths) -> YnabResult<Self> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| YnabError::Io(format!("Failed to read settings file: {}", e)))?;

        let mut settings = match serde_json::from_str::<Value>(&contents) {
            Ok(raw) => Self::from_value(raw),
            Err(e) => {
                tracing::warn!(error = %e, "Settings file is not valid JSON, using defaults");
                Self::salvage(&Value::Null)
            }
        };

        if settings.origin == SettingsOrigin::Migrated {
            match settings.save(paths) {
                Ok(()) => settings.origin = SettingsOrigin::Current,
                Err(e) => tracing::warn!(error = %e, "Failed to write migrated settings"),
            }
        }

        Ok(settings)
    }

    /// Build settings from raw JSON, migrating older schemas
    pub fn from_value(raw: Value) -> Self {
        let error = match migrate(raw.clone()) {
            Ok((migrated, changed)) => match serde_json::from_value::<Settings>(migrated) {
                Ok(mut settings) => {
                    if changed {
                        settings.origin = SettingsOrigin::Migrated;
                    }
                    return settings;
                }
                Err(e) => YnabError::Config(format!("Invalid settings: {}", e)),
            },
            Err(e) => e,
        };

        tracing::warn!(error = %error, "Falling back to salvaged settings");
        Self::salvage(&raw)
    }

    /// Keep every field and budget that still parses on its own
    fn salvage(raw: &Value) -> Self {
        let defaults = Settings::default();

        let budgets = raw
            .get("budgets")
            .and_then(Value::as_array)
            .map(|budgets| {
                budgets
                    .iter()
                    .filter_map(|budget| {
                        serde_json::from_value::<BudgetConfig>(budget.clone())
                            .map_err(|e| tracing::warn!(error = %e, "Skipping unreadable budget"))
                            .ok()
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            request_timeout_secs: salvage_field(raw, "request_timeout_secs")
                .unwrap_or(defaults.request_timeout_secs),
            unavailable_after_failures: salvage_field(raw, "unavailable_after_failures")
                .unwrap_or(defaults.unavailable_after_failures),
            attention: salvage_field(raw, "attention").unwrap_or(defaults.attention),
            budgets,
            origin: SettingsOrigin::Fallback,
        }
    }

    pub fn origin(&self) -> SettingsOrigin {
        self.origin
    }

    /// Save settings to disk
    ///
    /// The file holds access tokens, so it is written owner-only. Before
    /// salvaged settings replace the file they came from, the original is
    /// copied aside once.
    pub fn save(&self, paths: &SensorPaths) -> YnabResult<()> {
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let backup_path = paths.settings_backup_file();

        if self.origin == SettingsOrigin::Fallback
            && settings_path.exists()
            && !backup_path.exists()
        {
            std::fs::copy(&settings_path, &backup_path)
                .map_err(|e| YnabError::Io(format!("Failed to back up settings file: {}", e)))?;
            tracing::warn!(
                backup = %backup_path.display(),
                "Replacing unreadable settings file, original kept as backup"
            );
        }

        write_json_private(&settings_path, self)
    }

    /// Find a configured budget by instance name (exact or sanitized)
    pub fn find_budget(&self, instance: &str) -> Option<&BudgetConfig> {
        let wanted = sanitize_name(instance);
        self.budgets
            .iter()
            .find(|b| b.instance_name == instance || b.sanitized_instance_name() == wanted)
    }

    /// Add a budget, replacing an existing one with the same instance name
    pub fn upsert_budget(&mut self, budget: BudgetConfig) {
        let key = budget.sanitized_instance_name();
        self.budgets.retain(|b| b.sanitized_instance_name() != key);
        self.budgets.push(budget);
    }

    /// Remove a budget by instance name; returns whether one was removed
    pub fn remove_budget(&mut self, instance: &str) -> bool {
        let wanted = sanitize_name(instance);
        let before = self.budgets.len();
        self.budgets.retain(|b| b.sanitized_instance_name() != wanted);
        self.budgets.len() != before
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

fn salvage_field<T: DeserializeOwned>(raw: &Value, key: &str) -> Option<T> {
    raw.get(key)
        .and_then(|value| serde_json::from_value(value.clone()).ok())
}

/// Bring a raw settings document to [`CURRENT_SCHEMA_VERSION`]
///
/// Returns the document and whether anything had to change.
fn migrate(mut raw: Value) -> YnabResult<(Value, bool)> {
    let version = raw
        .get("schema_version")
        .and_then(Value::as_u64)
        .unwrap_or(1);

    if version > u64::from(CURRENT_SCHEMA_VERSION) {
        return Err(YnabError::ConfigMigration(format!(
            "settings schema {} is newer than supported schema {}",
            version, CURRENT_SCHEMA_VERSION
        )));
    }

    if version == u64::from(CURRENT_SCHEMA_VERSION) {
        return Ok((raw, false));
    }

    let root = raw
        .as_object_mut()
        .ok_or_else(|| YnabError::ConfigMigration("settings root is not an object".into()))?;

    if let Some(Value::Array(budgets)) = root.get_mut("budgets") {
        for budget in budgets.iter_mut() {
            if let Value::Object(fields) = budget {
                if let Err(e) = migrate_budget_v1(fields) {
                    tracing::warn!(error = %e, "Falling back to default budget options");
                    fields.insert("options".into(), default_options_value());
                }
            }
        }
    }

    root.insert("schema_version".into(), Value::from(CURRENT_SCHEMA_VERSION));
    tracing::info!(from = version, to = CURRENT_SCHEMA_VERSION, "Migrated settings schema");
    Ok((raw, true))
}

/// Schema 1 kept `update_interval` next to the budget data and had no
/// include flags
fn migrate_budget_v1(fields: &mut Map<String, Value>) -> YnabResult<()> {
    let mut options = match fields.remove("options") {
        Some(Value::Object(existing)) => existing,
        Some(Value::Null) | None => Map::new(),
        Some(other) => {
            return Err(YnabError::ConfigMigration(format!(
                "unexpected options value: {}",
                other
            )))
        }
    };

    if let Some(interval) = fields.remove("update_interval") {
        let minutes = interval.as_u64().ok_or_else(|| {
            YnabError::ConfigMigration(format!("update_interval is not a number: {}", interval))
        })?;
        options
            .entry("update_interval_minutes")
            .or_insert(Value::from(minutes));
    }

    options
        .entry("update_interval_minutes")
        .or_insert(Value::from(DEFAULT_UPDATE_INTERVAL_MINUTES));
    options
        .entry("include_closed_accounts")
        .or_insert(Value::Bool(false));
    options
        .entry("include_hidden_categories")
        .or_insert(Value::Bool(false));

    fields.insert("options".into(), Value::Object(options));
    Ok(())
}

fn default_options_value() -> Value {
    serde_json::to_value(BudgetOptions::default()).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_budget() -> BudgetConfig {
        BudgetConfig::new("budget-1", "My Budget", "secret-token")
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(settings.request_timeout_secs, 30);
        assert_eq!(settings.unavailable_after_failures, 3);
        assert!(settings.budgets.is_empty());
    }

    #[test]
    fn test_default_budget_options() {
        let budget = sample_budget();
        assert_eq!(budget.options.update_interval_minutes, 10);
        assert!(!budget.options.include_closed_accounts);
        assert!(!budget.options.include_hidden_categories);
        assert!(budget.selected_accounts.is_all());
        assert_eq!(budget.currency_symbol(), "$");
    }

    #[test]
    fn test_update_interval_is_clamped() {
        let mut options = BudgetOptions::default();
        assert_eq!(options.update_interval(), Duration::from_secs(600));

        options.update_interval_minutes = 1;
        assert_eq!(options.update_interval(), Duration::from_secs(300));

        options.update_interval_minutes = 500;
        assert_eq!(options.update_interval(), Duration::from_secs(3600));
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("My Budget"), "My_Budget");
        assert_eq!(sanitize_name("Família & Co!"), "Famlia__Co");
        assert_eq!(sanitize_name("abc_123"), "abc_123");
    }

    #[test]
    fn test_selection_contains() {
        let all: Selection<AccountId> = Selection::All;
        assert!(all.contains(&AccountId::new("x")));

        let only = Selection::Only(vec![AccountId::new("a"), AccountId::new("b")]);
        assert!(only.contains(&AccountId::new("a")));
        assert!(!only.contains(&AccountId::new("c")));
    }

    #[test]
    fn test_validate_requires_terms() {
        let mut budget = sample_budget();
        assert!(budget.validate().is_ok());

        budget.accepted_terms = false;
        assert!(matches!(budget.validate(), Err(YnabError::Validation(_))));
    }

    #[test]
    fn test_debug_redacts_token() {
        let budget = sample_budget();
        let debug = format!("{:?}", budget);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SensorPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        let mut budget = sample_budget();
        budget.selected_categories = Selection::Only(vec![CategoryId::new("cat-1")]);
        budget.options.include_hidden_categories = true;
        settings.upsert_budget(budget);
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.budgets.len(), 1);
        let budget = loaded.find_budget("My Budget").unwrap();
        assert!(budget.options.include_hidden_categories);
        assert!(budget.selected_categories.contains(&CategoryId::new("cat-1")));
        assert!(!budget.selected_categories.contains(&CategoryId::new("cat-2")));
    }

    #[test]
    fn test_upsert_replaces_same_instance() {
        let mut settings = Settings::default();
        settings.upsert_budget(sample_budget());

        let mut replacement = sample_budget();
        replacement.currency = "EUR".into();
        settings.upsert_budget(replacement);

        assert_eq!(settings.budgets.len(), 1);
        assert_eq!(settings.budgets[0].currency, "EUR");
        assert!(settings.remove_budget("My_Budget"));
        assert!(settings.budgets.is_empty());
    }

    #[test]
    fn test_migrates_schema_1() {
        let raw = json!({
            "budgets": [{
                "budget_id": "b1",
                "budget_name": "Home",
                "instance_name": "Home",
                "access_token": "t",
                "accepted_terms": true,
                "update_interval": 15
            }]
        });

        let settings = Settings::from_value(raw);
        assert_eq!(settings.schema_version, CURRENT_SCHEMA_VERSION);
        let options = &settings.budgets[0].options;
        assert_eq!(options.update_interval_minutes, 15);
        assert!(!options.include_closed_accounts);
        assert!(!options.include_hidden_categories);
    }

    #[test]
    fn test_broken_v1_options_fall_back_to_defaults() {
        let raw = json!({
            "schema_version": 1,
            "budgets": [{
                "budget_id": "b1",
                "budget_name": "Home",
                "instance_name": "Home",
                "access_token": "t",
                "update_interval": "often"
            }]
        });

        let settings = Settings::from_value(raw);
        assert_eq!(settings.budgets[0].options, BudgetOptions::default());
    }

    #[test]
    fn test_future_schema_keeps_readable_budgets() {
        let raw = json!({
            "schema_version": 3,
            "request_timeout_secs": 45,
            "budgets": [
                {
                    "budget_id": "b1",
                    "budget_name": "Home",
                    "instance_name": "Home",
                    "access_token": "t",
                    "new_in_v3": { "anything": true }
                },
                { "budget_id": 7 }
            ]
        });

        let settings = Settings::from_value(raw);
        assert_eq!(settings.origin(), SettingsOrigin::Fallback);
        assert_eq!(settings.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(settings.request_timeout_secs, 45);
        assert_eq!(settings.unavailable_after_failures, 3);
        assert_eq!(settings.budgets.len(), 1);
        assert!(settings.find_budget("Home").is_some());
    }

    #[test]
    fn test_non_object_root_falls_back_to_defaults() {
        let settings = Settings::from_value(json!(["not", "settings"]));
        assert_eq!(settings.origin(), SettingsOrigin::Fallback);
        assert!(settings.budgets.is_empty());
    }

    #[test]
    fn test_corrupt_file_loads_defaults_and_is_backed_up_on_save() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SensorPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), "{ broken").unwrap();

        let mut settings = Settings::load_or_create(&paths).unwrap();
        assert_eq!(settings.origin(), SettingsOrigin::Fallback);
        assert!(settings.budgets.is_empty());

        settings.upsert_budget(sample_budget());
        settings.save(&paths).unwrap();

        let backup = std::fs::read_to_string(paths.settings_backup_file()).unwrap();
        assert_eq!(backup, "{ broken");
        let reloaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(reloaded.origin(), SettingsOrigin::Current);
        assert_eq!(reloaded.budgets.len(), 1);
    }

    #[test]
    fn test_migrated_file_is_written_back() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SensorPaths::with_base_dir(temp_dir.path().to_path_buf());
        let v1 = json!({
            "budgets": [{
                "budget_id": "b1",
                "budget_name": "Home",
                "instance_name": "Home",
                "access_token": "t",
                "update_interval": 20
            }]
        });
        std::fs::write(paths.settings_file(), v1.to_string()).unwrap();

        let settings = Settings::load_or_create(&paths).unwrap();
        assert_eq!(settings.origin(), SettingsOrigin::Current);

        let on_disk: Value =
            serde_json::from_str(&std::fs::read_to_string(paths.settings_file()).unwrap())
                .unwrap();
        assert_eq!(on_disk["schema_version"], json!(CURRENT_SCHEMA_VERSION));
        assert_eq!(
            on_disk["budgets"][0]["options"]["update_interval_minutes"],
            json!(20)
        );
        assert!(on_disk["budgets"][0].get("update_interval").is_none());
        assert!(!paths.settings_backup_file().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_settings_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let paths = SensorPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.upsert_budget(sample_budget());
        settings.save(&paths).unwrap();

        let mode = std::fs::metadata(paths.settings_file())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
