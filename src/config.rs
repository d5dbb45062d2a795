//! Settings store for ~/.config/curak/config.json.
//!
//! The file holds three user settings: the API token, the start screen and
//! the theme name. Reading never fails: a missing, empty, oversized or
//! malformed file yields defaults, and a bad individual value falls back to
//! its default while the rest of the file is kept.
use crate::theme::ThemeName;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Environment variable that overrides the stored token.
pub const TOKEN_ENV: &str = "CURAQ_MCP_TOKEN";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Settings file too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("HOME environment variable not set")]
    NoHome,
}

// ============================================================================
// Settings
// ============================================================================

/// Which list the dashboard opens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartScreen {
    #[default]
    Unread,
    Read,
}

impl StartScreen {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unread => "unread",
            Self::Read => "read",
        }
    }
}

impl fmt::Display for StartScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StartScreen {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unread" => Ok(Self::Unread),
            "read" => Ok(Self::Read),
            other => Err(format!("unknown start screen '{other}' (expected unread or read)")),
        }
    }
}

/// Persisted user settings.
///
/// Custom Debug impl masks the token.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub start_screen: StartScreen,
    pub theme: ThemeName,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("start_screen", &self.start_screen)
            .field("theme", &self.theme)
            .finish()
    }
}

/// On-disk shape with every value optional and loosely typed, so one bad
/// value does not discard the others.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawSettings {
    token: Option<String>,
    start_screen: Option<String>,
    theme: Option<String>,
}

impl From<RawSettings> for Settings {
    fn from(raw: RawSettings) -> Self {
        let start_screen = match raw.start_screen.as_deref().map(StartScreen::from_str) {
            Some(Ok(s)) => s,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Invalid startScreen in settings, using default");
                StartScreen::default()
            }
            None => StartScreen::default(),
        };
        let theme = match raw.theme.as_deref().map(ThemeName::from_str) {
            Some(Ok(t)) => t,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Invalid theme in settings, using default");
                ThemeName::default()
            }
            None => ThemeName::default(),
        };
        Self {
            token: raw.token.filter(|t| !t.trim().is_empty()),
            start_screen,
            theme,
        }
    }
}

/// Token precedence: a non-empty environment value wins over the file.
fn resolve_token(env_value: Option<String>, stored: Option<&str>) -> Option<SecretString> {
    env_value
        .filter(|t| !t.trim().is_empty())
        .or_else(|| stored.map(str::to_owned))
        .map(SecretString::from)
}

// ============================================================================
// Store
// ============================================================================

/// The single settings instance, created in `main` and passed by reference.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Maximum settings file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// `~/.config/curak/config.json`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = std::env::var_os("HOME").ok_or(ConfigError::NoHome)?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("curak")
            .join("config.json"))
    }

    /// Loads settings from `path`, falling back to defaults on any problem.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = match Self::read(&path) {
            Ok(Some(settings)) => {
                tracing::info!(path = %path.display(), theme = %settings.theme, "Loaded settings");
                settings
            }
            Ok(None) => Settings::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Unreadable settings, using defaults");
                Settings::default()
            }
        };
        Self { path, settings }
    }

    /// `Ok(None)` for a missing or empty file.
    fn read(path: &Path) -> Result<Option<Settings>, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge {
                    size: meta.len(),
                    max: Self::MAX_FILE_SIZE,
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                return Ok(None);
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<RawSettings>(&content) {
            Ok(raw) => Ok(Some(raw.into())),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Malformed settings JSON, using defaults");
                Ok(None)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub(crate) fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn theme(&self) -> ThemeName {
        self.settings.theme
    }

    pub fn start_screen(&self) -> StartScreen {
        self.settings.start_screen
    }

    /// The API token, with `CURAQ_MCP_TOKEN` taking precedence over the file.
    pub fn token(&self) -> Option<SecretString> {
        resolve_token(std::env::var(TOKEN_ENV).ok(), self.settings.token.as_deref())
    }

    pub fn set_token(&mut self, token: Option<String>) -> Result<(), ConfigError> {
        self.settings.token = token.filter(|t| !t.trim().is_empty());
        self.save()
    }

    pub fn set_theme(&mut self, theme: ThemeName) -> Result<(), ConfigError> {
        self.settings.theme = theme;
        self.save()
    }

    pub fn set_start_screen(&mut self, start_screen: StartScreen) -> Result<(), ConfigError> {
        self.settings.start_screen = start_screen;
        self.save()
    }

    /// Writes the settings via temp file + rename so a crash never leaves a
    /// half-written file. The file holds the token, so it is user-only.
    fn save(&self) -> Result<(), ConfigError> {
        if let Some(dir) = self.path.parent() {
            ensure_private_dir(dir)?;
        }

        let json = serde_json::to_string_pretty(&self.settings)?;
        let temp_path = self.path.with_extension("json.tmp");

        let write_result = (|| -> Result<(), std::io::Error> {
            let mut options = std::fs::OpenOptions::new();
            options.write(true).create(true).truncate(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(0o600);
            }
            let mut file = options.open(&temp_path)?;
            file.write_all(json.as_bytes())?;
            file.write_all(b"\n")?;
            file.sync_all()?;
            drop(file);
            std::fs::rename(&temp_path, &self.path)
        })();

        if let Err(e) = write_result {
            let _ = std::fs::remove_file(&temp_path);
            return Err(ConfigError::Io(e));
        }

        tracing::debug!(path = %self.path.display(), "Saved settings");
        Ok(())
    }
}

/// Creates `dir` (and parents) and makes it user-only on Unix.
///
/// The mode is applied even when the directory already exists, since it may
/// have been created by something else with the default umask.
pub fn ensure_private_dir(dir: &Path) -> Result<(), std::io::Error> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))?;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn temp_settings_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("curak_settings_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir.join("config.json")
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = temp_settings_path("missing");
        let store = SettingsStore::open(&path);
        assert_eq!(store.settings(), &Settings::default());
        assert_eq!(store.theme(), ThemeName::Default);
        assert_eq!(store.start_screen(), StartScreen::Unread);
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let path = temp_settings_path("malformed");
        std::fs::write(&path, "{ not json").unwrap();
        let store = SettingsStore::open(&path);
        assert_eq!(store.settings(), &Settings::default());
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let path = temp_settings_path("empty");
        std::fs::write(&path, "  \n").unwrap();
        assert_eq!(SettingsStore::open(&path).settings(), &Settings::default());
    }

    #[test]
    fn test_loads_camel_case_keys() {
        let path = temp_settings_path("camel");
        std::fs::write(
            &path,
            r#"{"token":"abc","startScreen":"read","theme":"ocean","extra":1}"#,
        )
        .unwrap();
        let store = SettingsStore::open(&path);
        assert_eq!(store.settings().token.as_deref(), Some("abc"));
        assert_eq!(store.start_screen(), StartScreen::Read);
        assert_eq!(store.theme(), ThemeName::Ocean);
    }

    #[test]
    fn test_unknown_theme_keeps_other_values() {
        let path = temp_settings_path("unknown_theme");
        std::fs::write(&path, r#"{"token":"abc","theme":"neon"}"#).unwrap();
        let store = SettingsStore::open(&path);
        assert_eq!(store.theme(), ThemeName::Default);
        assert_eq!(store.settings().token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_too_large_file_gives_defaults() {
        let path = temp_settings_path("too_large");
        let padding = " ".repeat(1_048_577);
        std::fs::write(&path, format!("{{\"theme\":\"ocean\"}}{padding}")).unwrap();
        assert_eq!(SettingsStore::open(&path).theme(), ThemeName::Default);
    }

    #[test]
    fn test_save_round_trip_and_creates_directory() {
        let path = temp_settings_path("save").with_file_name("nested").join("config.json");
        let mut store = SettingsStore::open(&path);
        store.set_theme(ThemeName::Sunset).unwrap();
        store.set_token(Some("secret".into())).unwrap();

        let reloaded = SettingsStore::open(&path);
        assert_eq!(reloaded.theme(), ThemeName::Sunset);
        assert_eq!(reloaded.settings().token.as_deref(), Some("secret"));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"startScreen\": \"unread\""));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_clear_token_omits_key() {
        let path = temp_settings_path("clear");
        let mut store = SettingsStore::open(&path);
        store.set_token(Some("secret".into())).unwrap();
        store.set_token(None).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("token"));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_user_only() {
        use std::os::unix::fs::PermissionsExt;
        let path = temp_settings_path("perms");
        let mut store = SettingsStore::open(&path);
        store.set_start_screen(StartScreen::Read).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_tightens_existing_directory() {
        use std::os::unix::fs::PermissionsExt;
        let path = temp_settings_path("dir_perms");
        let dir = path.parent().unwrap();
        std::fs::create_dir_all(dir).unwrap();
        std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut store = SettingsStore::open(&path);
        store.set_theme(ThemeName::Ocean).unwrap();

        let dir_mode = std::fs::metadata(dir).unwrap().permissions().mode();
        let file_mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o777, 0o700);
        assert_eq!(file_mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_ensure_private_dir_creates_user_only_tree() {
        use std::os::unix::fs::PermissionsExt;
        let root = std::env::temp_dir().join("curak_settings_test_private_tree");
        let _ = std::fs::remove_dir_all(&root);
        let dir = root.join("nested");

        ensure_private_dir(&dir).unwrap();
        let mode = std::fs::metadata(&dir).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn test_env_token_takes_precedence() {
        let token = resolve_token(Some("from-env".into()), Some("from-file")).unwrap();
        assert_eq!(token.expose_secret(), "from-env");

        let token = resolve_token(Some("  ".into()), Some("from-file")).unwrap();
        assert_eq!(token.expose_secret(), "from-file");

        assert!(resolve_token(None, None).is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let settings = Settings {
            token: Some("super-secret".into()),
            ..Settings::default()
        };
        let debug = format!("{settings:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
