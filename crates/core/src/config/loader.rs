//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, ErrorCode, Result};
use std::path::{Path, PathBuf};

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path or use defaults.
    ///
    /// An explicit path must exist; without one the standard locations are
    /// searched and defaults are used when none is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(Path::new(".")),
        };

        let schema = if let Some(ref p) = config_path {
            tracing::debug!(path = %p.display(), "Loading configuration");
            let mut schema = load_config_file(p)?;
            resolve_relative_paths(&mut schema, p);
            schema
        } else {
            ConfigSchema::default()
        };

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Load with defaults only (no file)
    pub fn default() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }
}

/// Find configuration file in standard locations under `root`
fn find_config_file(root: &Path) -> Option<PathBuf> {
    let candidates = [
        ".whitelabel.toml",
        "whitelabel.toml",
        ".config/whitelabel.toml",
    ];

    candidates
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|candidate| candidate.exists())
}

/// Paths in the file are relative to the directory holding it
fn resolve_relative_paths(schema: &mut ConfigSchema, config_path: &Path) {
    let Some(base) = config_path.parent() else {
        return;
    };
    if let Some(template) = schema.android.template.as_mut() {
        if template.is_relative() {
            *template = base.join(&*template);
        }
    }
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::new(
            ErrorCode::ConfigParseError,
            format!("Failed to parse config file {}: {}", path.display(), e),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert!(config.schema.render.strict);
        assert!(config.schema.render.standalone_lines);
        assert_eq!(
            config.schema.android.output,
            PathBuf::from("android/app/build.gradle.kts")
        );
    }

    #[test]
    fn test_config_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            "[render]\nstrict = false\n\n[android]\ntemplate = \"templates/app.gradle.kts\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.path.as_deref(), Some(path.as_path()));
        assert!(!config.schema.render.strict);
        assert!(config.schema.render.standalone_lines);
        assert_eq!(
            config.schema.android.template,
            Some(dir.path().join("templates/app.gradle.kts"))
        );
    }

    #[test]
    fn test_config_template_path_relative_to_config_dir() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".config")).unwrap();
        let path = dir.path().join(".config/whitelabel.toml");
        fs::write(&path, "[android]
template = \"../gradle.mustache\"
").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(
            config.schema.android.template,
            Some(dir.path().join(".config/../gradle.mustache"))
        );

        let absolute = dir.path().join("abs.mustache");
        fs::write(
            &path,
            format!("[android]\ntemplate = {:?}\n", absolute.display().to_string()),
        )
        .unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.schema.android.template, Some(absolute));
    }

    #[test]
    fn test_config_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/whitelabel.toml"))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[render\nstrict = ").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
    }

    #[test]
    fn test_find_config_file() {
        let dir = TempDir::new().unwrap();
        assert!(find_config_file(dir.path()).is_none());

        fs::create_dir(dir.path().join(".config")).unwrap();
        fs::write(dir.path().join(".config/whitelabel.toml"), "").unwrap();
        assert_eq!(
            find_config_file(dir.path()),
            Some(dir.path().join(".config/whitelabel.toml"))
        );
    }
}
