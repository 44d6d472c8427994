//! White-label app build descriptions
//!
//! One [`WhiteLabelApp`] describes a single customer build: application ID,
//! display name, signing configs, build types and dependencies. Keys use the
//! same camelCase names as the Gradle template variables.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use whitelabel_core::error::{Error, ErrorCode, Result, ResultExt};
use whitelabel_core::validation::{ValidationResult, Validator};
use whitelabel_template::Context;

/// NDK version pinned by the white-label Flutter project
pub const DEFAULT_NDK_VERSION: &str = "29.0.13113456";

/// Kotlin package of the shared white-label app code (`MainActivity`, `R`,
/// `BuildConfig`); the same for every customer
pub const DEFAULT_CODE_NAMESPACE: &str = "com.example.rfOnline.white_label";

/// Gradle dependency configurations accepted without a warning
pub const KNOWN_CONFIGURATIONS: &[&str] = &[
    "implementation",
    "api",
    "compileOnly",
    "runtimeOnly",
    "testImplementation",
    "androidTestImplementation",
    "debugImplementation",
    "releaseImplementation",
    "coreLibraryDesugaring",
    "kapt",
    "ksp",
];

/// Resource types usable in `resValue(...)`
const RES_VALUE_TYPES: &[&str] = &["string", "bool", "integer", "color", "dimen"];

static APPLICATION_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$").unwrap());

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").unwrap());

static SIGNING_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^signingConfigs\.(?:getByName\("([^"]+)"\)|([A-Za-z][A-Za-z0-9_]*))$"#).unwrap()
});

/// A single customer's Android build description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhiteLabelApp {
    /// Application ID, e.g. `com.acme.shop`
    pub namespace: String,

    /// Display name written to the `application_name` string resource
    pub app_name: String,

    /// Kotlin namespace of the shared app code; defaults to [`DEFAULT_CODE_NAMESPACE`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_namespace: Option<String>,

    /// Android NDK version; defaults to [`DEFAULT_NDK_VERSION`]
    #[serde(default = "default_ndk_version")]
    pub ndk_version: String,

    /// Release keystores, rendered into `signingConfigs { ... }`
    #[serde(default)]
    pub signing_configs: Vec<SigningConfig>,

    /// Rendered into `buildTypes { ... }`
    #[serde(default)]
    pub build_types: Vec<BuildType>,

    /// Rendered into the top-level `dependencies { ... }` block
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

/// Keystore settings for one signing config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningConfig {
    /// Config name, e.g. `release`
    pub name: String,
    /// Key alias inside the keystore
    pub key_alias: String,
    /// Password of the key
    pub key_password: String,
    /// Keystore path, relative to the `android/app` directory
    pub store_file: String,
    /// Password of the keystore
    pub store_password: String,
}

/// One Gradle build type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildType {
    /// Build type name, e.g. `release`
    pub name: String,

    /// Enables R8 code shrinking
    #[serde(default)]
    pub is_minify_enabled: bool,

    /// Enables resource shrinking; requires `is_minify_enabled`
    #[serde(default)]
    pub is_shrink_resources: bool,

    /// Extra generated resources for this build type
    #[serde(default)]
    pub res_values: Vec<ResValue>,

    /// Kotlin expression, e.g. `signingConfigs.getByName("release")`
    pub signing_config: String,
}

/// A generated resource, rendered as `resValue(type, name, value)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResValue {
    /// Resource type, one of `string`, `bool`, `integer`, `color`, `dimen`
    #[serde(rename = "type")]
    pub kind: String,
    /// Resource name
    pub name: String,
    /// Resource value
    pub value: String,
}

/// A dependency line, rendered as `name("value")`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Gradle configuration, e.g. `implementation`
    pub name: String,
    /// Dependency notation, e.g. `androidx.core:core-ktx:1.13.1`
    pub value: String,
}

fn default_ndk_version() -> String {
    DEFAULT_NDK_VERSION.to_string()
}

impl WhiteLabelApp {
    /// Load a build description from a `.json` or `.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::file_not_found(path));
        }
        let content = std::fs::read_to_string(path)?;
        let context = format!("While loading {}", path.display());

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .map_err(Error::from)
                .context(context),
            Some("toml") => toml::from_str(&content).map_err(Error::from).context(context),
            _ => Err(Error::new(
                ErrorCode::InvalidFormat,
                format!("Unsupported app description format: {}", path.display()),
            )
            .with_suggestion("Use a .json or .toml file")),
        }
    }

    /// Kotlin namespace of the app code, independent of the application ID
    pub fn code_namespace(&self) -> &str {
        self.code_namespace.as_deref().unwrap_or(DEFAULT_CODE_NAMESPACE)
    }

    /// Convert into a template context
    pub fn to_context(&self) -> Result<Context> {
        let mut context = Context::from_serialize(self)?;
        context.insert("codeNamespace", self.code_namespace());
        Ok(context)
    }

    /// Check the description for values that would produce a broken build script
    pub fn validate(&self) -> ValidationResult {
        let mut validator = Validator::new()
            .required("appName", &self.app_name)
            .matches(
                "namespace",
                &self.namespace,
                &APPLICATION_ID,
                "an application ID such as com.example.app",
            )
            .matches(
                "codeNamespace",
                self.code_namespace(),
                &APPLICATION_ID,
                "a package name such as com.example.app",
            )
            .required("ndkVersion", &self.ndk_version)
            .unique(
                "signingConfigs",
                self.signing_configs.iter().map(|s| s.name.as_str()),
            )
            .unique("buildTypes", self.build_types.iter().map(|b| b.name.as_str()))
            .warn_if(
                "buildTypes",
                self.build_types.is_empty(),
                "No build types declared, the Gradle defaults will be used",
            );

        validator = check_literal(validator, "appName", &self.app_name);
        validator = check_literal(validator, "ndkVersion", &self.ndk_version);

        for (idx, signing) in self.signing_configs.iter().enumerate() {
            let field = format!("signingConfigs[{idx}]");
            validator = validator.matches(
                &format!("{field}.name"),
                &signing.name,
                &IDENTIFIER,
                "an identifier",
            );
            for (key, value) in [
                ("keyAlias", &signing.key_alias),
                ("keyPassword", &signing.key_password),
                ("storeFile", &signing.store_file),
                ("storePassword", &signing.store_password),
            ] {
                let field = format!("{field}.{key}");
                validator = check_literal(validator.required(&field, value), &field, value);
            }
        }

        for (idx, build_type) in self.build_types.iter().enumerate() {
            let field = format!("buildTypes[{idx}]");
            validator = validator
                .matches(
                    &format!("{field}.name"),
                    &build_type.name,
                    &IDENTIFIER,
                    "an identifier",
                )
                .required(&format!("{field}.signingConfig"), &build_type.signing_config)
                .custom(&format!("{field}.isShrinkResources"), || {
                    (build_type.is_shrink_resources && !build_type.is_minify_enabled)
                        .then(|| "Resource shrinking requires isMinifyEnabled = true".to_string())
                });

            if let Some(name) = self.undeclared_signing_reference(&build_type.signing_config) {
                validator = validator.warn_if(
                    &format!("{field}.signingConfig"),
                    true,
                    &format!("References signing config `{name}` which is not declared"),
                );
            }

            for (res_idx, res) in build_type.res_values.iter().enumerate() {
                let field = format!("{field}.resValues[{res_idx}]");
                validator = validator
                    .one_of(&format!("{field}.type"), &res.kind, RES_VALUE_TYPES)
                    .matches(&format!("{field}.name"), &res.name, &IDENTIFIER, "an identifier");
                validator = check_literal(validator, &format!("{field}.value"), &res.value);
            }
        }

        for (idx, dependency) in self.dependencies.iter().enumerate() {
            let field = format!("dependencies[{idx}]");
            validator = validator
                .matches(
                    &format!("{field}.name"),
                    &dependency.name,
                    &IDENTIFIER,
                    "a Gradle configuration name",
                )
                .required(&format!("{field}.value"), &dependency.value)
                .warn_if(
                    &format!("{field}.name"),
                    !KNOWN_CONFIGURATIONS.contains(&dependency.name.as_str()),
                    &format!("Unusual dependency configuration `{}`", dependency.name),
                );
            validator = check_literal(validator, &format!("{field}.value"), &dependency.value);
        }

        validator.validate()
    }

    /// Name of a signing config referenced by `expr` but not declared here.
    ///
    /// `debug` always exists in the Android Gradle plugin.
    fn undeclared_signing_reference<'a>(&self, expr: &'a str) -> Option<&'a str> {
        let captures = SIGNING_REFERENCE.captures(expr.trim())?;
        let name = captures.get(1).or_else(|| captures.get(2))?.as_str();
        let declared = name == "debug" || self.signing_configs.iter().any(|s| s.name == name);
        (!declared).then_some(name)
    }
}

/// Values rendered inside Kotlin string literals must not break out of them.
fn check_literal(validator: Validator, field: &str, value: &str) -> Validator {
    validator
        .custom(field, || {
            value
                .contains(['"', '\\', '\n'])
                .then(|| "Must not contain double quotes, backslashes or newlines".to_string())
        })
        .warn_if(
            field,
            value.contains('$'),
            "Contains `$`, which Kotlin treats as string interpolation",
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use crate::test_support::sample_app;
    use tempfile::TempDir;
    use whitelabel_template::Value;

    #[test]
    fn test_sample_is_valid() {
        let result = sample_app().validate();
        assert!(result.is_valid(), "{:?}", result.errors());
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn test_invalid_namespace() {
        let mut app = sample_app();
        app.namespace = "acme".to_string();
        let result = app.validate();
        assert!(result.errors().iter().any(|e| e.field == "namespace"));
    }

    #[test]
    fn test_quote_in_app_name_is_rejected() {
        let mut app = sample_app();
        app.app_name = r#"Acme "Shop""#.to_string();
        let result = app.validate();
        assert!(result.errors().iter().any(|e| e.field == "appName"));
    }

    #[test]
    fn test_shrink_without_minify_is_rejected() {
        let mut app = sample_app();
        app.build_types[0].is_minify_enabled = false;
        let result = app.validate();
        assert!(result
            .errors()
            .iter()
            .any(|e| e.field == "buildTypes[0].isShrinkResources"));
    }

    #[test]
    fn test_duplicate_build_types() {
        let mut app = sample_app();
        app.build_types.push(app.build_types[0].clone());
        assert!(!app.validate().is_valid());
    }

    #[test]
    fn test_undeclared_signing_config_warns() {
        let mut app = sample_app();
        app.build_types[0].signing_config = "signingConfigs.getByName(\"staging\")".to_string();
        let result = app.validate();
        assert!(result.is_valid());
        assert_eq!(result.warnings().len(), 1);

        app.build_types[0].signing_config = "signingConfigs.debug".to_string();
        assert!(app.validate().warnings().is_empty());
    }

    #[test]
    fn test_dollar_in_literal_warns() {
        let mut app = sample_app();
        app.signing_configs[0].store_password = "pa$$word".to_string();
        let result = app.validate();
        assert!(result.is_valid());
        assert_eq!(result.warnings().len(), 1);
        assert_eq!(result.warnings()[0].field, "signingConfigs[0].storePassword");
    }

    #[test]
    fn test_invalid_res_value_type() {
        let mut app = sample_app();
        app.build_types[0].res_values.push(ResValue {
            kind: "text".to_string(),
            name: "label".to_string(),
            value: "Shop".to_string(),
        });
        let result = app.validate();
        assert!(!result.is_valid());
        assert!(result
            .errors()
            .iter()
            .any(|e| e.field == "buildTypes[0].resValues[0].type"));

        app.build_types[0].res_values[0].kind = "string".to_string();
        assert!(app.validate().is_valid());
    }

    #[test]
    fn test_unknown_dependency_configuration_warns() {
        let mut app = sample_app();
        app.dependencies[0].name = "wearApp".to_string();
        let result = app.validate();
        assert!(result.is_valid());
        assert_eq!(result.warnings()[0].field, "dependencies[0].name");
    }

    #[test]
    fn test_to_context() {
        let ctx = sample_app().to_context().unwrap();
        assert_eq!(ctx.get("appName"), Some(&Value::from("Acme Shop")));
        assert_eq!(ctx.get("namespace"), Some(&Value::from("com.acme.shop")));
        assert_eq!(
            ctx.get("codeNamespace"),
            Some(&Value::from(DEFAULT_CODE_NAMESPACE))
        );

        let mut app = sample_app();
        app.code_namespace = Some("com.acme.shared".to_string());
        let ctx = app.to_context().unwrap();
        assert_eq!(ctx.get("codeNamespace"), Some(&Value::from("com.acme.shared")));
        let Some(Value::List(build_types)) = ctx.get("buildTypes") else {
            panic!("expected buildTypes list");
        };
        assert_eq!(build_types[0].get("isMinifyEnabled"), Some(&Value::from("true")));
    }

    #[test]
    fn test_load_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("acme.toml");
        fs::write(
            &path,
            r#"
namespace = "com.acme.shop"
appName = "Acme Shop"

[[buildTypes]]
name = "debug"
signingConfig = "signingConfigs.debug"

[[buildTypes.resValues]]
type = "string"
name = "env"
value = "dev"

[[dependencies]]
name = "implementation"
value = "androidx.core:core-ktx:1.13.1"
"#,
        )
        .unwrap();

        let app = WhiteLabelApp::load(&path).unwrap();
        assert_eq!(app.ndk_version, DEFAULT_NDK_VERSION);
        assert_eq!(app.build_types[0].res_values[0].kind, "string");
        assert!(!app.build_types[0].is_minify_enabled);
    }

    #[test]
    fn test_load_json_round_trips_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("acme.json");
        fs::write(&path, serde_json::to_string(&sample_app()).unwrap()).unwrap();
        assert_eq!(WhiteLabelApp::load(&path).unwrap(), sample_app());
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("acme.yaml");
        fs::write(&path, "namespace: x").unwrap();
        let err = WhiteLabelApp::load(&path).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
    }

    #[test]
    fn test_load_missing_file() {
        let err = WhiteLabelApp::load(Path::new("/nonexistent/app.json")).unwrap_err();
        assert_eq!(err.code, ErrorCode::FileNotFound);
    }
}
