//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into core services. Nothing in
//! this crate reads process environment variables; the front-end reads them and hands the raw
//! values to the `*_from_env_value` helpers below.

use crate::constants::{DEFAULT_TEMPLATE_DIR, SETTINGS_FILENAME};
use crate::loader::{LoadOptions, LoadPolicy};
use crate::{CoreError, CoreResult};
use aim_types::parse_bool_token;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    template_dir: PathBuf,
    settings_path: PathBuf,
    load_options: LoadOptions,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if either path is empty.
    pub fn new(
        template_dir: PathBuf,
        settings_path: PathBuf,
        load_options: LoadOptions,
    ) -> CoreResult<Self> {
        if template_dir.as_os_str().is_empty() {
            return Err(CoreError::InvalidInput(
                "template_dir cannot be empty".into(),
            ));
        }
        if settings_path.as_os_str().is_empty() {
            return Err(CoreError::InvalidInput(
                "settings_path cannot be empty".into(),
            ));
        }

        Ok(Self {
            template_dir,
            settings_path,
            load_options,
        })
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn load_options(&self) -> LoadOptions {
        self.load_options
    }
}

/// Resolve the template directory without reading environment variables.
///
/// If `override_dir` is provided it must be an existing directory. Otherwise the default
/// `aim-templates/` relative to the current working directory is returned, whether or not it
/// exists yet.
pub fn resolve_template_dir(override_dir: Option<PathBuf>) -> CoreResult<PathBuf> {
    match override_dir {
        Some(dir) if dir.is_dir() => Ok(dir),
        Some(dir) => Err(CoreError::InvalidInput(format!(
            "AIM_TEMPLATE_DIR override is not a directory: {}",
            dir.display()
        ))),
        None => Ok(PathBuf::from(DEFAULT_TEMPLATE_DIR)),
    }
}

/// Resolve the settings file path. Defaults to `aim-settings.yaml` inside `template_dir`.
pub fn settings_path_from_env_value(value: Option<String>, template_dir: &Path) -> PathBuf {
    non_blank(value)
        .map(PathBuf::from)
        .unwrap_or_else(|| template_dir.join(SETTINGS_FILENAME))
}

/// Parse the load policy from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`LoadPolicy::Abort`].
pub fn load_policy_from_env_value(value: Option<String>) -> CoreResult<LoadPolicy> {
    let parsed = non_blank(value).map(|v| v.parse::<LoadPolicy>()).transpose()?;
    Ok(parsed.unwrap_or_default())
}

/// Parse the strict-terms flag from an optional string value. Defaults to `false`.
pub fn strict_terms_from_env_value(value: Option<String>) -> CoreResult<bool> {
    non_blank(value)
        .map(|v| {
            parse_bool_token(&v)
                .map_err(|err| CoreError::InvalidInput(format!("AIM_STRICT_TERMS: {err}")))
        })
        .transpose()
        .map(|flag| flag.unwrap_or(false))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
