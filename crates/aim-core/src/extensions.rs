//! Explicit extension registration.
//!
//! Front-ends contribute behaviour to named extension points. Each [`ExtensionPoint`] maps a
//! capability name to the constructor functions registered for it; the [`Extensions`] registry
//! is populated by explicit calls at startup (see [`register_defaults`]) and then passed by
//! reference to whatever needs it.
//!
//! Two points are defined:
//! - `configuration-page-provider`: any number of providers, whose pages are concatenated.
//! - `open-files-dialog`: the first registered provider is used; none is
//!   [`CoreError::NotSupported`].

use crate::constants::{
    CONFIGURATION_PAGE_PROVIDER, OPEN_FILES_DIALOG, TEMPLATE_FILE_EXTENSION,
    VIEWER_VISIBLE_PERMISSION,
};
use crate::settings::AimSettings;
use crate::{CoreError, CoreResult};
use std::fs;
use std::path::PathBuf;

/// Constructor functions registered under one capability name.
pub struct ExtensionPoint<T: ?Sized> {
    name: &'static str,
    factories: Vec<fn() -> Box<T>>,
}

impl<T: ?Sized> ExtensionPoint<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            factories: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn register(&mut self, factory: fn() -> Box<T>) {
        self.factories.push(factory);
        tracing::debug!(
            point = self.name,
            registered = self.factories.len(),
            "registered extension"
        );
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Instantiate every registered extension, in registration order.
    pub fn create_all(&self) -> Vec<Box<T>> {
        self.factories.iter().map(|factory| factory()).collect()
    }

    /// Instantiate the first registered extension.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotSupported`] if nothing is registered.
    pub fn create_first(&self) -> CoreResult<Box<T>> {
        self.factories
            .first()
            .map(|factory| factory())
            .ok_or(CoreError::NotSupported(self.name))
    }
}

/// A page offered to the host settings dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigurationPage {
    /// Slash-separated location in the settings tree, for example `AIM/Markup Color`.
    pub path: String,
    pub summary: String,
}

/// What a configuration page provider may look at when building its pages.
#[derive(Clone, Copy, Debug)]
pub struct PageContext<'a> {
    pub permissions: &'a [String],
    pub settings: &'a AimSettings,
}

impl PageContext<'_> {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

pub trait ConfigurationPageProvider {
    fn pages(&self, context: &PageContext<'_>) -> Vec<ConfigurationPage>;
}

/// Arguments for an open-files request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenFilesRequest {
    pub directory: PathBuf,
    /// File extension to match, without the leading dot. Compared case-insensitively.
    pub extension: String,
}

impl OpenFilesRequest {
    pub fn templates_in(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            extension: TEMPLATE_FILE_EXTENSION.to_string(),
        }
    }
}

pub trait OpenFilesProvider {
    fn files(&self, request: &OpenFilesRequest) -> CoreResult<Vec<PathBuf>>;
}

/// The registry of every extension point.
pub struct Extensions {
    pub configuration_pages: ExtensionPoint<dyn ConfigurationPageProvider>,
    pub open_files: ExtensionPoint<dyn OpenFilesProvider>,
}

impl Default for Extensions {
    fn default() -> Self {
        Self {
            configuration_pages: ExtensionPoint::new(CONFIGURATION_PAGE_PROVIDER),
            open_files: ExtensionPoint::new(OPEN_FILES_DIALOG),
        }
    }
}

impl Extensions {
    /// Creates a registry with no extensions registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the AIM providers installed.
    pub fn with_defaults() -> Self {
        let mut extensions = Self::new();
        register_defaults(&mut extensions);
        extensions
    }

    /// Collect the pages of every configuration page provider.
    pub fn configuration_pages(&self, context: &PageContext<'_>) -> Vec<ConfigurationPage> {
        self.configuration_pages
            .create_all()
            .iter()
            .flat_map(|provider| provider.pages(context))
            .collect()
    }

    /// Ask the open-files provider for files.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotSupported`] if no provider is registered, or the provider's own
    /// error.
    pub fn open_files(&self, request: &OpenFilesRequest) -> CoreResult<Vec<PathBuf>> {
        self.open_files.create_first()?.files(request)
    }
}

/// Install the AIM configuration pages and the directory-backed open-files provider.
pub fn register_defaults(extensions: &mut Extensions) {
    extensions
        .configuration_pages
        .register(aim_configuration_page_provider);
    extensions.open_files.register(directory_open_files_provider);
}

fn aim_configuration_page_provider() -> Box<dyn ConfigurationPageProvider> {
    Box::new(AimConfigurationPageProvider)
}

fn directory_open_files_provider() -> Box<dyn OpenFilesProvider> {
    Box::new(DirectoryOpenFilesProvider)
}

/// Offers the AIM settings pages to users allowed to see the viewer.
#[derive(Clone, Copy, Debug, Default)]
pub struct AimConfigurationPageProvider;

impl AimConfigurationPageProvider {
    pub const GENERAL_PATH: &'static str = "AIM";
    pub const MARKUP_COLOR_PATH: &'static str = "AIM/Markup Color";
}

impl ConfigurationPageProvider for AimConfigurationPageProvider {
    fn pages(&self, context: &PageContext<'_>) -> Vec<ConfigurationPage> {
        if !context.has_permission(VIEWER_VISIBLE_PERMISSION) {
            return Vec::new();
        }

        let settings = context.settings;
        let folder = settings
            .local_annotations_folder
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<not set>".to_string());
        let color = if settings.use_random_markup_color {
            "random".to_string()
        } else {
            settings.default_markup_color.to_string()
        };

        vec![
            ConfigurationPage {
                path: Self::GENERAL_PATH.to_string(),
                summary: format!(
                    "local annotations folder: {folder}; show list on startup: {}",
                    settings.show_annotations_list_on_startup
                ),
            },
            ConfigurationPage {
                path: Self::MARKUP_COLOR_PATH.to_string(),
                summary: format!("markup colour: {color}"),
            },
        ]
    }
}

/// Lists matching files directly inside the requested directory, sorted by path.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectoryOpenFilesProvider;

impl OpenFilesProvider for DirectoryOpenFilesProvider {
    fn files(&self, request: &OpenFilesRequest) -> CoreResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(&request.directory).map_err(CoreError::DirectoryRead)? {
            let path = entry.map_err(CoreError::DirectoryRead)?.path();
            if !path.is_file() {
                continue;
            }
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(&request.extension));
            if matches {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }
}
