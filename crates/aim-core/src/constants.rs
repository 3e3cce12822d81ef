//! Constants used throughout the AIM core crate.

/// Default directory for annotation template documents when no explicit directory is configured.
pub const DEFAULT_TEMPLATE_DIR: &str = "aim-templates";

/// File extension of annotation template documents.
pub const TEMPLATE_FILE_EXTENSION: &str = "xml";

/// Filename for persisted viewer settings, resolved inside the template directory by default.
pub const SETTINGS_FILENAME: &str = "aim-settings.yaml";

/// Permission required before AIM configuration pages are offered.
pub const VIEWER_VISIBLE_PERMISSION: &str = "Viewer/Visible";

/// Default colour for new markup, as `#RRGGBB`.
pub const DEFAULT_MARKUP_COLOR: &str = "#FFFF00";

/// Capability name of the configuration page provider extension point.
pub const CONFIGURATION_PAGE_PROVIDER: &str = "configuration-page-provider";

/// Capability name of the open-files dialog extension point.
pub const OPEN_FILES_DIALOG: &str = "open-files-dialog";
