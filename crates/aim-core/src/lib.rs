//! # AIM Core
//!
//! Core services for authoring annotation template characteristics.
//!
//! This crate sits between the wire model in `aim-template` and whatever front-end drives it:
//! - startup configuration and persisted viewer settings
//! - loading template documents with an abort-or-skip policy for bad fragments
//! - authoring sessions that own characteristics and guard persisted ones from edits
//! - the annotation-list presenter
//! - explicit registration of extension providers (configuration pages, open-files dialogs)
//!
//! **No GUI concerns**: rendering belongs to the front-end, which talks to the presenter and the
//! extension registry through the traits defined here.

pub mod config;
pub mod constants;
pub mod error;
pub mod extensions;
pub mod loader;
pub mod presenter;
pub mod session;
pub mod settings;

pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use extensions::{ConfigurationPage, Extensions, PageContext};
pub use loader::{LoadOptions, LoadPolicy, LoadReport};
pub use presenter::{AnnotationRow, AnnotationsListPresenter, AnnotationsListView};
pub use session::{AuthoringSession, EntryState};
pub use settings::AimSettings;
