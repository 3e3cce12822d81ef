use aim_core::config::{
    load_policy_from_env_value, resolve_template_dir, settings_path_from_env_value,
    strict_terms_from_env_value,
};
use aim_core::extensions::OpenFilesRequest;
use aim_core::settings::{load_settings, save_settings, MarkupColor};
use aim_core::{
    loader, AnnotationRow, AnnotationsListPresenter, AnnotationsListView, AuthoringSession,
    CoreConfig, EntryState, Extensions, LoadOptions, LoadPolicy, PageContext,
};
use aim_template::validation::validate_characteristic;
use aim_template::{ImagingObservationCharacteristic, ValidTerm};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "aim")]
#[command(about = "AIM annotation template characteristics CLI")]
struct Cli {
    /// Template directory (overrides AIM_TEMPLATE_DIR)
    #[arg(long, global = true)]
    template_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a single characteristic fragment
    Show {
        /// Path to an ImagingObservationCharacteristic XML fragment
        file: PathBuf,
    },
    /// Load a template document and report every characteristic
    Validate {
        /// Path to a template document
        file: PathBuf,
        /// Skip bad characteristics instead of aborting
        #[arg(long)]
        skip: bool,
        /// Also require well-formed controlled-vocabulary terms
        #[arg(long)]
        strict: bool,
    },
    /// List the characteristics of every template document in a directory
    List {
        /// Directory to scan (defaults to the template directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Print a new characteristic fragment
    New {
        /// Question type code value
        #[arg(long)]
        code_value: String,
        /// Question type code meaning
        #[arg(long)]
        code_meaning: String,
        /// Question type coding scheme designator
        #[arg(long)]
        coding_scheme: String,
        /// Question type coding scheme version (optional)
        #[arg(long)]
        coding_scheme_version: Option<String>,
        /// Characteristic label (optional)
        #[arg(long)]
        label: Option<String>,
        /// Mark the annotator as confident
        #[arg(long)]
        confidence: bool,
    },
    /// List the configuration pages offered to a user
    Pages {
        /// Permission held by the user, for example Viewer/Visible (repeatable)
        #[arg(long = "role")]
        roles: Vec<String>,
    },
    /// Update persisted AIM settings
    Settings {
        /// Default markup colour as #RRGGBB
        #[arg(long)]
        markup_color: Option<String>,
        /// Use a random colour for each new markup
        #[arg(long)]
        random_markup_color: Option<bool>,
        /// Local annotations folder
        #[arg(long)]
        local_annotations_folder: Option<PathBuf>,
    },
}

/// Prints annotation rows to stdout.
struct TextListView;

impl TextListView {
    fn line(row: &AnnotationRow) -> String {
        let state = match row.state {
            EntryState::Draft => "draft",
            EntryState::Persisted => "persisted",
        };
        format!(
            "  #{} {} | question: {} | confident: {} | {}",
            row.index + 1,
            row.label,
            row.question_type,
            row.annotator_confidence,
            state
        )
    }
}

impl AnnotationsListView for TextListView {
    fn render(&mut self, rows: &[AnnotationRow]) {
        if rows.is_empty() {
            println!("  (no characteristics)");
        }
        for row in rows {
            println!("{}", Self::line(row));
        }
    }

    fn update(&mut self, row: &AnnotationRow) {
        println!("{}", Self::line(row));
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn load_options_from_env() -> anyhow::Result<LoadOptions> {
    Ok(LoadOptions {
        policy: load_policy_from_env_value(env_value("AIM_LOAD_POLICY"))?,
        strict_terms: strict_terms_from_env_value(env_value("AIM_STRICT_TERMS"))?,
    })
}

/// Resolve configuration from the `--template-dir` flag first and environment variables second.
fn resolve_config(template_dir: Option<PathBuf>) -> anyhow::Result<CoreConfig> {
    let template_override =
        template_dir.or_else(|| env_value("AIM_TEMPLATE_DIR").map(PathBuf::from));
    let template_dir = resolve_template_dir(template_override)?;
    let settings_path = settings_path_from_env_value(env_value("AIM_SETTINGS_PATH"), &template_dir);

    Ok(CoreConfig::new(
        template_dir,
        settings_path,
        load_options_from_env()?,
    )?)
}

/// Run one command. Configuration is resolved only by the commands that read it.
fn run(command: Commands, template_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let extensions = Extensions::with_defaults();
    let presenter = AnnotationsListPresenter::new();

    match command {
        Commands::Show { file } => {
            let xml = std::fs::read_to_string(&file)?;
            let component = ImagingObservationCharacteristic::read_xml(&xml)?;
            let session = AuthoringSession::from_persisted(vec![component]);
            presenter.render(&session, &mut TextListView);

            if let Err(err) = validate_characteristic(session.get(0)?) {
                println!("warning: {err}");
            }
        }
        Commands::Validate { file, skip, strict } => {
            let mut options = load_options_from_env()?;
            if skip {
                options.policy = LoadPolicy::Skip;
            }
            options.strict_terms |= strict;

            let report = loader::load_file(&file, &options)?;
            println!(
                "{}: {} characteristic(s) loaded, {} skipped",
                file.display(),
                report.characteristics.len(),
                report.skipped.len()
            );
            for skipped in &report.skipped {
                println!("  skipped #{}: {}", skipped.position + 1, skipped.reason);
            }
        }
        Commands::List { dir } => {
            let (dir, options) = match dir {
                Some(dir) => (dir, load_options_from_env()?),
                None => {
                    let config = resolve_config(template_dir)?;
                    (config.template_dir().to_path_buf(), config.load_options())
                }
            };

            let files = extensions.open_files(&OpenFilesRequest::templates_in(dir))?;
            if files.is_empty() {
                println!("No template documents found.");
            }
            for file in files {
                println!("{}", file.display());
                match loader::load_file(&file, &options) {
                    Ok(report) => {
                        let session = AuthoringSession::from_persisted(report.characteristics);
                        presenter.render(&session, &mut TextListView);
                    }
                    Err(e) => tracing::warn!(
                        path = %file.display(),
                        error = %e,
                        "failed to load template document"
                    ),
                }
            }
        }
        Commands::New {
            code_value,
            code_meaning,
            coding_scheme,
            coding_scheme_version,
            label,
            confidence,
        } => {
            let mut question_type = ValidTerm::new(code_value, code_meaning, coding_scheme);
            if let Some(version) = coding_scheme_version {
                question_type = question_type.with_version(version);
            }

            let mut session = AuthoringSession::new();
            let index = session.add(ImagingObservationCharacteristic::new());
            {
                let component = session.get_mut(index)?;
                component.set_label(label);
                component.set_annotator_confidence(confidence);
                component.set_question_type(question_type);
            }
            validate_characteristic(session.get(index)?)?;

            println!("{}", session.get(index)?.write_xml()?);
        }
        Commands::Pages { roles } => {
            let config = resolve_config(template_dir)?;
            let settings = load_settings(config.settings_path())?;
            let pages = extensions.configuration_pages(&PageContext {
                permissions: &roles,
                settings: &settings,
            });
            if pages.is_empty() {
                println!("No configuration pages available.");
            }
            for page in pages {
                println!("{}: {}", page.path, page.summary);
            }
        }
        Commands::Settings {
            markup_color,
            random_markup_color,
            local_annotations_folder,
        } => {
            let config = resolve_config(template_dir)?;
            let path = config.settings_path();
            let mut settings = load_settings(path)?;
            if let Some(color) = markup_color {
                settings.default_markup_color = MarkupColor::parse(&color)?;
            }
            if let Some(random) = random_markup_color {
                settings.use_random_markup_color = random;
            }
            if let Some(folder) = local_annotations_folder {
                settings.local_annotations_folder = Some(folder);
            }
            save_settings(path, &settings)?;
            println!("Saved settings to {}", path.display());
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("aim=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(command) => run(command, cli.template_dir),
        None => {
            println!("Use 'aim --help' for commands");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn missing_template_dir(temp_dir: &TempDir) -> Option<PathBuf> {
        Some(temp_dir.path().join("no-such-templates"))
    }

    fn new_command() -> Commands {
        Commands::New {
            code_value: "RID5".into(),
            code_meaning: "shape".into(),
            coding_scheme: "RadLex".into(),
            coding_scheme_version: None,
            label: Some("Shape".into()),
            confidence: true,
        }
    }

    #[test]
    fn new_runs_without_a_template_dir() {
        let temp_dir = TempDir::new().expect("create temp dir");
        run(new_command(), missing_template_dir(&temp_dir)).expect("new should succeed");
    }

    #[test]
    fn show_runs_without_a_template_dir() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let file = temp_dir.path().join("shape.xml");
        std::fs::write(
            &file,
            r#"<ImagingObservationCharacteristic annotatorConfidence="true"><QuestionType/></ImagingObservationCharacteristic>"#,
        )
        .expect("write fragment");

        run(Commands::Show { file }, missing_template_dir(&temp_dir))
            .expect("show should succeed");
    }

    #[test]
    fn list_with_dir_ignores_template_dir() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let dir = temp_dir.path().join("templates");
        std::fs::create_dir(&dir).expect("create dir");
        std::fs::write(dir.join("broken.xml"), "<ImagingObservation>").expect("write document");

        run(
            Commands::List { dir: Some(dir) },
            missing_template_dir(&temp_dir),
        )
        .expect("list should succeed");
    }

    #[test]
    fn list_without_dir_reports_missing_template_dir() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let err = run(Commands::List { dir: None }, missing_template_dir(&temp_dir))
            .expect_err("should reject missing template dir");
        assert!(err.to_string().contains("not a directory"), "{err}");
    }
}
