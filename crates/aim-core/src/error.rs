use aim_template::AimTemplateError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read directory: {0}")]
    DirectoryRead(std::io::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("settings schema mismatch: {0}")]
    SettingsMismatch(String),

    #[error("template error: {0}")]
    Template(#[from] AimTemplateError),
    #[error("characteristic {position} rejected: {source}")]
    Fragment {
        position: usize,
        #[source]
        source: AimTemplateError,
    },

    #[error("characteristic {0} does not exist")]
    UnknownCharacteristic(usize),
    #[error("characteristic {0} is attached to a persisted annotation; reopen it before editing")]
    CharacteristicSealed(usize),

    #[error("no extension registered for {0}")]
    NotSupported(&'static str),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
