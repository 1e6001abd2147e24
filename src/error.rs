use thiserror::Error;

/// Faults raised while reaching the spreadsheet or reading a worksheet.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Sheet read error: {0}")]
    SheetRead(String),

    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },
}

/// Faults raised while turning a raw grid into normalized records.
///
/// These never escape the load boundary: `loader::load_snapshot` stores them
/// on the snapshot next to an empty record set.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Sheet read error: missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("Sheet read error: {0}")]
    MalformedGrid(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}
