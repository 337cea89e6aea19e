pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("map description JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown line: {name}")]
    LineNotFound { name: String },

    #[error("unknown station: {station} (line {line})")]
    StationNotFound { line: String, station: String },

    #[error(
        "line segment too short: line {line}, element {index} resolves to {length} px after joint corrections"
    )]
    SegmentTooShort {
        line: String,
        index: usize,
        length: i32,
    },

    #[error("line {line} has no elements")]
    EmptyLine { line: String },

    #[error("line {name}: {message}")]
    InvalidLine { name: String, message: String },
}
