pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] metromap_core::Error),

    #[error("asset {name}: {message}")]
    Asset { name: String, message: String },

    #[error("asset not loaded: {name}")]
    AssetNotLoaded { name: String },
}
