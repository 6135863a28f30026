use feedplay_contracts::EngineError;
use feedplay_model::ItemKey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Cache engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),

    #[error("Item not mounted: {0}")]
    UnknownItem(ItemKey),
}

pub type Result<T> = std::result::Result<T, FeedError>;
