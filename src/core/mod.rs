pub mod etl;
pub mod export;
pub mod feed;
pub mod pipeline;

pub use crate::domain::ports::{ConfigProvider, FeedSnapshot, Pipeline, Storage, TransformResult};
pub use crate::utils::error::Result;
