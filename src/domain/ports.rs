use crate::core::export::OutputFile;
use crate::core::feed::CarparkRecord;
use crate::domain::index::AttachSummary;
use crate::domain::model::{Availability, Carpark};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn carpark_info_endpoint(&self) -> &str;
    fn availability_endpoint(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn archive_name(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn request_timeout_secs(&self) -> u64;
}

/// Raw feed contents as fetched, before any joining.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub records: Vec<CarparkRecord>,
    pub availabilities: Vec<Availability>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub carparks: Vec<Carpark>,
    pub summary: AttachSummary,
    pub skipped_records: usize,
    pub outputs: Vec<OutputFile>,
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<FeedSnapshot>;
    async fn transform(&self, snapshot: FeedSnapshot) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
