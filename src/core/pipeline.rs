use crate::core::export::{self, OutputFormat};
use crate::core::feed::{decode_availability_feed, decode_carpark_records};
use crate::core::{ConfigProvider, FeedSnapshot, Pipeline, Storage, TransformResult};
use crate::domain::index::AvailabilityIndex;
use crate::utils::error::Result;
use reqwest::Client;
use std::io::Write;
use std::time::Duration;
use zip::write::{FileOptions, ZipWriter};

pub struct CarparkPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> CarparkPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs()))
            .build()?;

        Ok(Self {
            storage,
            config,
            client,
        })
    }

    async fn fetch_json(&self, endpoint: &str) -> Result<serde_json::Value> {
        tracing::debug!("Making API request to: {}", endpoint);

        let mut request = self.client.get(endpoint);
        if let Some(api_key) = self.config.api_key() {
            request = request.header("x-api-key", api_key);
        }

        let response = request.send().await?;
        tracing::debug!("API response status: {}", response.status());

        Ok(response.error_for_status()?.json().await?)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CarparkPipeline<S, C> {
    async fn extract(&self) -> Result<FeedSnapshot> {
        let (info_payload, availability_payload) = tokio::try_join!(
            self.fetch_json(self.config.carpark_info_endpoint()),
            self.fetch_json(self.config.availability_endpoint()),
        )?;

        let records = decode_carpark_records(info_payload)?;
        let availabilities = decode_availability_feed(availability_payload)?;

        if availabilities.is_empty() {
            tracing::warn!("Availability feed returned no snapshots");
        }

        Ok(FeedSnapshot {
            records,
            availabilities,
        })
    }

    async fn transform(&self, snapshot: FeedSnapshot) -> Result<TransformResult> {
        let mut carparks = Vec::with_capacity(snapshot.records.len());
        let mut skipped_records = 0;

        for record in snapshot.records {
            match record.into_carpark() {
                Ok(carpark) => carparks.push(carpark),
                Err(e) => {
                    tracing::warn!("Skipping carpark record: {}", e);
                    skipped_records += 1;
                }
            }
        }

        let index = AvailabilityIndex::from_snapshots(snapshot.availabilities);
        let summary = index.attach(&mut carparks);

        tracing::debug!(
            "Attached availability to {} of {} carparks ({} snapshots unclaimed)",
            summary.matched,
            carparks.len(),
            summary.orphan_availabilities.len()
        );

        let mut formats: Vec<OutputFormat> = Vec::new();
        for format in self.config.output_formats() {
            let format: OutputFormat = format.parse()?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }

        let mut outputs = Vec::new();
        for format in formats {
            outputs.extend(export::render(&carparks, format)?);
        }

        Ok(TransformResult {
            carparks,
            summary,
            skipped_records,
            outputs,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let archive_name = self.config.archive_name();
        let output_path = format!("{}/{}", self.config.output_path(), archive_name);

        tracing::debug!("Creating ZIP file with {} files", result.outputs.len());

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            for file in &result.outputs {
                zip.start_file::<_, ()>(file.name.as_str(), FileOptions::default())?;
                zip.write_all(file.content.as_bytes())?;
            }

            zip.finish()?.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(archive_name, &zip_data).await?;

        Ok(output_path)
    }
}
