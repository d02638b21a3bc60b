use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting carpark ETL process...");

        tracing::info!("Extracting carpark feeds...");
        let snapshot = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} carpark records and {} availability snapshots",
            snapshot.records.len(),
            snapshot.availabilities.len()
        );
        self.monitor.log_phase("extract");

        tracing::info!("Transforming data...");
        let result = self.pipeline.transform(snapshot).await?;
        tracing::info!(
            "Built {} carparks ({} with availability, {} skipped)",
            result.carparks.len(),
            result.summary.matched,
            result.skipped_records
        );
        if !result.summary.orphan_availabilities.is_empty() {
            tracing::warn!(
                "{} availability snapshots refer to unknown carparks",
                result.summary.orphan_availabilities.len()
            );
        }
        self.monitor.log_phase("transform");

        tracing::info!("Loading {} output files...", result.outputs.len());
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_phase("load");

        self.monitor.log_summary();
        Ok(output_path)
    }
}
