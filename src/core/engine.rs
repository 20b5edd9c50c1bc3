use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Runs a pipeline end to end: extract, transform, load.
pub struct PlanEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> PlanEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting cutting plan run");
        self.monitor.log_stats("Startup");

        tracing::info!("Extracting production rows...");
        let rows = self.pipeline.extract().await?;
        tracing::info!("Extracted {} rows", rows.len());
        self.monitor.log_stats("Extract");

        tracing::info!("Planning cuts...");
        let result = self.pipeline.transform(rows).await?;
        let total_sheets: usize = result.plans.values().map(|p| p.total_sheets()).sum();
        tracing::info!(
            "Planned {} glass codes across {} sheets",
            result.plans.len(),
            total_sheets
        );
        self.monitor.log_stats("Transform");

        tracing::info!("Writing output...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
