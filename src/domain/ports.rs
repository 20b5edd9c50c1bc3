use crate::domain::model::{PlanResult, ProductionRow};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn input_csv(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn compress_output(&self) -> bool;
    /// Cap on extracted rows; `None` means unlimited.
    fn max_rows(&self) -> Option<usize> {
        None
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<ProductionRow>>;
    async fn transform(&self, rows: Vec<ProductionRow>) -> Result<PlanResult>;
    async fn load(&self, result: PlanResult) -> Result<String>;
}
