use rdcf_core::provider::{CompanyMetrics, MetricsProvider, StaticMetricsProvider};
use rdcf_core::RdcfResult;

use super::file;

/// Company metrics loaded from a JSON array of records.
pub struct FileMetricsProvider {
    inner: StaticMetricsProvider,
}

impl FileMetricsProvider {
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let records: Vec<CompanyMetrics> = file::read_json(path)?;
        tracing::debug!(path, companies = records.len(), "loaded company metrics");
        Ok(FileMetricsProvider {
            inner: records.into_iter().collect(),
        })
    }

    pub fn symbols(&self) -> Vec<String> {
        self.inner.symbols()
    }
}

impl MetricsProvider for FileMetricsProvider {
    fn company_metrics(&self, symbol: &str) -> RdcfResult<CompanyMetrics> {
        self.inner.company_metrics(symbol)
    }
}
