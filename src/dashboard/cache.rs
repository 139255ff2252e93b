// src/dashboard/cache.rs

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::pipeline::token::TokenCounter;
use crate::runner::{run_pipeline, PipelineRun};

/// Memoised pipeline runs keyed by the configuration fingerprint.
///
/// The lock is held for the whole run, so concurrent requests wait for the
/// first one instead of starting a second pipeline.
pub struct DashboardCache {
    counter: Arc<dyn TokenCounter>,
    runs: Mutex<HashMap<String, Arc<PipelineRun>>>,
}

impl DashboardCache {
    pub fn new(counter: Arc<dyn TokenCounter>) -> Self {
        DashboardCache {
            counter,
            runs: Mutex::new(HashMap::new()),
        }
    }

    /// The run for `config`, computing it on a blocking thread on first use.
    pub async fn get_or_run(&self, config: &PipelineConfig) -> Result<Arc<PipelineRun>> {
        let key = config.fingerprint()?;
        let mut runs = self.runs.lock().await;
        if let Some(run) = runs.get(&key) {
            debug!("Dashboard cache hit");
            return Ok(run.clone());
        }

        info!("Dashboard cache miss, running the pipeline");
        let config = config.clone();
        let counter = self.counter.clone();
        let run = tokio::task::spawn_blocking(move || run_pipeline(&config, counter))
            .await
            .map_err(|e| PipelineError::Unexpected(format!("Pipeline task failed: {}", e)))??;

        let run = Arc::new(run);
        runs.insert(key, run.clone());
        Ok(run)
    }

    pub async fn len(&self) -> usize {
        self.runs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.runs.lock().await.is_empty()
    }
}
