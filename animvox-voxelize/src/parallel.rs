//! Thread pool configuration for voxelization
//!
//! Voxelization parallelizes at two levels: frames are spread across
//! workers, and inside a frame triangles and voxels are processed with rayon
//! parallel iterators. Both run inside whichever pool [`ParallelConfig::install`]
//! selects.

use animvox_core::{Error, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

/// Parallel processing settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Enable parallel processing (can be disabled for debugging)
    pub enabled: bool,
    /// Number of worker threads (None = rayon's global pool)
    pub num_threads: Option<usize>,
    /// Thread stack size in bytes
    pub stack_size: Option<usize>,
    /// Thread name prefix
    pub thread_name_prefix: String,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            num_threads: None,
            stack_size: None,
            thread_name_prefix: "animvox".to_string(),
        }
    }
}

impl ParallelConfig {
    /// Configuration that runs everything on the calling thread
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Set number of threads
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Set stack size
    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = Some(stack_size);
        self
    }

    /// Enable or disable parallel processing
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Build a dedicated pool, or `None` when the global pool should be used
    pub fn build_pool(&self) -> Result<Option<ThreadPool>> {
        if !self.enabled || (self.num_threads.is_none() && self.stack_size.is_none()) {
            return Ok(None);
        }

        let mut builder = ThreadPoolBuilder::new();

        if let Some(num_threads) = self.num_threads {
            if num_threads == 0 {
                return Err(Error::ThreadPool("thread count must be at least 1".to_string()));
            }
            builder = builder.num_threads(num_threads);
        }

        if let Some(stack_size) = self.stack_size {
            builder = builder.stack_size(stack_size);
        }

        if !self.thread_name_prefix.is_empty() {
            let prefix = self.thread_name_prefix.clone();
            builder = builder.thread_name(move |index| format!("{}-{}", prefix, index));
        }

        let pool = builder
            .build()
            .map_err(|e| Error::ThreadPool(format!("Failed to create thread pool: {}", e)))?;

        Ok(Some(pool))
    }

    /// Run `op` inside the configured pool
    pub fn install<R, F>(&self, op: F) -> Result<R>
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match self.build_pool()? {
            Some(pool) => {
                log::debug!("Running on a dedicated pool of {} threads", pool.current_num_threads());
                Ok(pool.install(op))
            }
            None => Ok(op()),
        }
    }
}
