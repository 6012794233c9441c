use std::path::{Path, PathBuf};
use std::time::Duration;

use kbar_types::{KbarConfig, ParseMode, Tolerance};
use kbar_core::{CsvOptions, Granularity, KbarError};

/// Orchestrator bound to one data directory.
///
/// Cheap to clone; batch jobs carry their own copy onto worker threads.
#[derive(Debug, Clone)]
pub struct Kbar {
    pub(crate) data_dir: PathBuf,
    pub(crate) cfg: KbarConfig,
}

/// Builder for constructing a `Kbar` orchestrator with custom configuration.
#[derive(Debug, Clone)]
pub struct KbarBuilder {
    data_dir: Option<PathBuf>,
    cfg: KbarConfig,
}

impl Default for KbarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl KbarBuilder {
    /// Create a new builder with default configuration and no data directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data_dir: None,
            cfg: KbarConfig::default(),
        }
    }

    /// Directory holding `{code}_{token}.csv` input files. Required.
    #[must_use]
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Directory that derived files are written to.
    ///
    /// Unset by default; operations that write fail with `InvalidArg` until it
    /// is configured, so reference files in the data directory are never
    /// overwritten implicitly.
    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cfg.output_dir = Some(dir.into());
        self
    }

    /// Replace the whole configuration. The data directory is kept.
    #[must_use]
    pub fn config(mut self, cfg: KbarConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Whether input files start with a header row (default `true`).
    #[must_use]
    pub const fn has_header(mut self, yes: bool) -> Self {
        self.cfg.has_header = yes;
        self
    }

    /// Timestamp matching mode for input files.
    #[must_use]
    pub const fn parse_mode(mut self, mode: ParseMode) -> Self {
        self.cfg.parse_mode = mode;
        self
    }

    /// Tolerance used by `validate` and by batch validation.
    #[must_use]
    pub const fn tolerance(mut self, tolerance: Tolerance) -> Self {
        self.cfg.tolerance = tolerance;
        self
    }

    /// Reject input files whose timestamps are not strictly increasing.
    #[must_use]
    pub const fn strict_ordering(mut self, yes: bool) -> Self {
        self.cfg.strict_ordering = yes;
        self
    }

    /// Maximum number of batch jobs running at once (default 4).
    #[must_use]
    pub const fn max_workers(mut self, n: usize) -> Self {
        self.cfg.max_workers = n;
        self
    }

    /// Deadline for a whole batch run.
    ///
    /// When exceeded, `run` returns `RequestTimeout`. Jobs already running on
    /// blocking threads finish in the background; their results are dropped.
    #[must_use]
    pub const fn job_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.job_timeout = Some(timeout);
        self
    }

    /// Build the `Kbar` orchestrator.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no data directory was set or `max_workers` is 0.
    pub fn build(self) -> Result<Kbar, KbarError> {
        let Some(data_dir) = self.data_dir else {
            return Err(KbarError::InvalidArg(
                "no data directory configured; set one via data_dir(...)".to_string(),
            ));
        };
        if self.cfg.max_workers == 0 {
            return Err(KbarError::InvalidArg(
                "max_workers must be at least 1".to_string(),
            ));
        }
        Ok(Kbar {
            data_dir,
            cfg: self.cfg,
        })
    }
}

/// Await `fut`, failing with `RequestTimeout(what)` once `deadline` elapses.
pub(crate) async fn with_request_deadline<F>(
    deadline: Option<Duration>,
    what: &str,
    fut: F,
) -> Result<F::Output, KbarError>
where
    F: core::future::Future,
{
    match deadline {
        Some(d) => tokio::time::timeout(d, fut)
            .await
            .map_err(|_| KbarError::request_timeout(what)),
        None => Ok(fut.await),
    }
}

impl Kbar {
    /// Start building a new `Kbar` instance.
    ///
    /// ```rust,ignore
    /// use kbar::{Kbar, Tolerance};
    ///
    /// let kbar = Kbar::builder()
    ///     .data_dir("data")
    ///     .output_dir("data/generated")
    ///     .tolerance(Tolerance::price(0.01))
    ///     .max_workers(8)
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> KbarBuilder {
        KbarBuilder::new()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &KbarConfig {
        &self.cfg
    }

    /// Input directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// `{data_dir}/{code}_{token}.csv`.
    #[must_use]
    pub fn path_for(&self, code: &str, granularity: Granularity) -> PathBuf {
        self.data_dir.join(granularity.file_name(code))
    }

    /// `{output_dir}/{code}_{token}.csv`.
    ///
    /// The output directory may be the data directory, but an existing input
    /// file is never handed out as an output path.
    ///
    /// # Errors
    /// Returns `InvalidArg` when no output directory is configured or when the
    /// path resolves to the existing input `path_for(code, granularity)`, and
    /// `Io` when either path cannot be resolved.
    pub fn output_path_for(&self, code: &str, granularity: Granularity) -> Result<PathBuf, KbarError> {
        let dir = self.cfg.output_dir.as_ref().ok_or_else(|| {
            KbarError::InvalidArg(
                "no output directory configured; set one via output_dir(...)".to_string(),
            )
        })?;
        let out = dir.join(granularity.file_name(code));
        let input = self.path_for(code, granularity);
        if out.exists() && input.exists() && same_file(&out, &input)? {
            return Err(KbarError::InvalidArg(format!(
                "refusing to overwrite input file {}",
                input.display()
            )));
        }
        Ok(out)
    }

    pub(crate) const fn csv_options(&self) -> CsvOptions {
        CsvOptions {
            has_header: self.cfg.has_header,
            delimiter: b',',
            parse_mode: self.cfg.parse_mode,
            strict_ordering: self.cfg.strict_ordering,
        }
    }
}

fn same_file(a: &Path, b: &Path) -> Result<bool, KbarError> {
    let resolve = |p: &Path| {
        std::fs::canonicalize(p).map_err(|e| KbarError::io(p.display().to_string(), e))
    };
    Ok(resolve(a)? == resolve(b)?)
}
