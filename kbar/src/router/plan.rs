use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::Kbar;
use crate::router::resample::ensure_coarser;
use crate::router::util::{collapse_errors, join_with_deadline};
use kbar_core::{
    Bar, BatchEntry, BatchReport, DateRange, Granularity, KbarError, Schema, chain_all,
    ensure_cadence, resample, write_bars,
};

/// Builder for a batch of resampling jobs over several instruments.
///
/// Each job reads one source file, produces one or more coarser series and
/// optionally writes and validates them. Jobs share no state and run on
/// blocking worker threads, at most `max_workers` at a time.
pub struct PlanBuilder<'a> {
    pub(crate) kbar: &'a Kbar,
    pub(crate) instruments: Vec<String>,
    pub(crate) source: Granularity,
    pub(crate) targets: Vec<Granularity>,
    pub(crate) chained: bool,
    pub(crate) validate_against: Option<Granularity>,
    pub(crate) range: DateRange,
    pub(crate) write_outputs: bool,
}

impl<'a> PlanBuilder<'a> {
    /// Create a new builder bound to a `Kbar` instance.
    ///
    /// Defaults: one-minute source, no targets, independent (not chained)
    /// jobs, no validation, whole files, nothing written.
    #[must_use]
    pub const fn new(kbar: &'a Kbar) -> Self {
        Self {
            kbar,
            instruments: Vec::new(),
            source: Granularity::M1,
            targets: Vec::new(),
            chained: false,
            validate_against: None,
            range: DateRange::all(),
            write_outputs: false,
        }
    }

    /// Replace the instrument list.
    ///
    /// # Errors
    /// Returns `InvalidArg` on an empty or duplicate code.
    pub fn instruments(mut self, codes: &[&str]) -> Result<Self, KbarError> {
        self.instruments.clear();
        for code in codes {
            self = self.add_instrument(code)?;
        }
        Ok(self)
    }

    /// Append one instrument.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the code is empty or already listed.
    pub fn add_instrument(mut self, code: &str) -> Result<Self, KbarError> {
        if code.trim().is_empty() {
            return Err(KbarError::InvalidArg("empty instrument code".into()));
        }
        if self.instruments.iter().any(|c| c == code) {
            return Err(KbarError::InvalidArg(format!(
                "duplicate instrument '{code}' in plan"
            )));
        }
        self.instruments.push(code.to_string());
        Ok(self)
    }

    /// Granularity of the input files (default one minute).
    #[must_use]
    pub const fn source(mut self, granularity: Granularity) -> Self {
        self.source = granularity;
        self
    }

    /// Granularities to produce. Duplicates are ignored.
    #[must_use]
    pub fn targets(mut self, targets: &[Granularity]) -> Self {
        self.targets = targets.to_vec();
        self
    }

    /// Produce targets by successive composition (finest first) in a single
    /// job per instrument instead of one direct job per target.
    ///
    /// Every target must then split into the buckets of the next finer one,
    /// e.g. 5m, 15m, 30m, day.
    #[must_use]
    pub const fn chained(mut self, yes: bool) -> Self {
        self.chained = yes;
        self
    }

    /// Validate the produced series of `granularity` against the reference
    /// file `{code}_{granularity}.csv` in the data directory.
    #[must_use]
    pub const fn validate_against(mut self, granularity: Granularity) -> Self {
        self.validate_against = Some(granularity);
        self
    }

    /// Restrict source and reference reads to `range`.
    #[must_use]
    pub const fn range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    /// Write every produced series to the output directory.
    #[must_use]
    pub const fn write_outputs(mut self, yes: bool) -> Self {
        self.write_outputs = yes;
        self
    }

    fn jobs(&self) -> Result<Vec<Job>, KbarError> {
        if self.instruments.is_empty() {
            return Err(KbarError::InvalidArg(
                "no instruments specified for plan".into(),
            ));
        }
        let mut seen = HashSet::new();
        let mut targets: Vec<Granularity> = self
            .targets
            .iter()
            .copied()
            .filter(|g| seen.insert(*g))
            .collect();
        if targets.is_empty() {
            return Err(KbarError::InvalidArg("no target granularities specified".into()));
        }
        targets.sort();
        for &g in &targets {
            ensure_coarser(self.source, g)?;
        }
        if self.chained {
            for pair in targets.windows(2) {
                ensure_coarser(pair[0], pair[1])?;
            }
        }
        if let Some(v) = self.validate_against
            && !targets.contains(&v)
        {
            return Err(KbarError::InvalidArg(format!(
                "validation granularity {v} is not among the plan targets"
            )));
        }
        if self.write_outputs && self.kbar.cfg.output_dir.is_none() {
            return Err(KbarError::InvalidArg(
                "write_outputs requires an output directory".into(),
            ));
        }

        let job = |code: &String, targets: Vec<Granularity>| Job {
            code: code.clone(),
            source: self.source,
            targets,
            chained: self.chained,
            validate_against: self.validate_against,
            range: self.range,
            write: self.write_outputs,
        };
        let jobs = if self.chained {
            self.instruments
                .iter()
                .map(|code| job(code, targets.clone()))
                .collect()
        } else {
            self.instruments
                .iter()
                .flat_map(|code| targets.iter().map(move |&g| (code, g)))
                .map(|(code, g)| job(code, vec![g]))
                .collect()
        };
        Ok(jobs)
    }

    /// Execute the plan and aggregate the results.
    ///
    /// Behavior:
    /// - Failed jobs do not abort the batch; their errors are returned in
    ///   `BatchReport::warnings`.
    /// - Entries are sorted by instrument, then granularity.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an inconsistent plan, `RequestTimeout` when the
    /// configured job timeout elapses, and the collapsed job errors when no
    /// job succeeded.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            target = "kbar::plan",
            skip(self),
            fields(
                instruments = self.instruments.len(),
                source = %self.source,
                chained = self.chained,
            ),
        )
    )]
    pub async fn run(self) -> Result<BatchReport, KbarError> {
        let jobs = self.jobs()?;
        let sem = Arc::new(Semaphore::new(self.kbar.cfg.max_workers));

        let tasks = jobs
            .into_iter()
            .map(|job| spawn_job(self.kbar.clone(), job, Arc::clone(&sem)));
        let joined = join_with_deadline(tasks, self.kbar.cfg.job_timeout, "plan").await?;

        let mut entries: Vec<BatchEntry> = Vec::new();
        let mut warnings: Vec<KbarError> = Vec::new();
        for result in joined {
            match result {
                Ok(mut produced) => entries.append(&mut produced),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(target: "kbar::plan", error = %e, "job failed");
                    warnings.push(e);
                }
            }
        }
        if entries.is_empty() {
            return Err(collapse_errors("plan", warnings));
        }
        entries.sort_by(|a, b| {
            a.instrument
                .cmp(&b.instrument)
                .then(a.granularity.cmp(&b.granularity))
        });
        Ok(BatchReport { entries, warnings })
    }
}

async fn spawn_job(
    kbar: Kbar,
    job: Job,
    sem: Arc<Semaphore>,
) -> Result<Vec<BatchEntry>, KbarError> {
    let label = job.label();
    let _permit = sem
        .acquire_owned()
        .await
        .map_err(|e| KbarError::job_failed(&label, e.to_string()))?;
    tokio::task::spawn_blocking(move || job.execute(&kbar))
        .await
        .map_err(|e| KbarError::job_failed(label, e.to_string()))?
}

struct Job {
    code: String,
    source: Granularity,
    targets: Vec<Granularity>,
    chained: bool,
    validate_against: Option<Granularity>,
    range: DateRange,
    write: bool,
}

impl Job {
    fn label(&self) -> String {
        let steps: Vec<String> = self.targets.iter().map(|g| g.token()).collect();
        format!("{}@{}", self.code, steps.join(">"))
    }

    fn execute(&self, kbar: &Kbar) -> Result<Vec<BatchEntry>, KbarError> {
        let bars = kbar.load(&self.code, self.source, self.range)?;
        let label = kbar.path_for(&self.code, self.source).display().to_string();
        ensure_cadence(&bars, self.source, &label)?;
        let stages: Vec<(Granularity, Vec<Bar>)> = if self.chained {
            chain_all(bars, &self.targets)?
        } else {
            self.targets
                .iter()
                .map(|&g| (g, resample(bars.clone(), g)))
                .collect()
        };

        let mut entries = Vec::with_capacity(stages.len());
        for (granularity, series) in stages {
            let output = if self.write {
                let path = kbar.output_path_for(&self.code, granularity)?;
                write_bars(&path, Schema::standard(), granularity, &series)?;
                Some(path)
            } else {
                None
            };
            let validation = if self.validate_against == Some(granularity) {
                Some(kbar.validate(&self.code, &series, granularity, self.range)?)
            } else {
                None
            };
            entries.push(BatchEntry {
                instrument: self.code.clone(),
                granularity,
                bars: series.len(),
                output,
                validation,
            });
        }
        Ok(entries)
    }
}

impl Kbar {
    /// Begin building a batch plan.
    ///
    /// Typical usage: chain `instruments`/`targets`/`validate_against` then
    /// call `run().await`.
    #[must_use]
    pub const fn plan(&self) -> PlanBuilder<'_> {
        PlanBuilder::new(self)
    }
}
