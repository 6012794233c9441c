use std::path::PathBuf;

use crate::Kbar;
use kbar_core::{
    BarWriter, CsvBarSource, DateRange, Granularity, KbarError, Resampler, Schema, TryResample,
};

pub(crate) fn ensure_coarser(from: Granularity, to: Granularity) -> Result<(), KbarError> {
    if !to.is_coarser_than(from) {
        return Err(KbarError::InvalidArg(format!(
            "target granularity {to} is not coarser than source {from}"
        )));
    }
    if !to.is_aligned_with(from) {
        return Err(KbarError::InvalidArg(format!(
            "target granularity {to} does not split into {from} buckets"
        )));
    }
    Ok(())
}

impl Kbar {
    /// Stream `{code}_{from}.csv` aggregated to `to`.
    ///
    /// The file is read lazily; each bucket is yielded as soon as it closes.
    /// A read error ends the stream after being yielded.
    ///
    /// A bar older than the currently open bucket is dropped, not yielded as
    /// an error; [`TryResample::dropped`] counts them. Enable
    /// `strict_ordering` on the builder to make such files fail instead.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `to` is not coarser than `from` or its
    /// buckets do not split into `from` buckets, and
    /// `DataSourceNotFound` when the source file is missing.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            target = "kbar::router",
            skip(self, range),
            fields(code = code, from = %from, to = %to),
        )
    )]
    pub fn resample(
        &self,
        code: &str,
        from: Granularity,
        to: Granularity,
        range: DateRange,
    ) -> Result<TryResample<CsvBarSource>, KbarError> {
        ensure_coarser(from, to)?;
        let source = self.bars(code, from, range)?;
        Ok(Resampler::new(to).try_stream(source))
    }

    /// Resample a whole source file and write the result to
    /// `{output_dir}/{code}_{to}.csv` in the standard layout, so the output can
    /// itself be loaded or derived from.
    ///
    /// Returns the written path and the number of bars. Bars are written as
    /// they are produced; on error the partial file is left in place.
    ///
    /// # Errors
    /// Returns `InvalidArg` for a non-coarser target, a missing output
    /// directory or an output path that is an existing input file.
    /// Returns `DataFormat` when out-of-order bars were dropped, after the
    /// file has been written; enable `strict_ordering` to fail on the first
    /// such row instead. Any read or write error is returned as is.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            target = "kbar::router",
            skip(self),
            fields(code = code, from = %from, to = %to),
        )
    )]
    pub fn derive(
        &self,
        code: &str,
        from: Granularity,
        to: Granularity,
    ) -> Result<(PathBuf, usize), KbarError> {
        let out = self.output_path_for(code, to)?;
        let mut stream = self.resample(code, from, to, DateRange::all())?;
        let mut writer = BarWriter::create(&out, Schema::standard(), to)?;
        for bar in stream.by_ref() {
            writer.write(&bar?)?;
        }
        let n = writer.finish()?;
        if stream.dropped() > 0 {
            return Err(KbarError::data_format(
                self.path_for(code, from).display().to_string(),
                format!("{} out-of-order bars dropped while deriving {to}", stream.dropped()),
            ));
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "kbar::router", path = %out.display(), bars = n, "derived file written");
        Ok((out, n))
    }
}
