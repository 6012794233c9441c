use crate::Kbar;
use kbar_core::{
    Bar, DateRange, Granularity, KbarError, ValidationReport, Validator, ensure_cadence,
    ensure_series,
};

impl Kbar {
    /// Compare `bars` against the reference file `{code}_{reference}.csv`.
    ///
    /// The reference is read under `range` and compared with the configured
    /// tolerance on open, high, low, close and volume.
    ///
    /// # Errors
    /// Returns an error only when the reference cannot be read. Mismatches are
    /// reported in the returned `ValidationReport`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            target = "kbar::router",
            skip(self, bars, range),
            fields(code = code, reference = %reference, bars = bars.len()),
        )
    )]
    pub fn validate(
        &self,
        code: &str,
        bars: &[Bar],
        reference: Granularity,
        range: DateRange,
    ) -> Result<ValidationReport, KbarError> {
        let expected = self.load(code, reference, range)?;
        let report = Validator::new(self.cfg.tolerance).validate(bars, &expected);
        #[cfg(feature = "tracing")]
        {
            if !report.is_valid {
                tracing::warn!(
                    target: "kbar::router",
                    code,
                    failing = ?report.mismatches.keys().collect::<Vec<_>>(),
                    "validation failed"
                );
            }
        }
        Ok(report)
    }

    /// Check bar invariants, strict ordering and row spacing against
    /// `granularity` over a whole file.
    ///
    /// Returns the number of bars checked.
    ///
    /// # Errors
    /// Returns `DataFormat` naming the first violation, or any read error.
    pub fn check(&self, code: &str, granularity: Granularity) -> Result<usize, KbarError> {
        let bars = self.load(code, granularity, DateRange::all())?;
        let label = self.path_for(code, granularity).display().to_string();
        ensure_series(&bars, &label)?;
        ensure_cadence(&bars, granularity, &label)?;
        Ok(bars.len())
    }
}
