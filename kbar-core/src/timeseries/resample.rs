use std::convert::Infallible;
use std::iter::{FusedIterator, Map};

use kbar_types::{Bar, Granularity, KTime, KbarError};

/// Stateless OHLCV aggregator for one target granularity.
///
/// Buckets are closed-left and labeled with their left edge. Within a bucket
/// bars are folded in arrival order:
/// - open = first open
/// - high = max high
/// - low = min low
/// - close = last close
/// - volume = sum of volumes
/// - turnover = sum of present turnovers (absent if none present)
/// - symbol = first present symbol
///
/// `turnover_rate` is never aggregated and is absent on every output bar.
/// Windows without input bars produce nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resampler {
    granularity: Granularity,
}

impl Resampler {
    /// Aggregator targeting `granularity`.
    #[must_use]
    pub const fn new(granularity: Granularity) -> Self {
        Self { granularity }
    }

    /// Target granularity.
    #[must_use]
    pub const fn granularity(self) -> Granularity {
        self.granularity
    }

    /// Label of the bucket that `ts` falls into.
    #[must_use]
    pub fn bucket_of(self, ts: KTime) -> KTime {
        self.granularity.floor(ts)
    }

    /// Lazily aggregate an ordered bar sequence.
    ///
    /// Each bucket is yielded as soon as a bar of a later bucket arrives; the
    /// last open bucket is yielded when the input ends.
    ///
    /// ```
    /// use kbar_core::{Bar, Granularity, KTime, Resampler};
    ///
    /// let t0 = KTime::from_ymd_hm(2024, 1, 2, 9, 30).unwrap();
    /// let bars = (0..10).map(|i| Bar::new(t0.plus_minutes(i), 1.0, 2.0, 0.5, 1.5, 10.0));
    /// let out: Vec<Bar> = Resampler::new(Granularity::M5).stream(bars).collect();
    /// assert_eq!(out.len(), 2);
    /// assert_eq!(out[1].ts, t0.plus_minutes(5));
    /// assert_eq!(out[1].volume, 50.0);
    /// ```
    pub fn stream<I>(self, bars: I) -> Resample<I::IntoIter>
    where
        I: IntoIterator<Item = Bar>,
    {
        let lift: fn(Bar) -> Result<Bar, Infallible> = Ok;
        Resample {
            inner: self.try_stream(bars.into_iter().map(lift)),
        }
    }

    /// Like [`Resampler::stream`] over a fallible input.
    ///
    /// The first upstream error is forwarded unchanged, the partially filled
    /// bucket is discarded and the adapter then yields `None`.
    pub fn try_stream<I, E>(self, bars: I) -> TryResample<I::IntoIter>
    where
        I: IntoIterator<Item = Result<Bar, E>>,
    {
        TryResample {
            inner: bars.into_iter(),
            granularity: self.granularity,
            open: None,
            done: false,
            emitted: 0,
            dropped: 0,
        }
    }
}

struct Bucket {
    start: KTime,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    turnover: Option<f64>,
    symbol: Option<String>,
}

impl Bucket {
    fn new(start: KTime, bar: Bar) -> Self {
        Self {
            start,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            turnover: bar.turnover,
            symbol: bar.symbol,
        }
    }

    fn absorb(&mut self, bar: Bar) {
        self.high = self.high.max(bar.high);
        self.low = self.low.min(bar.low);
        self.close = bar.close;
        self.volume += bar.volume;
        if let Some(t) = bar.turnover {
            self.turnover = Some(self.turnover.unwrap_or(0.0) + t);
        }
        if self.symbol.is_none() {
            self.symbol = bar.symbol;
        }
    }

    fn finish(self) -> Bar {
        Bar {
            ts: self.start,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            turnover: self.turnover,
            turnover_rate: None,
            symbol: self.symbol,
        }
    }
}

/// Adapter returned by [`Resampler::try_stream`].
pub struct TryResample<I> {
    inner: I,
    granularity: Granularity,
    open: Option<Bucket>,
    done: bool,
    emitted: usize,
    dropped: usize,
}

impl<I> TryResample<I> {
    /// Buckets yielded so far.
    #[must_use]
    pub const fn emitted(&self) -> usize {
        self.emitted
    }

    /// Out-of-order bars discarded so far.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    fn emit(&mut self, bucket: Bucket) -> Bar {
        self.emitted += 1;
        bucket.finish()
    }

    fn finish(&mut self) -> Option<Bar> {
        self.done = true;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "kbar_core::resample",
            granularity = %self.granularity,
            emitted = self.emitted + usize::from(self.open.is_some()),
            dropped = self.dropped,
            "resample finished"
        );
        let last = self.open.take()?;
        Some(self.emit(last))
    }
}

impl<I, E> Iterator for TryResample<I>
where
    I: Iterator<Item = Result<Bar, E>>,
{
    type Item = Result<Bar, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let bar = match self.inner.next() {
                None => return self.finish().map(Ok),
                Some(Err(e)) => {
                    self.done = true;
                    self.open = None;
                    return Some(Err(e));
                }
                Some(Ok(bar)) => bar,
            };
            let start = self.granularity.floor(bar.ts);
            match self.open.as_ref().map(|b| b.start) {
                None => self.open = Some(Bucket::new(start, bar)),
                Some(cur) if cur == start => {
                    if let Some(b) = self.open.as_mut() {
                        b.absorb(bar);
                    }
                }
                Some(cur) if start < cur => {
                    self.dropped += 1;
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        target: "kbar_core::resample",
                        ts = %bar.ts,
                        open_bucket = %cur,
                        "dropping out-of-order bar"
                    );
                }
                Some(_) => {
                    if let Some(closed) = self.open.replace(Bucket::new(start, bar)) {
                        return Some(Ok(self.emit(closed)));
                    }
                }
            }
        }
    }
}

impl<I, E> FusedIterator for TryResample<I> where I: Iterator<Item = Result<Bar, E>> {}

/// Adapter returned by [`Resampler::stream`].
pub struct Resample<I> {
    inner: TryResample<Map<I, fn(Bar) -> Result<Bar, Infallible>>>,
}

impl<I> Resample<I> {
    /// Out-of-order bars discarded so far.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.inner.dropped()
    }
}

impl<I> Iterator for Resample<I>
where
    I: Iterator<Item = Bar>,
{
    type Item = Bar;

    fn next(&mut self) -> Option<Bar> {
        self.inner.next().map(|r| match r {
            Ok(bar) => bar,
            Err(never) => match never {},
        })
    }
}

impl<I> FusedIterator for Resample<I> where I: Iterator<Item = Bar> {}

/// Sort `bars` by timestamp (stable) and aggregate them to `granularity`.
#[must_use]
pub fn resample(mut bars: Vec<Bar>, granularity: Granularity) -> Vec<Bar> {
    if bars.is_empty() {
        return bars;
    }
    bars.sort_by_key(|b| b.ts);
    Resampler::new(granularity).stream(bars).collect()
}

/// Resample to `minutes`-wide buckets anchored at midnight.
///
/// # Errors
/// Returns `InvalidArg` when `minutes` is zero or exceeds one day.
pub fn resample_to_minutes(bars: Vec<Bar>, minutes: u32) -> Result<Vec<Bar>, KbarError> {
    Ok(resample(bars, Granularity::minutes(minutes)?))
}

/// Resample to calendar days labeled at midnight.
#[must_use]
pub fn resample_to_daily(bars: Vec<Bar>) -> Vec<Bar> {
    resample(bars, Granularity::Day)
}

/// Resample to calendar weeks labeled at Monday midnight.
#[must_use]
pub fn resample_to_weekly(bars: Vec<Bar>) -> Vec<Bar> {
    resample(bars, Granularity::Week)
}

fn check_steps(steps: &[Granularity]) -> Result<(), KbarError> {
    if steps.is_empty() {
        return Err(KbarError::InvalidArg("resample chain has no steps".into()));
    }
    for pair in steps.windows(2) {
        if !pair[1].is_coarser_than(pair[0]) {
            return Err(KbarError::InvalidArg(format!(
                "resample chain step {} is not coarser than {}",
                pair[1], pair[0]
            )));
        }
        if !pair[1].is_aligned_with(pair[0]) {
            return Err(KbarError::InvalidArg(format!(
                "resample chain step {} is not a union of {} buckets",
                pair[1], pair[0]
            )));
        }
    }
    Ok(())
}

/// Apply successive granularities and return the final series.
///
/// Each step must be coarser than the previous one and aligned with it (see
/// [`Granularity::is_aligned_with`]), so the result equals a direct resample
/// to the last step.
///
/// # Errors
/// Returns `InvalidArg` when `steps` is empty, not strictly coarsening or not
/// aligned.
pub fn chain(bars: Vec<Bar>, steps: &[Granularity]) -> Result<Vec<Bar>, KbarError> {
    check_steps(steps)?;
    Ok(steps.iter().fold(bars, |acc, &g| resample(acc, g)))
}

/// Like [`chain`] but keeps every stage, in step order.
///
/// # Errors
/// Returns `InvalidArg` when `steps` is empty, not strictly coarsening or not
/// aligned.
pub fn chain_all(
    bars: Vec<Bar>,
    steps: &[Granularity],
) -> Result<Vec<(Granularity, Vec<Bar>)>, KbarError> {
    check_steps(steps)?;
    let mut stages: Vec<(Granularity, Vec<Bar>)> = Vec::with_capacity(steps.len());
    let mut current = bars;
    for &g in steps {
        current = resample(current, g);
        stages.push((g, current.clone()));
    }
    Ok(stages)
}
