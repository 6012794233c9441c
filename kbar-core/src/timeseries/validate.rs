use std::collections::BTreeMap;

use kbar_types::{Bar, Field, KTime, Tolerance, ValidationReport};

/// Compares two bar series field by field over their common timestamps.
///
/// Price-like fields (open/high/low/close, turnover) use the absolute price
/// tolerance; volume uses the volume tolerance. Every field is checked at
/// every common timestamp; the report holds one entry per failing field.
#[derive(Debug, Clone, PartialEq)]
pub struct Validator {
    tolerance: Tolerance,
    fields: Vec<Field>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(Tolerance::default())
    }
}

impl Validator {
    /// Validator checking open, high, low, close and volume.
    #[must_use]
    pub fn new(tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            fields: Field::DEFAULT_CHECKED.to_vec(),
        }
    }

    /// Replace the checked field set. Duplicates are ignored.
    #[must_use]
    pub fn fields(mut self, fields: &[Field]) -> Self {
        self.fields.clear();
        for &f in fields {
            if !self.fields.contains(&f) {
                self.fields.push(f);
            }
        }
        self
    }

    /// Tolerance in use.
    #[must_use]
    pub const fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Fields that will be checked, in report order.
    #[must_use]
    pub fn checked_fields(&self) -> &[Field] {
        &self.fields
    }

    const fn tolerance_for(&self, field: Field) -> f64 {
        match field {
            Field::Volume => self.tolerance.volume,
            _ => self.tolerance.price,
        }
    }

    /// Compare `left` against `right`.
    ///
    /// Inputs need not be sorted. When a timestamp repeats within one input
    /// only its first occurrence is used. An optional field absent on both
    /// sides is skipped; absent on one side only counts as a mismatch.
    #[must_use]
    pub fn validate(&self, left: &[Bar], right: &[Bar]) -> ValidationReport {
        let left = index(left);
        let right = index(right);
        let pairs: Vec<(KTime, &Bar, &Bar)> = left
            .iter()
            .filter_map(|(ts, l)| right.get(ts).map(|r| (*ts, *l, *r)))
            .collect();

        if pairs.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::debug!(target: "kbar_core::validate", "no common timestamps");
            return ValidationReport::no_overlap();
        }

        let mut report = ValidationReport::passed(pairs.len());
        for &field in &self.fields {
            if let Some(desc) = self.check_field(field, &pairs) {
                report.record(field.name(), desc);
            }
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "kbar_core::validate",
            common = report.common,
            failing = report.mismatches.len(),
            "validated series"
        );
        report
    }

    fn check_field(&self, field: Field, pairs: &[(KTime, &Bar, &Bar)]) -> Option<String> {
        let tol = self.tolerance_for(field);
        let mut failures = 0usize;
        let mut first: Option<(KTime, Option<f64>, Option<f64>)> = None;
        let mut max_diff = 0.0_f64;
        for &(ts, l, r) in pairs {
            let (a, b) = (l.get(field), r.get(field));
            let diff = match (a, b) {
                (None, None) => continue,
                (Some(a), Some(b)) => (a - b).abs(),
                _ => f64::INFINITY,
            };
            if diff <= tol {
                continue;
            }
            failures += 1;
            if diff > max_diff || diff.is_nan() {
                max_diff = diff;
            }
            first.get_or_insert((ts, a, b));
        }
        let (ts, a, b) = first?;
        Some(format!(
            "{field} mismatch at {failures} of {} common timestamps (first at {ts}: {} vs {}, max abs diff {max_diff})",
            pairs.len(),
            show(a),
            show(b),
        ))
    }
}

fn index(bars: &[Bar]) -> BTreeMap<KTime, &Bar> {
    let mut map = BTreeMap::new();
    for bar in bars {
        map.entry(bar.ts).or_insert(bar);
    }
    map
}

fn show(v: Option<f64>) -> String {
    v.map_or_else(|| "absent".to_string(), |x| x.to_string())
}

/// Shorthand for `Validator::new(tolerance).validate(left, right)`.
#[must_use]
pub fn validate_bars(left: &[Bar], right: &[Bar], tolerance: Tolerance) -> ValidationReport {
    Validator::new(tolerance).validate(left, right)
}
