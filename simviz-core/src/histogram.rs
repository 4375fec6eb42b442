use serde::{Deserialize, Serialize};
use simviz_common::{Result, SimVizError};

/// How bin occupancies are normalized when queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistogramKind {
    #[default]
    Frequency,
    RelativeFrequency,
    ScaleAreaToOne,
}

/// A half-open numeric interval accumulating a weighted occupancy count.
/// The last bin of a series is closed at its upper edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub weighted_count: f64,
}

impl HistogramBin {
    pub fn new(start: f64, end: f64) -> Result<Self> {
        if start > end {
            return Err(SimVizError::InvalidRange { start, end });
        }
        Ok(Self {
            start,
            end,
            weighted_count: 0.0,
        })
    }

    /// Adds `weight` to the occupancy count. Weights may be any real
    /// number; the caller is responsible for passing sensible ones.
    pub fn increment(&mut self, weight: f64) {
        self.weighted_count += weight;
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// One named sequence of bins built from one array of observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSeries {
    pub key: String,
    pub bins: Vec<HistogramBin>,
    pub sample_count: usize,
    pub bin_width: f64,
    pub total_weight: f64,
}

/// A weighted histogram dataset: one or more series of contiguous bins over
/// a value range, rebuilt from scratch for each aggregation pass.
///
/// Queries are indexed by `(series, item)` the way an interval renderer
/// consumes them; index accessors panic when out of range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightedHistogramDataset {
    series: Vec<HistogramSeries>,
    kind: HistogramKind,
}

impl WeightedHistogramDataset {
    pub fn new(kind: HistogramKind) -> Self {
        Self {
            series: Vec::new(),
            kind,
        }
    }

    pub fn kind(&self) -> HistogramKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: HistogramKind) {
        self.kind = kind;
    }

    /// Adds a series, inferring the bin range from the data itself.
    pub fn add_series(
        &mut self,
        key: impl Into<String>,
        values: &[f64],
        weights: &[f64],
        bins: usize,
    ) -> Result<&HistogramSeries> {
        let minimum = min_of(values)?;
        let maximum = max_of(values)?;
        self.add_series_with_range(key, values, weights, bins, minimum, maximum)
    }

    /// Adds a series binned over a fixed `[minimum, maximum]` range.
    ///
    /// Values below `minimum` collapse into the first bin and values at or
    /// above `maximum` into the last, so every observation lands somewhere
    /// and no weight is ever lost. Values on an interior boundary go to the
    /// higher-indexed bin.
    pub fn add_series_with_range(
        &mut self,
        key: impl Into<String>,
        values: &[f64],
        weights: &[f64],
        bins: usize,
        minimum: f64,
        maximum: f64,
    ) -> Result<&HistogramSeries> {
        if bins < 1 {
            return Err(SimVizError::InvalidBinCount(bins));
        }
        if values.len() != weights.len() {
            return Err(SimVizError::MismatchedLength {
                values: values.len(),
                weights: weights.len(),
            });
        }
        if values.is_empty() {
            return Err(SimVizError::EmptyInput("values"));
        }
        if minimum > maximum {
            return Err(SimVizError::InvalidRange {
                start: minimum,
                end: maximum,
            });
        }

        let bin_width = (maximum - minimum) / bins as f64;
        let mut bin_list = Vec::with_capacity(bins);
        let mut lower = minimum;
        for i in 0..bins {
            // pin the last bin's upper edge to `maximum` exactly; repeated
            // addition of bin_width drifts
            let upper = if i == bins - 1 {
                maximum
            } else {
                minimum + (i + 1) as f64 * bin_width
            };
            bin_list.push(HistogramBin::new(lower, upper)?);
            lower = upper;
        }

        let mut total_weight = 0.0;
        for (value, weight) in values.iter().zip(weights) {
            let index = if *value < maximum {
                let fraction = ((value - minimum) / (maximum - minimum)).max(0.0);
                // rounding can push the index to `bins`, clamp it back
                usize::min((fraction * bins as f64) as usize, bins - 1)
            } else {
                bins - 1
            };
            bin_list[index].increment(*weight);
            total_weight += *weight;
        }

        self.series.push(HistogramSeries {
            key: key.into(),
            bins: bin_list,
            sample_count: values.len(),
            bin_width,
            total_weight,
        });
        let last = self.series.len() - 1;
        Ok(&self.series[last])
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn series(&self, series: usize) -> &HistogramSeries {
        &self.series[series]
    }

    pub fn series_key(&self, series: usize) -> &str {
        &self.series[series].key
    }

    pub fn item_count(&self, series: usize) -> usize {
        self.series[series].bins.len()
    }

    /// Bin midpoint. A bar renderer ignores this, but a line renderer can
    /// plot it directly.
    pub fn x(&self, series: usize, item: usize) -> f64 {
        self.series[series].bins[item].midpoint()
    }

    /// Normalized bin magnitude for the dataset's kind.
    pub fn y(&self, series: usize, item: usize) -> f64 {
        let s = &self.series[series];
        let bin = &s.bins[item];
        match self.kind {
            HistogramKind::Frequency => bin.weighted_count,
            // denominator is the raw observation count, not the summed
            // weight; kept exactly as the historical behavior
            HistogramKind::RelativeFrequency => bin.weighted_count / s.sample_count as f64,
            HistogramKind::ScaleAreaToOne => {
                bin.weighted_count / (s.bin_width * s.sample_count as f64)
            }
        }
    }

    pub fn start_x(&self, series: usize, item: usize) -> f64 {
        self.series[series].bins[item].start
    }

    pub fn end_x(&self, series: usize, item: usize) -> f64 {
        self.series[series].bins[item].end
    }

    /// Same as [`y`](Self::y); there is no vertical interval.
    pub fn start_y(&self, series: usize, item: usize) -> f64 {
        self.y(series, item)
    }

    pub fn end_y(&self, series: usize, item: usize) -> f64 {
        self.y(series, item)
    }
}

fn min_of(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(SimVizError::EmptyInput("values"));
    }
    Ok(values.iter().copied().fold(f64::INFINITY, f64::min))
}

fn max_of(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(SimVizError::EmptyInput("values"));
    }
    Ok(values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_values_five_bins() {
        let mut ds = WeightedHistogramDataset::new(HistogramKind::Frequency);
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let weights = [1.0; 6];
        ds.add_series_with_range("pop", &values, &weights, 5, 0.0, 5.0)
            .unwrap();
        assert_eq!(ds.item_count(0), 5);
        // boundaries [0,1) [1,2) [2,3) [3,4) [4,5]; 5 >= max lands in the last bin
        let counts: Vec<f64> = (0..5).map(|i| ds.y(0, i)).collect();
        assert_eq!(counts, vec![1.0, 1.0, 1.0, 1.0, 2.0]);
        assert_eq!(ds.start_x(0, 0), 0.0);
        assert_eq!(ds.end_x(0, 4), 5.0);
        assert_eq!(ds.x(0, 0), 0.5);
        assert_eq!(ds.series(0).total_weight, 6.0);
    }

    #[test]
    fn weight_is_conserved_for_out_of_range_values() {
        let mut ds = WeightedHistogramDataset::default();
        let values = [-100.0, -1.0, 2.5, 99.0, 1e12];
        let weights = [0.5, 2.0, 3.0, 1.5, 4.0];
        let series = ds
            .add_series_with_range("s", &values, &weights, 4, 0.0, 10.0)
            .unwrap();
        let binned: f64 = series.bins.iter().map(|b| b.weighted_count).sum();
        assert_eq!(binned, weights.iter().sum::<f64>());
        // below-minimum values collapse into the first bin, at-or-above
        // maximum into the last
        assert_eq!(series.bins[0].weighted_count, 0.5 + 2.0);
        assert_eq!(series.bins[1].weighted_count, 3.0);
        assert_eq!(series.bins[3].weighted_count, 1.5 + 4.0);
    }

    #[test]
    fn last_edge_is_pinned_to_maximum() {
        let mut ds = WeightedHistogramDataset::default();
        let values = [0.25];
        let weights = [1.0];
        // 0.1 is not representable; repeated addition would drift
        let series = ds
            .add_series_with_range("s", &values, &weights, 7, 0.0, 0.7)
            .unwrap();
        assert_eq!(series.bins[0].start, 0.0);
        assert_eq!(series.bins[6].end, 0.7);
        for pair in series.bins.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn bin_index_is_monotonic() {
        let mut ds = WeightedHistogramDataset::default();
        let values: Vec<f64> = (1..100).map(|i| i as f64 / 10.0).collect();
        let weights = vec![1.0; values.len()];
        let series = ds
            .add_series_with_range("s", &values, &weights, 13, 0.0, 10.0)
            .unwrap();
        // strictly increasing interior values never move to a lower bin:
        // occupancy alone can't prove it, so recompute indices directly
        let mut last = 0usize;
        for v in &values {
            let fraction = ((v - 0.0) / 10.0).max(0.0);
            let idx = usize::min((fraction * 13.0) as usize, 12);
            assert!(idx >= last);
            last = idx;
        }
        assert_eq!(series.bins.len(), 13);
    }

    #[test]
    fn identical_calls_are_bit_identical() {
        let values = [0.3, 1.7, 2.2, 9.99, 5.5];
        let weights = [1.0, 0.25, 3.5, 2.0, 0.75];
        let build = || {
            let mut ds = WeightedHistogramDataset::new(HistogramKind::Frequency);
            ds.add_series_with_range("s", &values, &weights, 6, 0.0, 10.0)
                .unwrap();
            ds
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn inferred_range_uses_data_min_max() {
        let mut ds = WeightedHistogramDataset::default();
        let values = [3.0, 7.0, 5.0];
        let weights = [1.0, 1.0, 1.0];
        let series = ds.add_series("s", &values, &weights, 2).unwrap();
        assert_eq!(series.bins[0].start, 3.0);
        assert_eq!(series.bins[1].end, 7.0);
    }

    #[test]
    fn degenerate_range_puts_everything_in_the_last_bin() {
        let mut ds = WeightedHistogramDataset::default();
        let values = [4.0, 4.0, 4.0];
        let weights = [1.0, 2.0, 3.0];
        let series = ds.add_series("s", &values, &weights, 3).unwrap();
        assert_eq!(series.bin_width, 0.0);
        assert_eq!(series.bins[2].weighted_count, 6.0);
    }

    #[test]
    fn normalization_modes() {
        let values = [0.0, 1.0, 2.0, 3.0];
        let weights = [2.0, 2.0, 2.0, 2.0];
        let mut ds = WeightedHistogramDataset::new(HistogramKind::RelativeFrequency);
        ds.add_series_with_range("s", &values, &weights, 4, 0.0, 4.0)
            .unwrap();
        // weighted count over the raw item count, not the summed weight
        assert_eq!(ds.y(0, 0), 2.0 / 4.0);
        ds.set_kind(HistogramKind::ScaleAreaToOne);
        assert_eq!(ds.y(0, 0), 2.0 / (1.0 * 4.0));
        assert_eq!(ds.start_y(0, 0), ds.y(0, 0));
        assert_eq!(ds.end_y(0, 0), ds.y(0, 0));
    }

    #[test]
    fn validation_errors() {
        let mut ds = WeightedHistogramDataset::default();
        assert!(matches!(
            ds.add_series_with_range("s", &[1.0], &[1.0], 0, 0.0, 1.0),
            Err(SimVizError::InvalidBinCount(0))
        ));
        assert!(matches!(
            ds.add_series_with_range("s", &[1.0, 2.0], &[1.0], 3, 0.0, 1.0),
            Err(SimVizError::MismatchedLength { .. })
        ));
        assert!(matches!(
            ds.add_series("s", &[], &[], 3),
            Err(SimVizError::EmptyInput(_))
        ));
        assert!(matches!(
            ds.add_series_with_range("s", &[1.0], &[1.0], 3, 2.0, 1.0),
            Err(SimVizError::InvalidRange { .. })
        ));
        // failed calls leave the dataset untouched
        assert_eq!(ds.series_count(), 0);
        assert!(HistogramBin::new(2.0, 1.0).is_err());
    }
}
