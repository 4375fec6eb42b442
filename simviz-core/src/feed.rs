use simviz_common::{PyramidConfig, Result, SimVizError};

use crate::groups::{apply_visibility, build_groups, Group, LabelFormat};
use crate::histogram::{HistogramKind, WeightedHistogramDataset};
use crate::pyramid::{derive_groups, WeightedPyramidDataset};
use crate::source::WeightedArraySource;

/// Per-tick driver for weighted histograms.
///
/// Holds the configuration and the data sources; every
/// [`update`](Self::update) pulls each source and rebuilds a fresh dataset
/// from scratch. The returned snapshot is never mutated afterwards, so the
/// caller can hand it to a render thread and drop the previous one.
pub struct HistogramFeed {
    sources: Vec<(String, Box<dyn WeightedArraySource>)>,
    kind: HistogramKind,
    bins: usize,
    range: Option<(f64, f64)>,
}

impl std::fmt::Debug for HistogramFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistogramFeed")
            .field(
                "sources",
                &self
                    .sources
                    .iter()
                    .map(|(label, _)| label.as_str())
                    .collect::<Vec<_>>(),
            )
            .field("kind", &self.kind)
            .field("bins", &self.bins)
            .field("range", &self.range)
            .finish()
    }
}

impl HistogramFeed {
    /// Configuration is validated here, fail fast: relative-frequency
    /// output is not supported for weighted input, and a bad bin count or
    /// range should not wait for the first tick to surface.
    pub fn new(kind: HistogramKind, bins: usize, range: Option<(f64, f64)>) -> Result<Self> {
        match kind {
            HistogramKind::RelativeFrequency => {
                return Err(SimVizError::UnsupportedMode(
                    "relative-frequency output is not available for weighted input; \
                     use frequency or scale-area-to-one"
                        .into(),
                ));
            }
            HistogramKind::ScaleAreaToOne => {
                tracing::warn!("scale-area-to-one output for weighted input has seen little use");
            }
            HistogramKind::Frequency => {}
        }
        if bins < 1 {
            return Err(SimVizError::InvalidBinCount(bins));
        }
        if let Some((minimum, maximum)) = range {
            if minimum > maximum {
                return Err(SimVizError::InvalidRange {
                    start: minimum,
                    end: maximum,
                });
            }
        }
        Ok(Self {
            sources: Vec::new(),
            kind,
            bins,
            range,
        })
    }

    /// Registers a labelled source; the label becomes the series key.
    pub fn add_source(&mut self, label: impl Into<String>, source: Box<dyn WeightedArraySource>) {
        self.sources.push((label.into(), source));
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Pulls every source and rebuilds the dataset for this tick.
    pub fn update(&mut self) -> Result<WeightedHistogramDataset> {
        let mut dataset = WeightedHistogramDataset::new(self.kind);
        for (label, source) in self.sources.iter_mut() {
            source.update();
            let values = source.values();
            let weights = source.weights();
            match self.range {
                Some((minimum, maximum)) => {
                    dataset.add_series_with_range(
                        label.as_str(),
                        values,
                        weights,
                        self.bins,
                        minimum,
                        maximum,
                    )?;
                }
                None => {
                    dataset.add_series(label.as_str(), values, weights, self.bins)?;
                }
            }
        }
        Ok(dataset)
    }
}

/// Per-tick driver for pyramid aggregations over a left/right source pair.
///
/// Titles, side labels, label precision, traversal order and the scaling
/// factor all come from [`PyramidConfig`] rather than process-wide
/// defaults. Without explicit groups, one group per observed integer value
/// is derived anew on every tick.
pub struct PyramidFeed {
    config: PyramidConfig,
    groups: Option<Vec<Group>>,
    left: Box<dyn WeightedArraySource>,
    right: Box<dyn WeightedArraySource>,
}

impl std::fmt::Debug for PyramidFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PyramidFeed")
            .field("config", &self.config)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

impl PyramidFeed {
    /// A feed with no fixed groups; group boundaries follow the data
    /// window from tick to tick.
    pub fn new(
        config: PyramidConfig,
        left: Box<dyn WeightedArraySource>,
        right: Box<dyn WeightedArraySource>,
    ) -> Self {
        Self {
            config,
            groups: None,
            left,
            right,
        }
    }

    /// A feed over caller-supplied groups. Ranges are validated and the
    /// label-thinning rule is applied to the list as given.
    pub fn with_groups(
        config: PyramidConfig,
        mut groups: Vec<Group>,
        left: Box<dyn WeightedArraySource>,
        right: Box<dyn WeightedArraySource>,
    ) -> Result<Self> {
        for group in &groups {
            if group.range.0 > group.range.1 {
                return Err(SimVizError::InvalidRange {
                    start: group.range.0,
                    end: group.range.1,
                });
            }
        }
        apply_visibility(&mut groups);
        Ok(Self {
            config,
            groups: Some(groups),
            left,
            right,
        })
    }

    /// A feed whose groups are built from a start/end/step range, honouring
    /// `reverse_order` from the configuration.
    pub fn with_range(
        config: PyramidConfig,
        start: i64,
        end: i64,
        step: i64,
        left: Box<dyn WeightedArraySource>,
        right: Box<dyn WeightedArraySource>,
    ) -> Self {
        let format = LabelFormat::new(config.label_decimals);
        let groups = build_groups(start, end, step, config.reverse_order, format);
        Self {
            config,
            groups: Some(groups),
            left,
            right,
        }
    }

    pub fn config(&self) -> &PyramidConfig {
        &self.config
    }

    /// The fixed group list, or `None` when groups are derived per tick.
    pub fn groups(&self) -> Option<&[Group]> {
        self.groups.as_deref()
    }

    /// Pulls both sources and rebuilds the aggregation for this tick.
    pub fn update(&mut self) -> Result<WeightedPyramidDataset> {
        self.left.update();
        self.right.update();
        let values = [self.left.values(), self.right.values()];
        let weights = [self.left.weights(), self.right.weights()];

        let groups = match &self.groups {
            Some(groups) => groups.clone(),
            // recomputed every tick, never cached
            None => derive_groups(values, LabelFormat::new(self.config.label_decimals)),
        };

        let mut dataset = WeightedPyramidDataset::new(groups, self.config.scaling_factor);
        dataset.add_series(
            [self.config.left_label.as_str(), self.config.right_label.as_str()],
            values,
            weights,
        )?;
        Ok(dataset)
    }
}
