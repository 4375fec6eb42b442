pub mod feed;
pub mod groups;
pub mod histogram;
pub mod pyramid;
pub mod source;

pub use simviz_common::{Config, HistogramConfig, PyramidConfig, Result, SimVizError};

pub use feed::{HistogramFeed, PyramidFeed};
pub use groups::{apply_visibility, build_groups, Group, LabelFormat, MAX_VISIBLE_CATEGORIES};
pub use histogram::{HistogramBin, HistogramKind, HistogramSeries, WeightedHistogramDataset};
pub use pyramid::{derive_groups, WeightedPyramidDataset};
pub use source::{VecSource, WeightedArraySource};
