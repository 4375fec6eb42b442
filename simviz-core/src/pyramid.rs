use serde::{Deserialize, Serialize};
use simviz_common::{Result, SimVizError};

use crate::groups::{build_groups, Group, LabelFormat};

/// A two-sided weighted category aggregation (e.g. ages of males/females
/// for a population pyramid).
///
/// Each observation is assigned to the first group whose inclusive range
/// contains it; earlier groups win when ranges overlap, and observations
/// matching no group contribute nothing. Side 0 accumulates negated sums so
/// it renders to the left of the axis, side 1 positive sums to the right.
/// Every weight contribution is multiplied by a uniform scaling factor
/// (e.g. to gross a sample up to a full population).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedPyramidDataset {
    groups: Vec<Group>,
    scaling_factor: f64,
    series_keys: Vec<String>,
    data: Vec<Vec<f64>>, // [series][group]
}

impl WeightedPyramidDataset {
    pub fn new(groups: Vec<Group>, scaling_factor: f64) -> Self {
        Self {
            groups,
            scaling_factor,
            series_keys: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Accumulates the two cross-sections into per-group sums.
    ///
    /// `values[s]` and `weights[s]` must have equal, non-zero length for
    /// each side `s`. Observations are processed in array order; the float
    /// sums are therefore reproducible bit for bit.
    ///
    /// A dataset holds exactly one aggregation pass: build a fresh one per
    /// tick instead of calling this twice on the same value.
    pub fn add_series(
        &mut self,
        keys: [&str; 2],
        values: [&[f64]; 2],
        weights: [&[f64]; 2],
    ) -> Result<()> {
        debug_assert!(
            self.series_keys.is_empty(),
            "pyramid datasets are single-pass; build a fresh one per tick"
        );
        for s in 0..2 {
            if values[s].len() != weights[s].len() {
                return Err(SimVizError::MismatchedLength {
                    values: values[s].len(),
                    weights: weights[s].len(),
                });
            }
            if values[s].is_empty() {
                return Err(SimVizError::EmptyInput("values"));
            }
        }

        for s in 0..2 {
            // left side renders negative, right side positive
            let factor = if s == 1 {
                self.scaling_factor
            } else {
                -self.scaling_factor
            };
            let mut bucket = vec![0.0; self.groups.len()];
            for (value, weight) in values[s].iter().zip(weights[s]) {
                // first matching group wins; unmatched observations drop
                if let Some(g) = self.groups.iter().position(|g| g.contains(*value)) {
                    bucket[g] += weight * factor;
                }
            }
            self.series_keys.push(keys[s].to_string());
            self.data.push(bucket);
        }
        Ok(())
    }

    /// Dense `[series][group]` matrix; pairs with no recorded contribution
    /// hold 0.0.
    pub fn data_array(&self) -> &[Vec<f64>] {
        &self.data
    }

    pub fn value(&self, series: usize, group: usize) -> f64 {
        self.data[series][group]
    }

    pub fn series_keys(&self) -> &[String] {
        &self.series_keys
    }

    pub fn series_count(&self) -> usize {
        self.series_keys.len()
    }

    /// Group labels in fixed group order, each carrying its visibility flag.
    pub fn column_keys(&self) -> &[Group] {
        &self.groups
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

/// Derives one group per integer value observed across both sides, in
/// descending traversal order.
///
/// Called fresh on every aggregation pass when no explicit groups were
/// configured, so group boundaries shift with the data window from tick to
/// tick. An empty side defaults its bounds to 0/100.
pub fn derive_groups(values: [&[f64]; 2], format: LabelFormat) -> Vec<Group> {
    let side_min = |v: &[f64]| {
        if v.is_empty() {
            0.0
        } else {
            v.iter().copied().fold(f64::INFINITY, f64::min)
        }
    };
    let side_max = |v: &[f64]| {
        if v.is_empty() {
            100.0
        } else {
            v.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        }
    };
    let minimum = side_min(values[0]).min(side_min(values[1])).floor() as i64;
    let maximum = side_max(values[0]).max(side_max(values[1])).floor() as i64;
    build_groups(minimum, maximum, 1, true, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_groups() -> Vec<Group> {
        vec![
            Group::new("0-9", 0.0, 9.0).unwrap(),
            Group::new("10-19", 10.0, 19.0).unwrap(),
        ]
    }

    #[test]
    fn left_side_is_negated_right_side_positive() {
        let mut ds = WeightedPyramidDataset::new(two_groups(), 1.0);
        ds.add_series(
            ["Males", "Females"],
            [&[5.0, 15.0], &[5.0, 15.0]],
            [&[2.0, 3.0], &[4.0, 5.0]],
        )
        .unwrap();
        assert_eq!(ds.data_array(), &[vec![-2.0, -3.0], vec![4.0, 5.0]]);
        assert_eq!(ds.series_keys(), &["Males", "Females"]);
        assert_eq!(ds.value(0, 0), -2.0);
    }

    #[test]
    fn scaling_factor_multiplies_every_contribution() {
        let mut ds = WeightedPyramidDataset::new(two_groups(), 250.0);
        ds.add_series(["L", "R"], [&[5.0], &[15.0]], [&[2.0], &[3.0]])
            .unwrap();
        assert_eq!(ds.value(0, 0), -500.0);
        assert_eq!(ds.value(1, 1), 750.0);
    }

    #[test]
    fn first_matching_group_wins_on_overlap() {
        let groups = vec![
            Group::new("a", 0.0, 10.0).unwrap(),
            Group::new("b", 5.0, 15.0).unwrap(),
        ];
        let mut ds = WeightedPyramidDataset::new(groups, 1.0);
        ds.add_series(["L", "R"], [&[7.0], &[7.0]], [&[1.0], &[1.0]])
            .unwrap();
        // 7.0 matches both ranges; only the earlier group accumulates
        assert_eq!(ds.value(1, 0), 1.0);
        assert_eq!(ds.value(1, 1), 0.0);
    }

    #[test]
    fn unmatched_observations_are_dropped() {
        let mut ds = WeightedPyramidDataset::new(two_groups(), 1.0);
        ds.add_series(["L", "R"], [&[50.0, 5.0], &[-3.0]], [&[9.0, 1.0], &[9.0]])
            .unwrap();
        assert_eq!(ds.data_array(), &[vec![-1.0, 0.0], vec![0.0, 0.0]]);
    }

    #[test]
    fn mismatched_side_lengths_rejected() {
        let mut ds = WeightedPyramidDataset::new(two_groups(), 1.0);
        let err = ds
            .add_series(["L", "R"], [&[1.0, 2.0], &[1.0]], [&[1.0], &[1.0]])
            .unwrap_err();
        assert!(matches!(err, SimVizError::MismatchedLength { .. }));
        assert_eq!(ds.series_count(), 0);
    }

    #[test]
    fn empty_side_rejected() {
        let mut ds = WeightedPyramidDataset::new(two_groups(), 1.0);
        let err = ds
            .add_series(["L", "R"], [&[1.0], &[]], [&[1.0], &[]])
            .unwrap_err();
        assert!(matches!(err, SimVizError::EmptyInput(_)));
    }

    #[test]
    #[should_panic(expected = "single-pass")]
    fn second_pass_on_one_dataset_is_rejected() {
        let mut ds = WeightedPyramidDataset::new(two_groups(), 1.0);
        ds.add_series(["L", "R"], [&[5.0], &[5.0]], [&[1.0], &[1.0]])
            .unwrap();
        let _ = ds.add_series(["L", "R"], [&[5.0], &[5.0]], [&[1.0], &[1.0]]);
    }

    #[test]
    fn derived_groups_cover_both_sides() {
        let groups = derive_groups([&[3.7, 6.0], &[1.2, 8.9]], LabelFormat::default());
        // floor(1.2)=1 .. floor(8.9)=8, one group per integer, descending
        assert_eq!(groups.len(), 8);
        assert_eq!(groups[0].range, (8.0, 8.0));
        assert_eq!(groups[0].name, "8");
        assert_eq!(groups[7].range, (1.0, 1.0));
    }

    #[test]
    fn derived_groups_default_empty_sides() {
        let groups = derive_groups([&[], &[]], LabelFormat::default());
        assert_eq!(groups.len(), 101);
        assert_eq!(groups[0].range, (100.0, 100.0));
        assert_eq!(groups[100].range, (0.0, 0.0));
    }
}
