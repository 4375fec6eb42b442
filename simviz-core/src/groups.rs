use serde::{Deserialize, Serialize};
use simviz_common::{Result, SimVizError};

/// Labels beyond this count get thinned so a category axis stays readable.
pub const MAX_VISIBLE_CATEGORIES: usize = 20;

/// A named inclusive numeric range used by the pyramid aggregator.
///
/// The range is always stored ascending, even when the group list was
/// declared in descending traversal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub visible: bool,
    pub range: (f64, f64),
}

impl Group {
    pub fn new(name: impl Into<String>, low: f64, high: f64) -> Result<Self> {
        if low > high {
            return Err(SimVizError::InvalidRange {
                start: low,
                end: high,
            });
        }
        Ok(Self {
            name: name.into(),
            visible: true,
            range: (low, high),
        })
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.range.0 && value <= self.range.1
    }

    /// Display label: hidden groups render as an empty string.
    pub fn label(&self) -> &str {
        if self.visible {
            &self.name
        } else {
            ""
        }
    }
}

/// Fixed-precision numeric formatter for group names, with trailing zeros
/// (and a dangling point) trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelFormat {
    pub decimals: usize,
}

impl Default for LabelFormat {
    fn default() -> Self {
        Self { decimals: 2 }
    }
}

impl LabelFormat {
    pub fn new(decimals: usize) -> Self {
        Self { decimals }
    }

    pub fn format(&self, value: f64) -> String {
        let s = format!("{value:.prec$}", prec = self.decimals);
        if self.decimals == 0 {
            return s;
        }
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Builds an ordered list of named integer ranges from a start/end/step
/// specification.
///
/// Interior groups end one unit short of the next group's start (exclusive
/// boundary); the final group always ends exactly at `end`. `reverse_order`
/// swaps the endpoints and negates the step, producing the same ranges in
/// the opposite traversal order. A zero step yields no groups.
pub fn build_groups(
    start: i64,
    end: i64,
    step: i64,
    reverse_order: bool,
    format: LabelFormat,
) -> Vec<Group> {
    if step == 0 {
        return Vec::new();
    }
    // With unit steps the endpoints both get their own group, so one extra.
    let bonus = if step.abs() == 1 { 1 } else { 0 };
    let count = ((((end - start) as f64 / step as f64).round() as i64 + bonus).max(1)) as usize;

    let (mut start, mut end, mut step) = (start, end, step);
    if reverse_order {
        std::mem::swap(&mut start, &mut end);
        step = -step;
    }
    let ascending = start <= end;

    let mut groups = Vec::with_capacity(count);
    for i in 0..count {
        let from = start + i as i64 * step;
        let to = if i == count - 1 {
            end
        } else {
            start + (i + 1) as i64 * step - if ascending { 1 } else { -1 }
        };
        let (low, high) = if ascending { (from, to) } else { (to, from) };
        let name = if low == high {
            format.format(low as f64)
        } else {
            format!("{} - {}", format.format(low as f64), format.format(high as f64))
        };
        groups.push(Group {
            name,
            visible: true,
            range: (low as f64, high as f64),
        });
    }
    apply_visibility(&mut groups);
    groups
}

/// Marks every Nth group visible (plus the last) once the list exceeds
/// [`MAX_VISIBLE_CATEGORIES`]. Names stay stored either way; a renderer is
/// expected to suppress hidden labels.
pub fn apply_visibility(groups: &mut [Group]) {
    if groups.is_empty() {
        return;
    }
    let step_show = (groups.len() + MAX_VISIBLE_CATEGORIES - 1) / MAX_VISIBLE_CATEGORIES;
    let last = groups.len() - 1;
    for (i, group) in groups.iter_mut().enumerate() {
        group.visible = i % step_show == 0 || i == last;
    }
}
