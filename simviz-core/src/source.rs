use simviz_common::{Result, SimVizError};

/// Pull-based collaborator handing the engine one tick's worth of
/// observations and their weights.
///
/// The two slices must stay equal in length; feeds call
/// [`update`](Self::update) once per tick before reading either slice.
pub trait WeightedArraySource {
    /// Refresh from the underlying model. Default is a no-op for sources
    /// whose buffers are replaced externally.
    fn update(&mut self) {}

    fn values(&self) -> &[f64];

    fn weights(&self) -> &[f64];
}

/// An owned-buffer source, handy for adapting plain arrays and for tests.
///
/// Integer observation arrays are widened to `f64` here, once, at the
/// collaborator boundary; the engine itself only ever sees `f64`.
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    values: Vec<f64>,
    weights: Vec<f64>,
}

impl VecSource {
    pub fn new(values: Vec<f64>, weights: Vec<f64>) -> Result<Self> {
        if values.len() != weights.len() {
            return Err(SimVizError::MismatchedLength {
                values: values.len(),
                weights: weights.len(),
            });
        }
        Ok(Self { values, weights })
    }

    pub fn from_integers(values: &[i64], weights: Vec<f64>) -> Result<Self> {
        Self::new(values.iter().map(|&v| v as f64).collect(), weights)
    }

    /// Replaces both buffers for the next tick.
    pub fn set(&mut self, values: Vec<f64>, weights: Vec<f64>) -> Result<()> {
        if values.len() != weights.len() {
            return Err(SimVizError::MismatchedLength {
                values: values.len(),
                weights: weights.len(),
            });
        }
        self.values = values;
        self.weights = weights;
        Ok(())
    }
}

impl WeightedArraySource for VecSource {
    fn values(&self) -> &[f64] {
        &self.values
    }

    fn weights(&self) -> &[f64] {
        &self.weights
    }
}
