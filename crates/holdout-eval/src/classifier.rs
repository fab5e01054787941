use holdout_io::BinaryLabel;

/// A learner that can be fitted on a training part and scored on a test part.
///
/// `fit` receives a seed drawn from the trial's RNG so stochastic learners
/// are reproducible; deterministic learners ignore it.
pub trait Classifier: Sync {
    /// The fitted model.
    type Model;
    /// Error raised by `fit` or `predict`.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Short name used in logs and artifacts.
    fn name(&self) -> &str;

    /// Fit on row-major `features` with one label per row.
    ///
    /// # Errors
    ///
    /// Implementation-defined; reported per trial by the evaluator.
    fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[BinaryLabel],
        seed: u64,
    ) -> Result<Self::Model, Self::Error>;

    /// Predict one label per row of `features`.
    ///
    /// # Errors
    ///
    /// Implementation-defined; reported per trial by the evaluator.
    fn predict(
        &self,
        model: &Self::Model,
        features: &[Vec<f64>],
    ) -> Result<Vec<BinaryLabel>, Self::Error>;
}
