pub mod classifier;
pub mod scaler;

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::info;

use crate::features::{GradeFeatureVector, RiskFeatureVector};
use crate::{LoanRiskError, LoanRiskResult};

pub use classifier::Classifier;
pub use scaler::Scaler;

/// Class code produced by the risk model.
pub type RiskCode = i64;

/// Class code produced by the grade model.
pub type GradeCode = String;

/// The two scoring operations the prediction flow depends on.
///
/// `ModelSet` is the production implementation; the seam exists so callers
/// can hold the artifacts behind `Arc<dyn LoanScorer>`.
pub trait LoanScorer: Send + Sync {
    fn score_risk(&self, features: &RiskFeatureVector) -> LoanRiskResult<RiskCode>;
    fn score_grade(&self, features: &GradeFeatureVector) -> LoanRiskResult<GradeCode>;
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// A fitted scaler followed by a fitted classifier.
#[derive(Debug, Clone)]
pub struct ScoringPipeline<C> {
    name: String,
    scaler: Scaler,
    classifier: Classifier<C>,
}

impl<C: Clone> ScoringPipeline<C> {
    pub fn new(name: &str, scaler: Scaler, classifier: Classifier<C>) -> LoanRiskResult<Self> {
        let scaler_label = format!("{name} scaler");
        let classifier_label = format!("{name} classifier");
        Self::labelled(name, (scaler, &scaler_label), (classifier, &classifier_label))
    }

    /// Validate both parts, naming each by `label` in any `Artifact` error.
    fn labelled(
        name: &str,
        (scaler, scaler_label): (Scaler, &str),
        (classifier, classifier_label): (Classifier<C>, &str),
    ) -> LoanRiskResult<Self> {
        scaler.validate().map_err(|reason| LoanRiskError::Artifact {
            path: scaler_label.to_string(),
            reason,
        })?;
        classifier.validate().map_err(|reason| LoanRiskError::Artifact {
            path: classifier_label.to_string(),
            reason,
        })?;
        Ok(Self {
            name: name.to_string(),
            scaler,
            classifier,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn classifier(&self) -> &Classifier<C> {
        &self.classifier
    }

    /// Scale then classify one row.
    pub fn score(&self, features: &[f64]) -> LoanRiskResult<C> {
        let scaled = self.scaler.transform(features)?;
        self.classifier.predict(&scaled)
    }
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// Locations of the four serialized artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub risk_model: PathBuf,
    pub risk_scaler: PathBuf,
    pub grade_model: PathBuf,
    pub grade_scaler: PathBuf,
}

/// Read and deserialize one JSON artifact.
pub fn load_artifact<T: DeserializeOwned>(path: &Path) -> LoanRiskResult<T> {
    let contents = fs::read_to_string(path).map_err(|e| LoanRiskError::Artifact {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&contents).map_err(|e| LoanRiskError::Artifact {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn load_pipeline<C: Clone + DeserializeOwned>(
    name: &str,
    model: &Path,
    scaler: &Path,
) -> LoanRiskResult<ScoringPipeline<C>> {
    let classifier: Classifier<C> = load_artifact(model)?;
    let fitted: Scaler = load_artifact(scaler)?;
    ScoringPipeline::labelled(
        name,
        (fitted, &scaler.display().to_string()),
        (classifier, &model.display().to_string()),
    )
}

/// Both fitted pipelines. Read-only once constructed.
#[derive(Debug, Clone)]
pub struct ModelSet {
    risk: ScoringPipeline<RiskCode>,
    grade: ScoringPipeline<GradeCode>,
}

impl ModelSet {
    pub fn new(risk: ScoringPipeline<RiskCode>, grade: ScoringPipeline<GradeCode>) -> Self {
        Self { risk, grade }
    }

    /// Load all four artifacts. Any missing or corrupt file is an error.
    pub fn load(paths: &ArtifactPaths) -> LoanRiskResult<Self> {
        let risk = load_pipeline("risk", &paths.risk_model, &paths.risk_scaler)?;
        let grade = load_pipeline("grade", &paths.grade_model, &paths.grade_scaler)?;
        info!(
            risk_classes = risk.classifier().classes().len(),
            grade_classes = grade.classifier().classes().len(),
            "loaded scoring artifacts"
        );
        Ok(Self::new(risk, grade))
    }
}

impl LoanScorer for ModelSet {
    fn score_risk(&self, features: &RiskFeatureVector) -> LoanRiskResult<RiskCode> {
        self.risk.score(features.as_slice())
    }

    fn score_grade(&self, features: &GradeFeatureVector) -> LoanRiskResult<GradeCode> {
        self.grade.score(features.as_slice())
    }
}
