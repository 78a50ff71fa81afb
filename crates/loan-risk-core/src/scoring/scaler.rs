//! Pre-fitted feature normalization.

use serde::{Deserialize, Serialize};

use crate::{LoanRiskError, LoanRiskResult};

/// A fitted per-column affine transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// `z = (x - mean) / scale`. A zero scale is treated as 1.
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `z = x * scale + min`.
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

impl Scaler {
    /// Number of columns the scaler was fitted on.
    pub fn n_features(&self) -> usize {
        match self {
            Scaler::Standard { scale, .. } | Scaler::MinMax { scale, .. } => scale.len(),
        }
    }

    /// Internal consistency of a freshly deserialized artifact.
    pub fn validate(&self) -> Result<(), String> {
        let (offsets, scale, offset_name) = match self {
            Scaler::Standard { mean, scale } => (mean, scale, "mean"),
            Scaler::MinMax { min, scale } => (min, scale, "min"),
        };
        if scale.is_empty() {
            return Err("scaler has no columns".to_string());
        }
        if offsets.len() != scale.len() {
            return Err(format!(
                "{offset_name} has {} columns but scale has {}",
                offsets.len(),
                scale.len()
            ));
        }
        if offsets.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err("scaler parameters must be finite".to_string());
        }
        Ok(())
    }

    pub fn transform(&self, x: &[f64]) -> LoanRiskResult<Vec<f64>> {
        if x.len() != self.n_features() {
            return Err(LoanRiskError::ShapeMismatch {
                stage: "scaler".to_string(),
                expected: self.n_features(),
                actual: x.len(),
            });
        }
        let out = match self {
            Scaler::Standard { mean, scale } => x
                .iter()
                .zip(mean.iter().zip(scale.iter()))
                .map(|(v, (m, s))| {
                    let s = if *s == 0.0 { 1.0 } else { *s };
                    (v - m) / s
                })
                .collect(),
            Scaler::MinMax { min, scale } => x
                .iter()
                .zip(min.iter().zip(scale.iter()))
                .map(|(v, (m, s))| v * s + m)
                .collect(),
        };
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scaler() {
        let scaler = Scaler::Standard {
            mean: vec![10.0, 0.0],
            scale: vec![2.0, 4.0],
        };
        assert_eq!(scaler.transform(&[14.0, -2.0]).unwrap(), vec![2.0, -0.5]);
    }

    #[test]
    fn test_standard_scaler_zero_scale_is_identity_shift() {
        let scaler = Scaler::Standard {
            mean: vec![3.0],
            scale: vec![0.0],
        };
        assert_eq!(scaler.transform(&[5.0]).unwrap(), vec![2.0]);
    }

    #[test]
    fn test_min_max_scaler() {
        let scaler = Scaler::MinMax {
            min: vec![-1.0],
            scale: vec![0.5],
        };
        assert_eq!(scaler.transform(&[4.0]).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_width_mismatch_is_shape_error() {
        let scaler = Scaler::Standard {
            mean: vec![0.0; 3],
            scale: vec![1.0; 3],
        };
        let err = scaler.transform(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            LoanRiskError::ShapeMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_validate_rejects_ragged_parameters() {
        let scaler = Scaler::MinMax {
            min: vec![0.0, 0.0],
            scale: vec![1.0],
        };
        assert!(scaler.validate().is_err());
    }

    #[test]
    fn test_deserialize_tagged() {
        let json = r#"{"kind":"standard","mean":[1.0],"scale":[2.0]}"#;
        let scaler: Scaler = serde_json::from_str(json).unwrap();
        assert_eq!(scaler.n_features(), 1);
        assert!(scaler.validate().is_ok());
    }
}
