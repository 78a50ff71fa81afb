//! Pre-fitted classifiers, generic over the class label type.
//!
//! Covers:
//! 1. **Linear** -- one decision row per class, or a single row for a binary model.
//! 2. **Decision tree** -- array-encoded tree, leaves carry class weights.
//! 3. **Random forest** -- mean of per-tree normalized leaf distributions.
//!
//! Every variant returns the single best class. Ties go to the lowest class index.

use serde::{Deserialize, Serialize};

use crate::{LoanRiskError, LoanRiskResult};

/// One node of an array-encoded tree. Leaves have `left == right == -1`.
#[cfg(feature = "tree")]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub feature: i64,
    pub threshold: f64,
    pub left: i64,
    pub right: i64,
    /// Per-class weight; only read at leaves.
    pub value: Vec<f64>,
}

#[cfg(feature = "tree")]
impl TreeNode {
    fn is_leaf(&self) -> bool {
        self.left < 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier<C> {
    Linear {
        classes: Vec<C>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
    #[cfg(feature = "tree")]
    DecisionTree { classes: Vec<C>, nodes: Vec<TreeNode> },
    #[cfg(feature = "tree")]
    RandomForest {
        classes: Vec<C>,
        trees: Vec<Vec<TreeNode>>,
    },
}

impl<C: Clone> Classifier<C> {
    pub fn classes(&self) -> &[C] {
        match self {
            Classifier::Linear { classes, .. } => classes,
            #[cfg(feature = "tree")]
            Classifier::DecisionTree { classes, .. } => classes,
            #[cfg(feature = "tree")]
            Classifier::RandomForest { classes, .. } => classes,
        }
    }

    /// Row width a linear model requires. Trees only read the features they
    /// split on, so they accept any row wide enough to reach them.
    pub fn n_features(&self) -> Option<usize> {
        match self {
            Classifier::Linear { coef, .. } => Some(coef.first().map(Vec::len).unwrap_or(0)),
            #[cfg(feature = "tree")]
            Classifier::DecisionTree { .. } | Classifier::RandomForest { .. } => None,
        }
    }

    /// Internal consistency of a freshly deserialized artifact.
    pub fn validate(&self) -> Result<(), String> {
        let n_classes = self.classes().len();
        if n_classes == 0 {
            return Err("classifier has no classes".to_string());
        }
        match self {
            Classifier::Linear {
                coef, intercept, ..
            } => {
                let width = coef.first().map(Vec::len).unwrap_or(0);
                if width == 0 {
                    return Err("coef is empty".to_string());
                }
                if coef.iter().any(|row| row.len() != width) {
                    return Err("coef rows have differing widths".to_string());
                }
                if intercept.len() != coef.len() {
                    return Err(format!(
                        "{} intercepts for {} coef rows",
                        intercept.len(),
                        coef.len()
                    ));
                }
                let binary = coef.len() == 1 && n_classes == 2;
                if !binary && coef.len() != n_classes {
                    return Err(format!(
                        "{} coef rows for {} classes",
                        coef.len(),
                        n_classes
                    ));
                }
                Ok(())
            }
            #[cfg(feature = "tree")]
            Classifier::DecisionTree { nodes, .. } => validate_tree(nodes, n_classes),
            #[cfg(feature = "tree")]
            Classifier::RandomForest { trees, .. } => {
                if trees.is_empty() {
                    return Err("forest has no trees".to_string());
                }
                for (i, tree) in trees.iter().enumerate() {
                    validate_tree(tree, n_classes)
                        .map_err(|e| format!("tree {i}: {e}"))?;
                }
                Ok(())
            }
        }
    }

    /// Best class for one already-scaled row.
    pub fn predict(&self, x: &[f64]) -> LoanRiskResult<C> {
        if let Some(expected) = self.n_features().filter(|w| *w != x.len()) {
            return Err(LoanRiskError::ShapeMismatch {
                stage: "classifier".to_string(),
                expected,
                actual: x.len(),
            });
        }
        let index = match self {
            Classifier::Linear {
                classes,
                coef,
                intercept,
            } => {
                let scores: Vec<f64> = coef
                    .iter()
                    .zip(intercept.iter())
                    .map(|(row, b)| dot(row, x) + b)
                    .collect();
                if scores.len() == 1 && classes.len() == 2 {
                    usize::from(scores[0] > 0.0)
                } else {
                    argmax(&scores)
                }
            }
            #[cfg(feature = "tree")]
            Classifier::DecisionTree { nodes, .. } => argmax(&leaf_value(nodes, x)?.value),
            #[cfg(feature = "tree")]
            Classifier::RandomForest { classes, trees, .. } => {
                let mut votes = vec![0.0; classes.len()];
                for tree in trees {
                    let leaf = leaf_value(tree, x)?;
                    let total: f64 = leaf.value.iter().sum();
                    if total > 0.0 {
                        for (v, w) in votes.iter_mut().zip(leaf.value.iter()) {
                            *v += w / total;
                        }
                    }
                }
                argmax(&votes)
            }
        };
        self.classes().get(index).cloned().ok_or_else(|| {
            LoanRiskError::Inference(format!("class index {index} out of range"))
        })
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// First index of the maximum; 0 for an empty slice.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(feature = "tree")]
fn validate_tree(nodes: &[TreeNode], n_classes: usize) -> Result<(), String> {
    if nodes.is_empty() {
        return Err("tree has no nodes".to_string());
    }
    let n = nodes.len() as i64;
    for (i, node) in nodes.iter().enumerate() {
        if node.is_leaf() {
            if node.value.len() != n_classes {
                return Err(format!(
                    "leaf {i} has {} weights for {n_classes} classes",
                    node.value.len()
                ));
            }
            continue;
        }
        if node.left >= n || node.right < 0 || node.right >= n {
            return Err(format!("node {i} has out-of-range children"));
        }
        if node.feature < 0 {
            return Err(format!("node {i} splits on feature {}", node.feature));
        }
    }
    Ok(())
}

#[cfg(feature = "tree")]
fn leaf_value<'a>(nodes: &'a [TreeNode], x: &[f64]) -> LoanRiskResult<&'a TreeNode> {
    let mut index = 0usize;
    // A well-formed tree reaches a leaf in fewer steps than it has nodes.
    for _ in 0..=nodes.len() {
        let node = nodes
            .get(index)
            .ok_or_else(|| LoanRiskError::Inference(format!("tree node {index} missing")))?;
        if node.is_leaf() {
            return Ok(node);
        }
        let value = x.get(node.feature as usize).copied().ok_or_else(|| {
            LoanRiskError::Inference(format!("tree splits on absent feature {}", node.feature))
        })?;
        index = if value <= node.threshold {
            node.left as usize
        } else {
            node.right as usize
        };
    }
    Err(LoanRiskError::Inference("tree traversal did not terminate".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_class_linear() -> Classifier<i64> {
        Classifier::Linear {
            classes: vec![0, 1, 2],
            coef: vec![vec![-1.0, 0.0], vec![0.0, 0.0], vec![1.0, 0.0]],
            intercept: vec![0.0, 0.5, 0.0],
        }
    }

    #[test]
    fn test_linear_multiclass_argmax() {
        let model = three_class_linear();
        assert!(model.validate().is_ok());
        assert_eq!(model.predict(&[-2.0, 0.0]).unwrap(), 0);
        assert_eq!(model.predict(&[0.0, 0.0]).unwrap(), 1);
        assert_eq!(model.predict(&[2.0, 0.0]).unwrap(), 2);
    }

    #[test]
    fn test_linear_binary_uses_sign() {
        let model: Classifier<String> = Classifier::Linear {
            classes: vec!["A".into(), "B".into()],
            coef: vec![vec![1.0]],
            intercept: vec![-1.0],
        };
        assert!(model.validate().is_ok());
        assert_eq!(model.predict(&[0.5]).unwrap(), "A");
        assert_eq!(model.predict(&[1.0]).unwrap(), "A");
        assert_eq!(model.predict(&[1.5]).unwrap(), "B");
    }

    #[test]
    fn test_linear_tie_goes_to_first_class() {
        let model: Classifier<i64> = Classifier::Linear {
            classes: vec![7, 8],
            coef: vec![vec![0.0], vec![0.0]],
            intercept: vec![1.0, 1.0],
        };
        assert_eq!(model.predict(&[3.0]).unwrap(), 7);
    }

    #[test]
    fn test_linear_shape_mismatch() {
        let err = three_class_linear().predict(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            LoanRiskError::ShapeMismatch {
                expected: 2,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_linear_validate_row_count() {
        let model: Classifier<i64> = Classifier::Linear {
            classes: vec![0, 1, 2],
            coef: vec![vec![1.0], vec![1.0]],
            intercept: vec![0.0, 0.0],
        };
        assert!(model.validate().is_err());
    }

    #[cfg(feature = "tree")]
    fn stump() -> Vec<TreeNode> {
        vec![
            TreeNode {
                feature: 1,
                threshold: 0.5,
                left: 1,
                right: 2,
                value: vec![],
            },
            TreeNode {
                feature: -2,
                threshold: -2.0,
                left: -1,
                right: -1,
                value: vec![8.0, 2.0, 0.0],
            },
            TreeNode {
                feature: -2,
                threshold: -2.0,
                left: -1,
                right: -1,
                value: vec![0.0, 1.0, 9.0],
            },
        ]
    }

    #[cfg(feature = "tree")]
    #[test]
    fn test_decision_tree_traversal() {
        let model: Classifier<String> = Classifier::DecisionTree {
            classes: vec!["A".into(), "B".into(), "C".into()],
            nodes: stump(),
        };
        assert!(model.validate().is_ok());
        // Threshold is inclusive on the left branch
        assert_eq!(model.predict(&[0.0, 0.5]).unwrap(), "A");
        assert_eq!(model.predict(&[0.0, 0.6]).unwrap(), "C");
    }

    #[cfg(feature = "tree")]
    #[test]
    fn test_random_forest_averages_normalized_leaves() {
        let leaf = |value: Vec<f64>| TreeNode {
            feature: -2,
            threshold: -2.0,
            left: -1,
            right: -1,
            value,
        };
        // Tree 1 is confident in class 0 on few samples, trees 2 and 3 lean to class 1
        let model: Classifier<i64> = Classifier::RandomForest {
            classes: vec![0, 1],
            trees: vec![
                vec![leaf(vec![2.0, 0.0])],
                vec![leaf(vec![40.0, 60.0])],
                vec![leaf(vec![30.0, 70.0])],
            ],
        };
        assert!(model.validate().is_ok());
        // votes: class0 = 1.0 + 0.4 + 0.3 = 1.7, class1 = 0.0 + 0.6 + 0.7 = 1.3
        assert_eq!(model.predict(&[0.0, 0.0]).unwrap(), 0);
    }

    #[cfg(feature = "tree")]
    #[test]
    fn test_tree_validate_rejects_bad_children() {
        let mut nodes = stump();
        nodes[0].right = 9;
        let model: Classifier<i64> = Classifier::DecisionTree {
            classes: vec![0, 1, 2],
            nodes,
        };
        assert!(model.validate().is_err());
    }

    #[cfg(feature = "tree")]
    #[test]
    fn test_tree_traversal_cycle_is_inference_error() {
        let mut nodes = stump();
        nodes[0].left = 0;
        let model: Classifier<i64> = Classifier::DecisionTree {
            classes: vec![0, 1, 2],
            nodes,
        };
        let err = model.predict(&[0.0, 0.0]).unwrap_err();
        assert!(matches!(err, LoanRiskError::Inference(_)));
    }

    #[test]
    fn test_deserialize_string_classes() {
        let json = r#"{"kind":"linear","classes":["A","B","C"],
            "coef":[[1.0],[0.0],[-1.0]],"intercept":[0.0,0.0,0.0]}"#;
        let model: Classifier<String> = serde_json::from_str(json).unwrap();
        assert_eq!(model.classes(), ["A", "B", "C"]);
        assert_eq!(model.predict(&[2.0]).unwrap(), "A");
    }

    #[cfg(feature = "tree")]
    #[test]
    fn test_deserialize_tree_without_width() {
        let json = r#"{"kind":"decision_tree","classes":[0,1],"nodes":[
            {"feature":-2,"threshold":-2.0,"left":-1,"right":-1,"value":[3.0,1.0]}]}"#;
        let model: Classifier<i64> = serde_json::from_str(json).unwrap();
        assert!(model.validate().is_ok());
        assert_eq!(model.n_features(), None);
        assert_eq!(model.predict(&[0.0; 9]).unwrap(), 0);
    }

    #[cfg(feature = "tree")]
    #[test]
    fn test_deserialize_forest_without_width() {
        let json = r#"{"kind":"random_forest","classes":["A","B"],"trees":[
            [{"feature":0,"threshold":0.0,"left":1,"right":2,"value":[]},
             {"feature":-2,"threshold":-2.0,"left":-1,"right":-1,"value":[5.0,0.0]},
             {"feature":-2,"threshold":-2.0,"left":-1,"right":-1,"value":[0.0,5.0]}]]}"#;
        let model: Classifier<String> = serde_json::from_str(json).unwrap();
        assert!(model.validate().is_ok());
        assert_eq!(model.predict(&[-1.0]).unwrap(), "A");
        assert_eq!(model.predict(&[1.0]).unwrap(), "B");
    }

    #[cfg(feature = "tree")]
    #[test]
    fn test_tree_row_too_short_is_inference_error() {
        let model: Classifier<String> = Classifier::DecisionTree {
            classes: vec!["A".into(), "B".into(), "C".into()],
            nodes: stump(),
        };
        let err = model.predict(&[0.0]).unwrap_err();
        assert!(matches!(err, LoanRiskError::Inference(_)));
    }
}
