//! Random forest over named raw features

use super::{Classifier, ModelFamily};
use crate::data::FeatureSchema;
use crate::error::{Result, TurnoverError};
use crate::training::RandomForest;
use ndarray::{Array1, Array2};

/// Random forest paired with the ordered feature names it was trained on.
///
/// The forest is name-sensitive: the supplied list has to match the
/// schema and, when the forest recorded names at fit time, those too.
#[derive(Debug, Clone)]
pub struct TreeEnsembleModel {
    forest: RandomForest,
    feature_names: Vec<String>,
}

impl TreeEnsembleModel {
    pub fn new(forest: RandomForest, feature_names: Vec<String>) -> Result<Self> {
        if feature_names.is_empty() {
            return Err(TurnoverError::Data("feature list is empty".to_string()));
        }
        FeatureSchema::validate_names(&feature_names)?;

        let recorded = forest.feature_names();
        if !recorded.is_empty() && recorded != feature_names.as_slice() {
            return Err(TurnoverError::Shape {
                expected: format!("features {:?}", recorded),
                actual: format!("features {:?}", feature_names),
            });
        }
        if forest.n_trees() == 0 {
            return Err(TurnoverError::ModelNotFitted);
        }

        Ok(Self {
            forest,
            feature_names,
        })
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }
}

impl Classifier for TreeEnsembleModel {
    fn family(&self) -> ModelFamily {
        ModelFamily::Rf
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Positive only when the averaged tree vote for class 1 is a strict majority
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let p1 = self.positive_proba(x)?;
        Ok(p1.mapv(|p| if p > 0.5 { 1.0 } else { 0.0 }))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let raw = self.forest.predict_proba(x)?;

        // forest columns follow its own class list, which may hold one class
        let mut out = Array2::<f64>::zeros((x.nrows(), 2));
        for (col, &class) in self.forest.classes().iter().enumerate() {
            let target = if class > 0.5 { 1 } else { 0 };
            let mut dst = out.column_mut(target);
            dst += &raw.column(col);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn fitted(y: Array1<f64>) -> RandomForest {
        let x = array![[1.0, 1.0], [1.5, 1.2], [2.0, 1.1], [4.0, 4.2], [4.5, 3.9], [5.0, 4.4]];
        let mut rf = RandomForest::new(9).with_random_state(42);
        rf.fit_named(&x, &y, &FeatureSchema::names()).unwrap();
        rf
    }

    #[test]
    fn test_predicts_with_schema_names() {
        let model = TreeEnsembleModel::new(fitted(array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]), FeatureSchema::names()).unwrap();

        let proba = model.predict_proba(&array![[1.2, 1.0], [4.8, 4.1]]).unwrap();
        assert!(proba[[0, 1]] < 0.5);
        assert!(proba[[1, 1]] > 0.5);
        assert_eq!(model.predict(&array![[1.2, 1.0], [4.8, 4.1]]).unwrap(), array![0.0, 1.0]);
    }

    #[test]
    fn test_rejects_reordered_or_empty_names() {
        let rf = fitted(array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let mut swapped = FeatureSchema::names();
        swapped.reverse();

        assert!(TreeEnsembleModel::new(rf.clone(), swapped).is_err());
        assert!(TreeEnsembleModel::new(rf, Vec::new()).is_err());
    }

    #[test]
    fn test_single_class_forest_maps_to_two_columns() {
        let model = TreeEnsembleModel::new(fitted(array![1.0, 1.0, 1.0, 1.0, 1.0, 1.0]), FeatureSchema::names()).unwrap();
        let proba = model.predict_proba(&array![[3.0, 3.0]]).unwrap();
        assert_eq!(proba, array![[0.0, 1.0]]);
    }
}
