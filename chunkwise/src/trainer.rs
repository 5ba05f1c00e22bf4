use std::str::FromStr;

#[cfg(feature = "train")]
use std::collections::BTreeMap;

#[cfg(feature = "train")]
use liblinear::LibLinearModel;

#[cfg(feature = "train")]
use crate::errors::{ChunkerError, Result};
#[cfg(feature = "train")]
use crate::linear::LinearModel;
#[cfg(feature = "train")]
use crate::utils::SerializableHashMap;

/// LIBLINEAR solver, numbered like its `-s` option.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverType {
    /// `-s 0`: logistic regression with L2 penalty, solved in the primal.
    L2RegularizedLogistic = 0,

    /// `-s 1`: L2-loss SVC with L2 penalty, solved in the dual.
    L2RegularizedL2LossSVCDual = 1,

    /// `-s 2`: L2-loss SVC with L2 penalty, solved in the primal.
    L2RegularizedL2LossSVC = 2,

    /// `-s 3`: L1-loss SVC with L2 penalty, solved in the dual.
    L2RegularizedL1LossSVCDual = 3,

    /// `-s 4`: multi-class SVC of Crammer and Singer.
    CrammerSingerSVC = 4,

    /// `-s 5`: L2-loss SVC with L1 penalty.
    L1RegularizedL2LossSVC = 5,

    /// `-s 6`: logistic regression with L1 penalty.
    L1RegularizedLogistic = 6,

    /// `-s 7`: logistic regression with L2 penalty, solved in the dual.
    L2RegularizedLogisticDual = 7,
}

impl FromStr for SolverType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "0" => Self::L2RegularizedLogistic,
            "1" => Self::L2RegularizedL2LossSVCDual,
            "2" => Self::L2RegularizedL2LossSVC,
            "3" => Self::L2RegularizedL1LossSVCDual,
            "4" => Self::CrammerSingerSVC,
            "5" => Self::L1RegularizedL2LossSVC,
            "6" => Self::L1RegularizedLogistic,
            "7" => Self::L2RegularizedLogisticDual,
            _ => return Err("solver must be a number from 0 to 7"),
        })
    }
}

#[cfg(feature = "train")]
impl From<SolverType> for liblinear::SolverType {
    fn from(solver: SolverType) -> Self {
        match solver {
            SolverType::L2RegularizedLogistic => Self::L2R_LR,
            SolverType::L2RegularizedL2LossSVCDual => Self::L2R_L2LOSS_SVC_DUAL,
            SolverType::L2RegularizedL2LossSVC => Self::L2R_L2LOSS_SVC,
            SolverType::L2RegularizedL1LossSVCDual => Self::L2R_L1LOSS_SVC_DUAL,
            SolverType::CrammerSingerSVC => Self::MCSVM_CS,
            SolverType::L1RegularizedL2LossSVC => Self::L1R_L2LOSS_SVC,
            SolverType::L1RegularizedLogistic => Self::L1R_LR,
            SolverType::L2RegularizedLogisticDual => Self::L2R_LR_DUAL,
        }
    }
}

/// Hyperparameters of the linear classifier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainParams {
    pub solver: SolverType,

    /// The tolerance of the termination criterion.
    pub epsilon: f64,

    /// The parameter C.
    pub cost: f64,

    /// Value of the bias feature appended to every vector. Non-positive
    /// values disable the bias term.
    pub bias: f64,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            solver: SolverType::L2RegularizedL2LossSVCDual,
            epsilon: 0.01,
            cost: 1.0,
            bias: 1.0,
        }
    }
}

/// Trains a linear model with LIBLINEAR.
///
/// # Arguments
///
/// * `xs` - Sparse vectors of zero-based feature indices. Repeated indices
///   are summed.
/// * `ys` - Label codes, one per vector.
/// * `params` - Hyperparameters.
///
/// # Returns
///
/// The per-class weights copied out of the LIBLINEAR model. Feature ids in
/// the result are one-based.
#[cfg(feature = "train")]
pub(crate) fn train_linear_model(
    xs: Vec<Vec<(u32, f64)>>,
    ys: Vec<u32>,
    params: TrainParams,
) -> Result<LinearModel> {
    let mut n_features: u32 = 0;
    let xs: Vec<Vec<(u32, f64)>> = xs
        .into_iter()
        .map(|x| {
            let mut feature_ids = BTreeMap::new();
            for (index, value) in x {
                let fid = index + 1;
                n_features = n_features.max(fid);
                *feature_ids.entry(fid).or_insert(0.0) += value;
            }
            feature_ids.into_iter().collect()
        })
        .collect();
    let ys = ys.into_iter().map(f64::from).collect();

    let mut builder = liblinear::Builder::new();
    let training_input = liblinear::util::TrainingInput::from_sparse_features(ys, xs).map_err(|e| {
        ChunkerError::invalid_argument("examples", format!("liblinear error: {e:?}"))
    })?;
    builder.problem().input_data(training_input).bias(params.bias);
    builder
        .parameters()
        .solver_type(params.solver.into())
        .stopping_criterion(params.epsilon)
        .constraints_violation_cost(params.cost);
    liblinear::toggle_liblinear_stdout_output(false);
    let model = builder.build_model();
    liblinear::toggle_liblinear_stdout_output(true);
    let model = model.map_err(|e| ChunkerError::invalid_argument("examples", e.to_string()))?;
    tracing::info!(
        n_classes = model.labels().len(),
        n_features,
        "trained linear model"
    );

    let mut classes = vec![];
    let mut biases = vec![];
    for (i, &cls) in model.labels().iter().enumerate() {
        classes.push(u32::try_from(cls)?);
        biases.push(model.label_bias(i32::try_from(i)?));
    }
    let mut weights = SerializableHashMap::default();
    for fid in 1..=n_features {
        let mut class_weights = Vec::with_capacity(classes.len());
        for i in 0..classes.len() {
            let weight = model.feature_coefficient(i32::try_from(fid)?, i32::try_from(i)?);
            class_weights.push(weight);
        }
        if class_weights.iter().any(|&w| w != 0.0) {
            weights.insert(fid, class_weights);
        }
    }
    Ok(LinearModel {
        classes,
        biases,
        weights,
    })
}
