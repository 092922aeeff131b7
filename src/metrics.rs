use crate::error::{DiscrimError, Result};
use ndarray::Array2;

pub fn accuracy_score<L: PartialEq>(y_true: &[L], y_pred: &[L]) -> Result<f64> {
    if y_true.len() != y_pred.len() {
        return Err(DiscrimError::dimension_mismatch(
            format!("{} predictions", y_true.len()),
            format!("{} predictions", y_pred.len()),
        ));
    }
    if y_true.is_empty() {
        return Err(DiscrimError::EmptyInput);
    }

    let correct = y_true.iter().zip(y_pred.iter()).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// Counts with true classes as rows and predicted classes as columns, both in
/// the order of `classes`. Labels outside `classes` are an error.
pub fn confusion_matrix<L: PartialEq + std::fmt::Debug>(
    classes: &[L],
    y_true: &[L],
    y_pred: &[L],
) -> Result<Array2<usize>> {
    if y_true.len() != y_pred.len() {
        return Err(DiscrimError::dimension_mismatch(
            format!("{} predictions", y_true.len()),
            format!("{} predictions", y_pred.len()),
        ));
    }

    let index = |label: &L| {
        classes
            .iter()
            .position(|c| c == label)
            .ok_or_else(|| DiscrimError::InvalidInput(format!("unknown class {:?}", label)))
    };

    let mut matrix = Array2::zeros((classes.len(), classes.len()));
    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        matrix[[index(t)?, index(p)?]] += 1;
    }
    Ok(matrix)
}
