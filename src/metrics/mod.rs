//! Evaluation of a trained network against labelled examples.

pub mod validation;

pub use validation::{argmax, ArgmaxAccuracy, ClassificationMetrics, Evaluation};
