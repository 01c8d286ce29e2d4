pub mod gradient_check;

pub use gradient_check::{gradient_check, GradientCheck};
