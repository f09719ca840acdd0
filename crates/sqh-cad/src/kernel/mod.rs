//! CAD kernel abstraction
//!
//! The conversion pipeline only needs three kernel capabilities: building a
//! temporary box solid, subtracting it from a body, and releasing it again.

mod analytic;
mod traits;

pub use analytic::AnalyticKernel;
pub use traits::{BrepKernel, CadError, CadResult, NullKernel, Solid, default_kernel};
