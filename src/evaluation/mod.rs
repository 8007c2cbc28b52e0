//! Route construction from client sequences and invariant auditing.

mod evaluator;

pub use evaluator::RouteEvaluator;
