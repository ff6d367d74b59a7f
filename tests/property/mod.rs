//! Property-based tests for evaluation and context guarantees

mod context_shape;
mod evaluation;
