//! Integration tests for bindconf

mod arrays;
mod consolidation;
mod custom_values;
mod pipeline;
