// Processing stages: field parsing, categorization, normalization, aggregation and validation

pub mod aggregate;
pub mod categorize;
pub mod normalize;
pub mod parser;
pub mod quality_gate;
pub mod temporal;
