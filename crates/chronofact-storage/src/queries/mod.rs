//! Raw SQL operations, one module per table.

pub mod fact_ops;
