// Analyzer module: cross-store price comparison over the reconciled catalog.

pub mod comparison;

pub use comparison::widest_spreads;
