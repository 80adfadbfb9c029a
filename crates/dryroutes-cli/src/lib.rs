//! DryRoutes CLI library.
//!
//! Terminal styling and output formatting shared by the `dryroutes` binary.

pub mod output;
pub mod terminal;
