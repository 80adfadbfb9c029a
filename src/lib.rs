//! Workspace tooling package. Holds the pre-commit hook configuration; the
//! library lives in `crates/dryroutes-lib`.
