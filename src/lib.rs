//! Workspace tooling package. It exists to carry the pre-commit hook
//! configuration in the root manifest; the code lives under `crates/`.
