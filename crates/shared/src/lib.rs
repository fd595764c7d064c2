//! Domain vocabulary shared by the grouping engine, the session controller,
//! the class store and the `jigsaw` binary.

pub mod domain;
pub mod error;
pub mod text;
