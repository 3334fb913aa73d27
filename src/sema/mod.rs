// src/sema/mod.rs
pub mod analyzer;
pub mod cast;
pub mod catalog;
pub mod scope;
pub mod types;

pub use analyzer::{Analysis, Analyzer, Input, Output, analyze};
pub use cast::{Cast, CastKind, CastResolver};
pub use catalog::{CtorId, FieldId, MethodId, TypeCatalog, TypeDefKind};
pub use scope::{Scope, VarId, VarName, Variable};
pub use types::{Type, TypeDefId};
