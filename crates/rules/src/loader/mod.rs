//! Filesystem rule loader.
//!
//! Scans a rules directory recursively for YAML rule documents, reports a
//! [`LoadResult`] per file and compiles the enabled rules into a
//! [`KnowledgeBase`](crate::rule::KnowledgeBase).

mod core;
mod error;


pub use self::core::RuleLoader;
pub(crate) use self::core::build_knowledge_base;
pub use self::error::{LoadResult, LoadStatus, Result, RuleError};
