//! Scoped single-operation invocation of relay-hosted services.

pub mod outcome;
pub mod runner;
pub mod scope;

pub use outcome::{classify, FailureKind, FailureStage, InvocationFailure, InvocationOutcome};
pub use runner::{InvocationError, InvocationRunner, InvocationRunnerBuilder, OperationPanicked};
pub use scope::FactoryScope;
