pub mod id;
pub mod lint;
pub mod model;
pub mod outline;
pub mod store;
pub mod tags;
pub mod topology;

pub use id::NodeId;
pub use lint::{LintDiagnostic, LintSeverity, lint_project};
pub use model::*;
pub use outline::emit_outline;
pub use store::{ProjectStore, StoreData, StoreError};
pub use topology::Topology;
