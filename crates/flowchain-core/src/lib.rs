pub mod error;
pub mod graph;
pub mod id;
pub mod node;
pub mod policy;
pub mod seed;

// Re-export commonly used types
pub use error::{CoreError, LinkRejection};
pub use graph::{AppliedChange, Chain, ChangeKind, WorkflowGraph};
pub use id::{LinkTarget, NodeId, Port, Predecessor, Successor};
pub use node::{is_valid_equation, FunctionNode};
pub use policy::{FixedOrder, LinkPolicy};
