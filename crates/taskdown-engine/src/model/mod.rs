pub mod block;
pub mod node;

pub use block::{AccordionEntry, ChecklistEntry, InputBlock, LooseText, NestedContent};
pub use node::{Mark, MarkKind, Node, NodeError, NodeKind};
