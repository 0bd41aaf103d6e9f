/*!
 * # Document tree module
 *
 * Arena-backed document model consumed by the movement engine:
 *
 * - **`DocumentTree`**: the node arena with parent/child/sibling links,
 *   structural mutation (attach, detach, text split/merge) and the
 *   structural relation query the position comparator is built on.
 * - **`NodeId`**: copyable handle into the arena. Handles stay valid for
 *   the lifetime of the tree; detached nodes keep their id and can be
 *   re-attached (cursor markers rely on this).
 * - **`Position`**: a `(container, offset)` pair — a character index for
 *   text containers, a child index for element containers.
 * - **`Namespace`**: closed enum of element namespaces; `Namespace::Caret`
 *   is reserved for cursor marker nodes and is what the traversal layer
 *   keys its exclusion filter on.
 *
 * The tree deliberately models only element and text nodes: those are the
 * only node kinds that carry positions, and everything else the engine
 * does is defined in terms of them.
 */

pub mod node;
pub mod tree;

pub use node::{Namespace, NodeId, NodeKind, NodeRelation, Position};
pub use tree::{DocumentTree, TreeError};
