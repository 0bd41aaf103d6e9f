/*!
 * # Caret module
 *
 * The cursor abstraction the movement engine drives:
 *
 * - **`Cursor`**: owns a marker element in [`Namespace::Caret`] plus the
 *   [`Selection`]. Attaching the marker mid-text splits the text node;
 *   removing it merges the surrounding text nodes back together. Both
 *   mutations are reported as plain values ([`CursorRemoval`],
 *   [`CursorUpdate`]) so callers can reconcile any positions they hold
 *   into the affected nodes.
 * - **`Selection`**: anchor/focus pair, independent of whether the marker
 *   is physically present in the tree.
 *
 * [`Namespace::Caret`]: crate::dom::Namespace::Caret
 */

pub mod cursor;
pub mod selection;

pub use cursor::{Cursor, CursorId, CursorRemoval, CursorUpdate};
pub use selection::Selection;
