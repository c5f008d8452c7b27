//! Post composer
//!
//! The composer holds the draft of a single post while it is being edited:
//!
//! - `content`: master content and per-platform overrides
//! - `selection`: target platforms and the preview platform
//! - `state` / `actions` / `reducer`: the draft and the edits applied to it
//! - `finalize`: building a [`Post`](crate::types::Post) from the draft
//! - `session`: one composing session wired to generators, uploads and sinks

pub mod actions;
pub mod content;
pub mod finalize;
pub mod reducer;
pub mod selection;
pub mod session;
pub mod state;

pub use actions::Action;
pub use content::{effective_content, effective_media, OverrideMap, PlatformContent};
pub use finalize::{finalize, PostAction};
pub use reducer::reduce;
pub use selection::PlatformSelection;
pub use session::{CompletedGeneration, ComposerSession, GenerationOutcome, PendingGeneration, Ticket};
pub use state::{ComposerState, EditTarget, EditorMode};
