//! Form builder core: the draft being authored and the commands that edit it.

pub mod command;
pub mod draft;
pub mod reorder;

pub use command::DraftCommand;
pub use draft::{FormDraft, PublishTarget};
pub use reorder::move_item;
