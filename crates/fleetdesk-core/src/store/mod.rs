// ── Reactive resource mirrors ──

mod mirror;
mod state;

pub use mirror::{DeleteOutcome, ResourceMirror};
pub use state::{LoadState, MirrorState};
