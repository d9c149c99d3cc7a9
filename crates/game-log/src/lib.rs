//! Console log tail reader and hero detection.
//!
//! Deadlock writes `game/citadel/console.log` when launched with `-condebug`.
//! The log is append-only and unstructured, so detection works on a bounded
//! trailing window: read the last few KB, find the most recent hero
//! selection line, and map the internal hero id to its display name.

mod extract;
mod heroes;
mod source;
mod tail;

pub use extract::{extract_character, extract_hero_id};
pub use heroes::HeroTable;
pub use source::{ConsoleLogSource, HeroSource};
pub use tail::read_tail;

/// Default size of the trailing window read from the console log (bytes).
pub const DEFAULT_TAIL_BYTES: u64 = 5000;
