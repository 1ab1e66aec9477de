//! iconsort - sort vector icons into `<category>/<color>/` folders
//!
//! This library walks a source tree for icon files, strips toolkit prefixes
//! from their names, classifies each name by keyword into a functional
//! category and a color variant, and moves the file into the matching
//! folder below a destination root without ever overwriting an existing file.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod normalizer;
pub mod organizer;
pub mod output;
pub mod placer;
pub mod report;
pub mod walker;

pub use classifier::{CategoryTable, Classification, Classifier, ColorTable};
pub use config::{CompiledFilters, ConfigError, IconConfig, Settings};
pub use normalizer::NameNormalizer;
pub use organizer::{FileRecord, FileState, OrganizeError, Organizer, RunEvent, RunMode};
pub use placer::{PlaceError, Placement, Placer};
pub use report::{RunReport, RunTally};
pub use walker::{DiscoveredFile, TreeWalker, WalkError};

pub use cli::{Cli, run_cli};
