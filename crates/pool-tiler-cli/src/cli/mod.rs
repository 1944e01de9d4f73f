//! CLI command implementations.
//!
//! This module contains the implementations for the various CLI subcommands:
//! - `coping` - Lay coping tiles around a pool outline
//! - `pave` - Fill a paving boundary with pavers
//! - `extend` - Grow a layout out to an edited boundary
//! - `validate` - Check a paving boundary can hold a paver
//! - `import` - Turn a tagged SVG drawing into a job file

pub mod common;
pub mod coping;
pub mod extend;
pub mod import;
pub mod job;
pub mod pave;
pub mod validate;

pub use coping::cmd_coping;
pub use extend::cmd_extend;
pub use import::cmd_import;
pub use pave::cmd_pave;
pub use validate::cmd_validate;
