//! Common imports from external crates.

pub use anyhow::{Context as _, Error, Result};
pub use log::info;
pub use serde::{Deserialize, Serialize};
pub use std::{
    fmt::Debug,
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus},
    thread,
    time::{Duration, Instant},
};
