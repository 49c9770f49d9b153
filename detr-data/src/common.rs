//! Common imports from external crates.

pub use anyhow::{ensure, format_err, Context as _, Error, Result};
pub use itertools::{izip, Itertools as _};
pub use log::debug;
pub use serde::{Deserialize, Serialize};
pub use std::{
    env,
    fmt::Debug,
    fs, iter,
    path::{Path, PathBuf},
};
pub use tch::{kind::FLOAT_CPU, Device, Kind, Tensor};
pub use tch_tensor_like::TensorLike;

unzip_n::unzip_n!(pub 3);
