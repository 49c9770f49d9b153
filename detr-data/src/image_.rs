//! Image file loading.

use crate::common::*;
use image::FlatSamples;

/// Loads an image file into an `(height, width, 3)` RGB tensor of u8
/// components.
pub fn load_rgb(path: impl AsRef<Path>) -> Result<Tensor> {
    let path = path.as_ref();

    let image = image::io::Reader::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?
        .with_guessed_format()
        .with_context(|| {
            format!(
                "failed to determine the image file format: {}",
                path.display()
            )
        })?
        .decode()
        .with_context(|| format!("failed to decode image file: {}", path.display()))?
        .to_rgb8();

    let (width, height) = image.dimensions();
    let FlatSamples { samples, .. } = image.into_flat_samples();
    debug_assert_eq!(samples.len(), height as usize * width as usize * 3);

    let tensor = Tensor::of_slice(&samples).view([height as i64, width as i64, 3]);
    Ok(tensor)
}
