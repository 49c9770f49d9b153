//! Batch collation for training and inference.

use crate::{common::*, processor::TargetLabels};

/// One processed training example.
#[derive(Debug, TensorLike)]
pub struct ProcessedExample {
    pub pixel_values: Tensor,
    pub labels: TargetLabels,
    pub pixel_mask: Option<Tensor>,
}

/// A batched set of processed examples.
#[derive(Debug, TensorLike)]
pub struct CollatedBatch {
    /// Image tensor with a leading batch dimension.
    pub pixel_values: Tensor,
    /// Per-example targets; shapes vary across examples.
    pub labels: Vec<TargetLabels>,
    pub pixel_mask: Option<Tensor>,
}

/// Merges processed examples into one training batch.
///
/// The presence of `pixel_mask` in the output follows the first example; a
/// later example without a mask is an error then.
pub fn collate_fn(examples: Vec<ProcessedExample>) -> Result<CollatedBatch> {
    ensure!(!examples.is_empty(), "cannot collate an empty batch");
    let has_pixel_mask = examples[0].pixel_mask.is_some();

    let (pixel_values, labels, pixel_masks) = examples
        .into_iter()
        .map(|example| {
            let ProcessedExample {
                pixel_values,
                labels,
                pixel_mask,
            } = example;
            (pixel_values, labels, pixel_mask)
        })
        .unzip_n_vec();

    let pixel_values = Tensor::f_stack(&pixel_values, 0)?;
    let pixel_mask = if has_pixel_mask {
        let masks: Vec<_> = pixel_masks
            .into_iter()
            .enumerate()
            .map(|(index, mask)| {
                mask.ok_or_else(|| {
                    format_err!(
                        "the first example has a pixel mask, but example {} does not",
                        index
                    )
                })
            })
            .try_collect()?;
        Some(Tensor::f_stack(&masks, 0)?)
    } else {
        None
    };

    Ok(CollatedBatch {
        pixel_values,
        labels,
        pixel_mask,
    })
}
