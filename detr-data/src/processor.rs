//! Batch transformation for the image processing delegate.

use crate::{
    annotation::{ImageAnnotations, ObjectAnnotations},
    collate::ProcessedExample,
    common::*,
    image_,
};

/// A raw batch of image paths with their object annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBatch {
    pub image_paths: Vec<PathBuf>,
    pub objects: Vec<ObjectAnnotations>,
}

/// Per-example training targets produced by the image processing delegate.
#[derive(Debug, TensorLike)]
pub struct TargetLabels {
    pub image_id: i64,
    /// Class index per object.
    pub class_labels: Tensor,
    /// One box per object; the number of rows varies across examples.
    pub boxes: Tensor,
}

/// The batch-level output of the image processing delegate.
#[derive(Debug, TensorLike)]
pub struct ProcessorOutput {
    pub pixel_values: Tensor,
    pub pixel_mask: Option<Tensor>,
    pub labels: Vec<TargetLabels>,
}

impl ProcessorOutput {
    /// Splits the batch into per-example records, one per leading-dimension
    /// slice.
    pub fn into_examples(self) -> Result<Vec<ProcessedExample>> {
        let Self {
            pixel_values,
            pixel_mask,
            labels,
        } = self;

        let batch_size = labels.len() as i64;
        ensure!(
            pixel_values.size().first() == Some(&batch_size),
            "expect pixel values with leading dimension {}, but get {:?}",
            batch_size,
            pixel_values.size()
        );

        let pixel_values = pixel_values.unbind(0);
        let pixel_masks: Vec<_> = match pixel_mask {
            Some(mask) => {
                ensure!(
                    mask.size().first() == Some(&batch_size),
                    "expect pixel mask with leading dimension {}, but get {:?}",
                    batch_size,
                    mask.size()
                );
                mask.unbind(0).into_iter().map(Some).collect()
            }
            None => iter::repeat_with(|| None).take(labels.len()).collect(),
        };

        let examples: Vec<_> = izip!(pixel_values, labels, pixel_masks)
            .map(|(pixel_values, labels, pixel_mask)| ProcessedExample {
                pixel_values,
                labels,
                pixel_mask,
            })
            .collect();

        Ok(examples)
    }
}

/// The delegate that resizes, rescales and normalizes images and converts
/// annotations into training targets.
pub trait ImageProcessor
where
    Self: Debug,
{
    fn process(
        &self,
        images: &[Tensor],
        annotations: &[ImageAnnotations],
        return_tensors: bool,
    ) -> Result<ProcessorOutput>;
}

/// Loads the batch images, derives their COCO-style records and feeds both
/// to the image processing delegate.
pub fn transform_batch<P>(
    batch: &RawBatch,
    processor: &P,
    return_pixel_mask: bool,
) -> Result<ProcessorOutput>
where
    P: ImageProcessor,
{
    let RawBatch {
        ref image_paths,
        ref objects,
    } = *batch;

    ensure!(
        image_paths.len() == objects.len(),
        "expect {} object annotations, but get {}",
        image_paths.len(),
        objects.len()
    );

    let mut images = Vec::with_capacity(image_paths.len());
    let mut annotations = Vec::with_capacity(objects.len());

    for (image_path, objects) in izip!(image_paths, objects) {
        images.push(image_::load_rgb(image_path)?);
        annotations.push(ImageAnnotations::from_objects(objects)?);
    }

    let mut output = processor.process(&images, &annotations, true)?;
    if !return_pixel_mask {
        output.pixel_mask = None;
    }

    debug!(
        "transformed a batch of {} images into pixel values of shape {:?}",
        images.len(),
        output.pixel_values.size()
    );

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug)]
    struct MockProcessor {
        with_pixel_mask: bool,
        num_calls: Cell<usize>,
    }

    impl MockProcessor {
        fn new(with_pixel_mask: bool) -> Self {
            Self {
                with_pixel_mask,
                num_calls: Cell::new(0),
            }
        }
    }

    impl ImageProcessor for MockProcessor {
        fn process(
            &self,
            images: &[Tensor],
            annotations: &[ImageAnnotations],
            _return_tensors: bool,
        ) -> Result<ProcessorOutput> {
            ensure!(
                images.len() == annotations.len(),
                "expect {} annotations, but get {}",
                images.len(),
                annotations.len()
            );
            self.num_calls.set(self.num_calls.get() + 1);

            let pixel_values: Vec<_> = images
                .iter()
                .map(|image| image.to_kind(Kind::Float).permute(&[2, 0, 1]) / 255.0)
                .collect();
            let pixel_values = Tensor::f_stack(&pixel_values, 0)?;

            let labels: Vec<_> = annotations
                .iter()
                .map(|wrapper| {
                    let class_labels: Vec<i64> = wrapper
                        .annotations
                        .iter()
                        .map(|record| record.category_id)
                        .collect();
                    let boxes: Vec<f32> = wrapper
                        .annotations
                        .iter()
                        .flat_map(|record| record.bbox.iter().map(|&val| val as f32))
                        .collect();

                    TargetLabels {
                        image_id: wrapper.image_id,
                        class_labels: Tensor::of_slice(&class_labels),
                        boxes: Tensor::of_slice(&boxes).view([-1, 4]),
                    }
                })
                .collect();

            let pixel_mask = if self.with_pixel_mask {
                let size = pixel_values.size();
                Some(Tensor::ones(
                    &[size[0], size[2], size[3]],
                    (Kind::Int64, Device::Cpu),
                ))
            } else {
                None
            };

            Ok(ProcessorOutput {
                pixel_values,
                pixel_mask,
                labels,
            })
        }
    }

    fn save_test_image(name: &str) -> Result<PathBuf> {
        let path = env::temp_dir().join(name);
        image::RgbImage::from_pixel(4, 4, image::Rgb([8, 16, 32])).save(&path)?;
        Ok(path)
    }

    fn fixture_batch() -> Result<RawBatch> {
        let image_paths = vec![
            save_test_image("detr-data-transform-0.png")?,
            save_test_image("detr-data-transform-1.png")?,
        ];
        let objects = vec![
            ObjectAnnotations {
                image_id: 10,
                bbox: vec![[0.0, 0.0, 2.0, 2.0], [1.0, 1.0, 3.0, 1.0]],
                category_id: vec![0, 2],
                area: vec![4.0, 3.0],
            },
            ObjectAnnotations {
                image_id: 11,
                bbox: vec![],
                category_id: vec![],
                area: vec![],
            },
        ];

        Ok(RawBatch {
            image_paths,
            objects,
        })
    }

    #[test]
    fn transform_batch_feeds_the_delegate_once() -> Result<()> {
        let batch = fixture_batch()?;
        let processor = MockProcessor::new(true);

        let output = transform_batch(&batch, &processor, false)?;
        assert_eq!(processor.num_calls.get(), 1);
        assert_eq!(output.pixel_values.size(), vec![2, 3, 4, 4]);
        assert!(output.pixel_mask.is_none());

        assert_eq!(output.labels.len(), 2);
        assert_eq!(output.labels[0].image_id, 10);
        assert_eq!(output.labels[0].class_labels.size(), vec![2]);
        assert_eq!(output.labels[0].boxes.size(), vec![2, 4]);
        assert_eq!(output.labels[1].image_id, 11);
        assert_eq!(output.labels[1].class_labels.size(), vec![0]);

        Ok(())
    }

    #[test]
    fn transform_batch_keeps_requested_pixel_mask() -> Result<()> {
        let batch = fixture_batch()?;
        let processor = MockProcessor::new(true);

        let output = transform_batch(&batch, &processor, true)?;
        let pixel_mask = output.pixel_mask.expect("pixel mask was requested");
        assert_eq!(pixel_mask.size(), vec![2, 4, 4]);

        Ok(())
    }

    #[test]
    fn mismatched_batch_sequences_are_rejected() {
        let batch = RawBatch {
            image_paths: vec![PathBuf::from("unused.png")],
            objects: vec![],
        };
        let processor = MockProcessor::new(false);

        assert!(transform_batch(&batch, &processor, false).is_err());
    }

    #[test]
    fn unreadable_image_path_is_an_error() {
        let batch = RawBatch {
            image_paths: vec![PathBuf::from("no-such-image.png")],
            objects: vec![ObjectAnnotations {
                image_id: 0,
                bbox: vec![],
                category_id: vec![],
                area: vec![],
            }],
        };
        let processor = MockProcessor::new(false);

        assert!(transform_batch(&batch, &processor, false).is_err());
    }

    #[test]
    fn into_examples_splits_the_batch() -> Result<()> {
        let batch = fixture_batch()?;
        let processor = MockProcessor::new(true);

        let output = transform_batch(&batch, &processor, true)?;
        let examples = output.into_examples()?;
        assert_eq!(examples.len(), 2);

        for (index, example) in examples.iter().enumerate() {
            assert_eq!(example.pixel_values.size(), vec![3, 4, 4]);
            let pixel_mask = example.pixel_mask.as_ref().expect("pixel mask was kept");
            assert_eq!(pixel_mask.size(), vec![4, 4]);
            assert_eq!(example.labels.image_id, 10 + index as i64);
        }
        assert_eq!(examples[0].labels.boxes.size(), vec![2, 4]);
        assert_eq!(examples[1].labels.boxes.size(), vec![0, 4]);

        Ok(())
    }
}
