//! COCO-style annotation records.

use crate::common::*;

/// Raw per-image object annotations with index-aligned parallel arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectAnnotations {
    pub image_id: i64,
    /// Bounding boxes in COCO `[x, y, w, h]` order, in pixel units.
    pub bbox: Vec<[f64; 4]>,
    pub category_id: Vec<i64>,
    pub area: Vec<f64>,
}

impl ObjectAnnotations {
    /// The number of annotated objects.
    pub fn len(&self) -> usize {
        self.bbox.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bbox.is_empty()
    }
}

/// One COCO-style object annotation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocoAnnotation {
    pub image_id: i64,
    pub bbox: [f64; 4],
    pub category_id: i64,
    pub area: f64,
    pub iscrowd: u8,
}

/// The per-image wrapper consumed by the image processing delegate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnnotations {
    pub image_id: i64,
    pub annotations: Vec<CocoAnnotation>,
}

impl ImageAnnotations {
    /// Builds one record per bounding box, keeping the index alignment of
    /// `bbox`, `category_id` and `area`.
    pub fn from_objects(objects: &ObjectAnnotations) -> Result<Self> {
        let ObjectAnnotations {
            image_id,
            ref bbox,
            ref category_id,
            ref area,
        } = *objects;

        ensure!(
            bbox.len() == category_id.len() && bbox.len() == area.len(),
            "annotation arrays for image {} have mismatched lengths: {} bboxes, {} category ids, {} areas",
            image_id,
            bbox.len(),
            category_id.len(),
            area.len()
        );

        let annotations: Vec<_> = izip!(bbox, category_id, area)
            .map(|(&bbox, &category_id, &area)| CocoAnnotation {
                image_id,
                bbox,
                category_id,
                area,
                iscrowd: 0,
            })
            .collect();

        Ok(Self {
            image_id,
            annotations,
        })
    }
}
