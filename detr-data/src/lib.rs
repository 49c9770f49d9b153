//! Data preparation toolkit for DETR-style detection training.

mod common;

pub mod annotation;
pub mod collate;
pub mod image_;
pub mod processor;
