//! Burn inference backend for object detection.
//!
//! `BurnDetector` wraps any model implementing [`BurnModel`] and exposes it
//! as a [`DetectionSource`].
//!
//! ```ignore
//! use gatecount_rs::integration::{BurnDetector, BurnModel};
//! use burn::backend::NdArray;
//!
//! struct MyYoloModel { /* ... */ }
//!
//! impl BurnModel<NdArray> for MyYoloModel {
//!     fn forward(&self, input: burn::tensor::Tensor<NdArray, 4>) -> Vec<RawDetection> {
//!         // Run inference
//!     }
//! }
//!
//! let detector = BurnDetector::new(MyYoloModel::load("model.bin"), Default::default());
//! ```

use burn::prelude::*;
use burn::tensor::Tensor;
use thiserror::Error;

use super::{DetectionBuilder, DetectionSource, RawDetection};

#[derive(Debug, Clone, Error)]
pub enum BurnDetectorError {
    #[error("input is {got} bytes, expected {expected} for {width}x{height}x{channels}")]
    InputLength {
        expected: usize,
        got: usize,
        width: u32,
        height: u32,
        channels: u32,
    },
    #[error("input size {width}x{height} does not match model size {model_width}x{model_height}")]
    InputSize {
        width: u32,
        height: u32,
        model_width: u32,
        model_height: u32,
    },
}

/// Trait for Burn-based detection models.
pub trait BurnModel<B: Backend>: Send + Sync {
    /// Forward pass over a `[batch, channels, height, width]` tensor.
    ///
    /// Boxes are in the format reported by [`BurnModel::bbox_is_xywh`].
    fn forward(&self, input: Tensor<B, 4>) -> Vec<RawDetection>;

    /// Expected input size as (channels, height, width).
    fn input_size(&self) -> (u32, u32, u32) {
        (3, 640, 640)
    }

    /// Whether boxes come out as center/size rather than LTRB.
    fn bbox_is_xywh(&self) -> bool {
        true
    }
}

pub struct BurnDetector<B: Backend, M: BurnModel<B>> {
    model: M,
    device: B::Device,
}

impl<B: Backend, M: BurnModel<B>> BurnDetector<B, M> {
    pub fn new(model: M, device: B::Device) -> Self {
        Self { model, device }
    }

    /// Turn planar `u8` pixels into a normalized `[1, C, H, W]` tensor.
    pub fn preprocess(
        &self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Tensor<B, 4>, BurnDetectorError> {
        let (channels, model_height, model_width) = self.model.input_size();
        if height != model_height || width != model_width {
            return Err(BurnDetectorError::InputSize {
                width,
                height,
                model_width,
                model_height,
            });
        }

        let expected = (width * height * channels) as usize;
        if input.len() != expected {
            return Err(BurnDetectorError::InputLength {
                expected,
                got: input.len(),
                width,
                height,
                channels,
            });
        }

        let data: Vec<f32> = input.iter().map(|&x| x as f32 / 255.0).collect();
        Ok(
            Tensor::<B, 1>::from_floats(data.as_slice(), &self.device).reshape([
                1,
                channels as usize,
                height as usize,
                width as usize,
            ]),
        )
    }

    /// Normalize model boxes to LTRB.
    fn postprocess(&self, outputs: Vec<RawDetection>) -> Vec<RawDetection> {
        let xywh = self.model.bbox_is_xywh();
        outputs
            .into_iter()
            .map(|out| {
                let [a, b, c, d] = out.bbox;
                let builder = DetectionBuilder::new()
                    .confidence(out.confidence)
                    .class_id(out.class_id);
                if xywh {
                    builder.xywh(a, b, c, d).build()
                } else {
                    builder.ltrb(a, b, c, d).build()
                }
            })
            .collect()
    }
}

impl<B: Backend, M: BurnModel<B>> DetectionSource for BurnDetector<B, M> {
    type Error = BurnDetectorError;

    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<RawDetection>, Self::Error> {
        let tensor = self.preprocess(input, width, height)?;
        Ok(self.postprocess(self.model.forward(tensor)))
    }
}
