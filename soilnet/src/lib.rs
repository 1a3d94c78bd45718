//! Soil type classification from photographs.
//!
//! The crate turns the raw bytes of a soil photograph into a labeled
//! prediction using a trained SoilNet model exported to ONNX.
//! See the [`service`] module for the inference service.

pub mod service;
