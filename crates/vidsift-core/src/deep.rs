//! Deep-feature signatures pooled from captured network activations.
//!
//! The feature network itself is an external collaborator. It hands back an
//! [`ActivationBundle`]: the intermediate activations of one forward pass,
//! keyed by layer name. Nothing here observes the network through shared
//! state, so concurrent extractions cannot interleave.
//!
//! ## Pooling (all outputs have 512 values)
//!
//! - `layer3` `[1, 256, D, H, W]`: each channel's `D·H·W` block is split into
//!   two contiguous temporal halves and each half is averaged. Output index is
//!   `channel * 2 + half`.
//! - `layer4` `[1, 512, D, H, W]`: per-channel mean.
//! - `avgpool` `[1, 512, 1, 1, 1]`: flattened.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Length of every deep-feature signature.
pub const DEEP_SIGNATURE_LEN: usize = 512;

/// Decimal places kept in pooled features.
const FEATURE_PRECISION: i32 = 5;

/// Round a float to the specified number of decimal places.
fn round_f64(value: f64, decimals: i32) -> f64 {
    let multiplier = 10_f64.powi(decimals);
    (value * multiplier).round() / multiplier
}

/// A dense row-major activation tensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationTensor {
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

impl ActivationTensor {
    /// Creates a tensor, checking that `data` fills `shape` exactly.
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> CoreResult<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(CoreError::Activation(format!(
                "shape {:?} needs {} values, found {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    fn numel(&self) -> usize {
        self.shape.iter().product()
    }
}

/// Named intermediate activations captured from one forward pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivationBundle {
    pub layers: BTreeMap<String, ActivationTensor>,
}

impl ActivationBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a layer.
    pub fn with_layer(mut self, name: impl Into<String>, tensor: ActivationTensor) -> Self {
        self.layers.insert(name.into(), tensor);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ActivationTensor> {
        self.layers.get(name)
    }

    /// Loads a bundle previously captured to JSON.
    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| CoreError::parse(path, format!("cannot read activations: {}", e)))?;
        let bundle: ActivationBundle = serde_json::from_str(&text)?;
        for (name, tensor) in &bundle.layers {
            if tensor.numel() != tensor.data.len() {
                return Err(CoreError::Activation(format!(
                    "layer '{}' has shape {:?} but {} values",
                    name,
                    tensor.shape,
                    tensor.data.len()
                )));
            }
        }
        Ok(bundle)
    }
}

/// The external feature network.
///
/// Implementations run one forward pass over the video at `path` and return
/// every captured layer in the bundle.
pub trait FeatureExtractor {
    fn extract(&self, path: &Path) -> CoreResult<ActivationBundle>;
}

/// Extractor backed by activation bundles captured to JSON beforehand.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapturedActivations;

impl FeatureExtractor for CapturedActivations {
    fn extract(&self, path: &Path) -> CoreResult<ActivationBundle> {
        ActivationBundle::from_json_file(path)
    }
}

/// Which captured layer a deep signature is pooled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeepLayer {
    Layer3,
    Layer4,
    AvgPool,
}

impl DeepLayer {
    /// Key of the layer inside an [`ActivationBundle`].
    pub fn as_str(&self) -> &'static str {
        match self {
            DeepLayer::Layer3 => "layer3",
            DeepLayer::Layer4 => "layer4",
            DeepLayer::AvgPool => "avgpool",
        }
    }

    /// Pools the layer's activation into a 512-value signature.
    pub fn pool(&self, bundle: &ActivationBundle) -> CoreResult<Vec<f64>> {
        let tensor = bundle.get(self.as_str()).ok_or_else(|| {
            CoreError::Activation(format!("bundle has no '{}' activation", self.as_str()))
        })?;

        let pooled = match self {
            DeepLayer::Layer3 => pool_temporal_halves(tensor, 256)?,
            DeepLayer::Layer4 => pool_channel_means(tensor, DEEP_SIGNATURE_LEN)?,
            DeepLayer::AvgPool => {
                if tensor.data.len() != DEEP_SIGNATURE_LEN {
                    return Err(CoreError::Activation(format!(
                        "avgpool must hold {} values, found {}",
                        DEEP_SIGNATURE_LEN,
                        tensor.data.len()
                    )));
                }
                tensor.data.clone()
            }
        };

        Ok(pooled
            .into_iter()
            .map(|v| round_f64(v, FEATURE_PRECISION))
            .collect())
    }
}

impl std::fmt::Display for DeepLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DeepLayer {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "layer3" => Ok(DeepLayer::Layer3),
            "layer4" => Ok(DeepLayer::Layer4),
            "avgpool" => Ok(DeepLayer::AvgPool),
            _ => Err(CoreError::Activation(format!("unknown layer '{}'", s))),
        }
    }
}

/// Splits the tensor into `channels` equal blocks.
fn channel_blocks(tensor: &ActivationTensor, channels: usize) -> CoreResult<usize> {
    let n = tensor.data.len();
    if n == 0 || n % channels != 0 {
        return Err(CoreError::Activation(format!(
            "{} values cannot be split into {} channels",
            n, channels
        )));
    }
    Ok(n / channels)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn pool_channel_means(tensor: &ActivationTensor, channels: usize) -> CoreResult<Vec<f64>> {
    let block = channel_blocks(tensor, channels)?;
    Ok(tensor.data.chunks_exact(block).map(mean).collect())
}

fn pool_temporal_halves(tensor: &ActivationTensor, channels: usize) -> CoreResult<Vec<f64>> {
    let block = channel_blocks(tensor, channels)?;
    if block % 2 != 0 {
        return Err(CoreError::Activation(format!(
            "channel block of {} values cannot be split into two temporal halves",
            block
        )));
    }
    Ok(tensor.data.chunks_exact(block / 2).map(mean).collect())
}
