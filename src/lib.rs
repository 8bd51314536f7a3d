//! Synthetic earthquake catalog generation.
//!
//! Primary fields (location, depth, magnitude) are drawn from fitted kernel
//! density models; every other column is derived from them by fixed rules
//! plus seeded noise. One explicitly passed `ChaCha20Rng` drives all draws,
//! so a seed and a pair of model artifacts fully determine a batch.

pub mod catalog;
pub mod config;
pub mod density;
pub mod error;
pub mod generator;
pub mod numeric;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod sampler;
pub mod summary;
pub mod types;

pub use config::{DateWindow, GeneratorConfig};
pub use density::{DensityModel, GaussianKde};
pub use error::{Error, Result};
pub use generator::{DensityModels, generate_batch};
pub use record::{COLUMNS, EventBatch, EventRecord};
