//! Error taxonomy for the rendering core
//!
//! Setup-time failures (missing shaders or assets, pipeline construction)
//! are unrecoverable and surface at the application boundary. Per-frame
//! failures are reported so callers can log and decide.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// A shader module was requested by a name that was never registered.
    #[error("shader module `{0}` is not registered")]
    UnknownShader(String),

    /// A named mesh asset could not be found or parsed.
    #[error("failed to load mesh asset `{path}`: {source}")]
    AssetLoad {
        path: String,
        #[source]
        source: tobj::LoadError,
    },

    /// A mesh asset parsed but produced no geometry.
    #[error("mesh asset `{0}` contains no geometry")]
    EmptyAsset(String),

    /// An indexed draw was requested but no index data is present.
    #[error("indexed draw requested but no index data is present")]
    MissingIndices,

    /// A per-draw uniform block is too large for the transient upload path.
    #[error("uniform block of {size} bytes exceeds the {limit}-byte transient upload limit")]
    OversizedUniform { size: usize, limit: usize },

    /// The per-frame transient uniform arena ran out of space.
    #[error("transient uniform arena exhausted: {requested} bytes requested, {remaining} available")]
    TransientExhausted { requested: u64, remaining: u64 },

    /// More lights of one kind than the shader-side arrays can hold.
    #[error("{kind} light count {count} exceeds the shader-side capacity {capacity}")]
    TooManyLights {
        kind: &'static str,
        count: usize,
        capacity: usize,
    },

    /// An instance index outside the current instance set.
    #[error("instance index {index} out of range for {count} instances")]
    InstanceIndex { index: usize, count: usize },

    /// The presentation surface failed to provide a frame.
    #[error("render surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}
