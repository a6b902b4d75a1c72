pub mod cli;
pub mod corners;
pub mod detection;
pub mod edges;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod transform;

pub use cli::{Cli, Command};
pub use corners::{find_document_corners, CornerConfig, Corners};
pub use detection::{estimate_skew, SkewConfig};
pub use edges::{extract_edges, EdgeConfig, CORNER_EDGES, SKEW_EDGES};
pub use error::{FailureKind, OperationResult, ProcessError};
pub use geometry::Size;
pub use pipeline::{
    align, align_image, align_with, detect_corners, detect_document_corners,
    detect_document_corners_with, AlignConfig, CornersConfig, SkewResult,
};
pub use transform::rotate_expanded;
