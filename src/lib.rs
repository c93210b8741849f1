pub mod ai;
pub mod config;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod session;
pub mod subtitle;
pub mod timecode;
pub mod timeline;

pub use config::{Config, OutputFormat};
pub use error::{MediacutError, Result};
pub use pipeline::{
    analyze_media, print_summary, translate_track, PipelineConfig, PipelineResult, PipelineStats,
};
pub use session::TranscriptSession;
pub use timeline::store::SegmentStore;
pub use timeline::TranscriptSegment;
