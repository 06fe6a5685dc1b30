pub mod logs;

pub use logs::{
    log_dimmed, log_features, log_generic_error, log_header, log_newline, log_rubric, log_tiers,
    log_transcript_stats, TranscriptAssessment,
};
