pub mod alignment;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod tables;
pub mod types;

pub use alignment::{correlate, emit_tiers, project_tiers, Correlation};
pub use config::{ConversionConfig, DuplicateKeyPolicy, LabelField, OutputNaming, TableOptions};
pub use error::{ConversionError, Result};
pub use output::{ConversionSummary, TextGridSink, TierSummary};
pub use pipeline::builder::ConverterBuilder;
pub use pipeline::defaults::{MemorySink, WavDurationProbe};
pub use pipeline::runtime::{convert_tables, ConversionOutcome, Converter, LoadedTables};
pub use pipeline::traits::{AudioDurationProbe, TierSink};
pub use tables::recordings::{parse_recording_map, read_recording_map, RecordingMap};
pub use tables::segments::{parse_segment_map, read_segment_map, SegmentMap};
pub use tables::tokens::{parse_token_table, read_token_table, TokenRow};
pub use tables::TableKind;
pub use types::{AbsoluteToken, RecordingEntry, SegmentRecord, TokenRecord, UtteranceTier};
