use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use ctm_textgrid::{
    emit_tiers, ConversionConfig, ConversionSummary, ConverterBuilder, DuplicateKeyPolicy,
    LabelField, OutputNaming, TextGridSink, TierSink, UtteranceTier,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

#[path = "ctm_to_textgrid/json_summary_formatter.rs"]
mod json_summary_formatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DuplicateKeysChoice {
    LastWins,
    FirstWins,
    Reject,
}

impl DuplicateKeysChoice {
    fn policy(self) -> DuplicateKeyPolicy {
        match self {
            Self::LastWins => DuplicateKeyPolicy::LastWins,
            Self::FirstWins => DuplicateKeyPolicy::FirstWins,
            Self::Reject => DuplicateKeyPolicy::Reject,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LabelFieldChoice {
    /// Fifth column is the label, an optional sixth is confidence.
    Single,
    /// Everything after the duration column is the label.
    Remainder,
}

impl LabelFieldChoice {
    fn label_field(self) -> LabelField {
        match self {
            Self::Single => LabelField::Single,
            Self::Remainder => LabelField::Remainder,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum NamingChoice {
    /// utterance-{n}.TextGrid
    Index,
    /// {utterance_id}.TextGrid
    UtteranceId,
}

impl NamingChoice {
    fn naming(self) -> OutputNaming {
        match self {
            Self::Index => OutputNaming::Index,
            Self::UtteranceId => OutputNaming::UtteranceId,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "ctm_to_textgrid")]
#[command(about = "Converts Kaldi CTM alignments to Praat TextGrid files")]
struct Args {
    /// CTM file produced by the aligner.
    #[arg(long, env = "CTM_TEXTGRID_CTM")]
    ctm: Option<PathBuf>,
    /// wav.scp mapping utterances to audio files.
    #[arg(long, env = "CTM_TEXTGRID_WAV")]
    wav: Option<PathBuf>,
    /// Segment to utterance mapping [default: ./segments].
    #[arg(long, env = "CTM_TEXTGRID_SEG")]
    seg: Option<PathBuf>,
    /// Directory for the TextGrid output [default: .].
    #[arg(short = 'o', long, env = "CTM_TEXTGRID_OUTDIR")]
    outdir: Option<PathBuf>,
    /// JSON file with defaults for any of these options.
    #[arg(long, env = "CTM_TEXTGRID_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "CTM_TEXTGRID_TIER_NAME")]
    tier_name: Option<String>,
    #[arg(long, env = "CTM_TEXTGRID_DUPLICATE_KEYS", value_enum)]
    duplicate_keys: Option<DuplicateKeysChoice>,
    #[arg(long, env = "CTM_TEXTGRID_LABEL_FIELD", value_enum)]
    label_field: Option<LabelFieldChoice>,
    #[arg(long, env = "CTM_TEXTGRID_NAMING", value_enum)]
    naming: Option<NamingChoice>,
    /// Also write a confidence tier when the CTM carries confidence scores.
    #[arg(long, env = "CTM_TEXTGRID_CONFIDENCE_TIER", default_value_t = false)]
    confidence_tier: bool,
    /// Write a JSON run summary here.
    #[arg(long, env = "CTM_TEXTGRID_SUMMARY_OUT")]
    summary_out: Option<PathBuf>,
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

/// Ticks a progress bar for every tier passed on to the wrapped sink.
struct ProgressSink<'a> {
    inner: &'a mut dyn TierSink,
    progress: &'a ProgressBar,
}

impl TierSink for ProgressSink<'_> {
    fn prepare(&mut self, tiers: &[UtteranceTier]) -> ctm_textgrid::Result<()> {
        self.inner.prepare(tiers)
    }

    fn write_tier(&mut self, index: usize, tier: &UtteranceTier) -> ctm_textgrid::Result<()> {
        self.progress.set_message(tier.utterance_id.clone());
        self.inner.write_tier(index, tier)?;
        self.progress.inc(1);
        Ok(())
    }
}

fn main() {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(message) = run(args) {
        tracing::error!("{message}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), String> {
    let config = resolve_config(&args)?;
    let converter = ConverterBuilder::new(config.clone())
        .build()
        .map_err(|err| format!("Failed to set up conversion: {err}"))?;

    let tiers = converter
        .convert()
        .map_err(|err| format!("Conversion failed: {err}"))?;
    tracing::info!(
        utterances = tiers.len(),
        tokens = tiers.iter().map(|tier| tier.tokens.len()).sum::<usize>(),
        "correlated CTM tokens"
    );

    let mut sink = TextGridSink::from_config(&config);
    let progress = ProgressBar::new(tiers.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    let written = {
        let mut progress_sink = ProgressSink {
            inner: &mut sink,
            progress: &progress,
        };
        emit_tiers(&tiers, &mut progress_sink)
            .map_err(|err| format!("Failed to write TextGrid output: {err}"))?
    };
    progress.finish_with_message("conversion complete");
    println!(
        "Wrote {written} TextGrid file(s) to '{}'.",
        config.output_dir.display()
    );

    if let Some(summary_path) = args.summary_out.as_ref() {
        let summary = ConversionSummary::new(&config, &tiers, sink.written_paths());
        json_summary_formatter::write_summary(summary_path, &summary)?;
        println!("{}", summary_path.display());
    }
    Ok(())
}

fn resolve_config(args: &Args) -> Result<ConversionConfig, String> {
    let mut config = match args.config.as_ref() {
        Some(path) => ConversionConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => ConversionConfig::default(),
    };
    if let Some(ctm) = args.ctm.as_ref() {
        config.ctm_path = ctm.clone();
    }
    if let Some(wav) = args.wav.as_ref() {
        config.wav_scp_path = wav.clone();
    }
    if let Some(seg) = args.seg.as_ref() {
        config.segments_path = seg.clone();
    }
    if let Some(outdir) = args.outdir.as_ref() {
        config.output_dir = outdir.clone();
    }
    if let Some(tier_name) = args.tier_name.as_ref() {
        config.tier_name = tier_name.clone();
    }
    if let Some(choice) = args.duplicate_keys {
        config.duplicate_keys = choice.policy();
    }
    if let Some(choice) = args.label_field {
        config.label_field = choice.label_field();
    }
    if let Some(choice) = args.naming {
        config.naming = choice.naming();
    }
    if args.confidence_tier {
        config.confidence_tier = true;
    }
    if config.tier_name.trim().is_empty() {
        return Err("--tier-name must not be empty.".to_string());
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "ctm_to_textgrid",
            "--ctm",
            "exp/ctm",
            "--wav",
            "data/wav.scp",
            "-o",
            "out",
            "--duplicate-keys",
            "reject",
            "--naming",
            "utterance-id",
        ]);
        let config = resolve_config(&args).expect("valid flags");
        assert_eq!(config.ctm_path, PathBuf::from("exp/ctm"));
        assert_eq!(config.wav_scp_path, PathBuf::from("data/wav.scp"));
        assert_eq!(config.segments_path, PathBuf::from("./segments"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.duplicate_keys, DuplicateKeyPolicy::Reject);
        assert_eq!(config.naming, OutputNaming::UtteranceId);
        assert_eq!(config.tier_name, "phones");
    }

    #[test]
    fn empty_tier_name_is_rejected() {
        let args = Args::parse_from(["ctm_to_textgrid", "--tier-name", " "]);
        assert!(resolve_config(&args).is_err());
    }
}
