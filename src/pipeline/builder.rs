use crate::config::{ConversionConfig, DuplicateKeyPolicy, LabelField};
use crate::error::{ConversionError, Result};
use crate::pipeline::runtime::{Converter, ConverterParts};

pub struct ConverterBuilder {
    config: ConversionConfig,
}

impl ConverterBuilder {
    pub fn new(config: ConversionConfig) -> Self {
        Self { config }
    }

    pub fn with_duplicate_key_policy(mut self, policy: DuplicateKeyPolicy) -> Self {
        self.config.duplicate_keys = policy;
        self
    }

    pub fn with_label_field(mut self, label_field: LabelField) -> Self {
        self.config.label_field = label_field;
        self
    }

    pub fn build(self) -> Result<Converter> {
        let missing = [
            ("segments", &self.config.segments_path),
            ("CTM", &self.config.ctm_path),
            ("wav.scp", &self.config.wav_scp_path),
        ]
        .into_iter()
        .filter(|(_, path)| path.as_os_str().is_empty())
        .map(|(name, _)| name)
        .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(ConversionError::invalid_input(format!(
                "no path given for the {} table(s)",
                missing.join(", ")
            )));
        }

        let options = self.config.table_options();
        Ok(Converter::from_parts(ConverterParts {
            segments_path: self.config.segments_path,
            ctm_path: self.config.ctm_path,
            wav_scp_path: self.config.wav_scp_path,
            options,
        }))
    }
}
