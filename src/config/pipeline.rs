use crate::data_model::{DATE_COLUMN, SENTIMENT_COLUMN, TEXT_COLUMN};
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where the raw labelled posts come from.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    pub path: PathBuf,
    pub delimiter: char,
    pub text_column: String,
    pub sentiment_column: String,
    pub date_column: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            path: PathBuf::from("data/Sentiment1.csv"),
            delimiter: ',',
            text_column: TEXT_COLUMN.to_string(),
            sentiment_column: SENTIMENT_COLUMN.to_string(),
            date_column: DATE_COLUMN.to_string(),
        }
    }
}

impl InputConfig {
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(PipelineError::ConfigValidationError(
                "InputConfig: path cannot be empty".to_string(),
            ));
        }
        if !self.delimiter.is_ascii() {
            return Err(PipelineError::ConfigValidationError(format!(
                "InputConfig: delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )));
        }
        for (name, value) in [
            ("text_column", &self.text_column),
            ("sentiment_column", &self.sentiment_column),
            ("date_column", &self.date_column),
        ] {
            if value.is_empty() {
                return Err(PipelineError::ConfigValidationError(format!(
                    "InputConfig: {} cannot be empty",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Which subword tokenizer bounds the token length of a text.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum TokenizerConfig {
    /// A Hugging Face tokenizer fetched by name.
    Pretrained { name: String, truncation: usize },
    /// Whitespace words plus the two special tokens; needs no download.
    Whitespace { truncation: usize },
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        TokenizerConfig::Pretrained {
            name: "bert-base-uncased".to_string(),
            truncation: 512,
        }
    }
}

impl TokenizerConfig {
    pub fn name(&self) -> &str {
        match self {
            TokenizerConfig::Pretrained { name, .. } => name,
            TokenizerConfig::Whitespace { .. } => "whitespace",
        }
    }

    pub fn truncation(&self) -> usize {
        match self {
            TokenizerConfig::Pretrained { truncation, .. } => *truncation,
            TokenizerConfig::Whitespace { truncation } => *truncation,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let TokenizerConfig::Pretrained { name, .. } = self {
            if name.is_empty() {
                return Err(PipelineError::ConfigValidationError(
                    "TokenizerConfig: name cannot be empty".to_string(),
                ));
            }
        }
        if self.truncation() == 0 {
            return Err(PipelineError::ConfigValidationError(
                "TokenizerConfig: truncation must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// What the label encoder does with a label outside Negative/Neutral/Positive.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnknownLabelPolicy {
    #[default]
    Fail,
    Drop,
}

/// Every constant the pipeline stages read. Passed explicitly, never global.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub input: InputConfig,
    pub seed: u64,
    pub data_test_size: f64,
    pub validation_fraction: f64,
    pub min_text_length: usize,
    pub max_token_length: usize,
    pub tokenizer: TokenizerConfig,
    pub unknown_label_policy: UnknownLabelPolicy,
    pub report_path: PathBuf,
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            input: InputConfig::default(),
            seed: 42,
            data_test_size: 0.2,
            validation_fraction: 0.1,
            min_text_length: 4,
            max_token_length: 80,
            tokenizer: TokenizerConfig::default(),
            unknown_label_policy: UnknownLabelPolicy::Fail,
            report_path: PathBuf::from("outputs/analysis_report.txt"),
            show_progress: true,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        self.input.validate()?;
        self.tokenizer.validate()?;

        let fractions = [
            ("data_test_size", self.data_test_size),
            ("validation_fraction", self.validation_fraction),
        ];
        for (name, value) in fractions.iter() {
            if !(*value > 0.0 && *value < 1.0) {
                return Err(PipelineError::ConfigValidationError(format!(
                    "PipelineConfig: {} must be strictly between 0.0 and 1.0, got {}",
                    name, value
                )));
            }
        }

        if self.max_token_length == 0 {
            return Err(PipelineError::ConfigValidationError(
                "PipelineConfig: max_token_length must be greater than 0".to_string(),
            ));
        }
        if self.report_path.as_os_str().is_empty() {
            return Err(PipelineError::ConfigValidationError(
                "PipelineConfig: report_path cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Content-stable key: equal configurations give equal fingerprints.
    pub fn fingerprint(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Loads, parses and validates the pipeline configuration YAML file.
pub fn load_pipeline_config<P: AsRef<Path>>(config_path: P) -> Result<PipelineConfig> {
    let path_ref = config_path.as_ref();
    let config_content = fs::read_to_string(path_ref).map_err(|e| {
        PipelineError::ConfigError(format!(
            "Failed to read pipeline config file '{}': {}",
            path_ref.display(),
            e
        ))
    })?;

    let config: PipelineConfig = serde_yaml::from_str(&config_content).map_err(|e| {
        PipelineError::ConfigError(format!(
            "Failed to parse pipeline config YAML from '{}': {}",
            path_ref.display(),
            e
        ))
    })?;

    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config_file(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(temp_file, "{}", content).expect("Failed to write to temp file");
        temp_file
    }

    macro_rules! assert_config_validation_error {
        ($result:expr, $expected_msg_part:expr) => {
            match $result {
                Err(PipelineError::ConfigValidationError(msg)) => {
                    assert!(
                        msg.contains($expected_msg_part),
                        "Error message '{}' did not contain '{}'",
                        msg,
                        $expected_msg_part
                    );
                }
                Err(other_err) => {
                    panic!(
                        "Expected ConfigValidationError, but got different error: {:?}",
                        other_err
                    );
                }
                Ok(_) => panic!("Expected error, but got Ok"),
            }
        };
    }

    #[test]
    fn test_defaults_match_reference_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.min_text_length, 4);
        assert_eq!(config.max_token_length, 80);
        assert_eq!(config.data_test_size, 0.2);
        assert_eq!(config.validation_fraction, 0.1);
        assert_eq!(config.tokenizer.truncation(), 512);
        assert_eq!(config.unknown_label_policy, UnknownLabelPolicy::Fail);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_config_fills_defaults() {
        let yaml_content = r#"
input:
  path: tweets.csv
seed: 7
tokenizer:
  type: Whitespace
  truncation: 128
unknown_label_policy: drop
        "#;
        let temp_file = create_temp_config_file(yaml_content);
        let config = load_pipeline_config(temp_file.path()).unwrap();
        assert_eq!(config.input.path, PathBuf::from("tweets.csv"));
        assert_eq!(config.input.delimiter, ',');
        assert_eq!(config.input.text_column, "Text");
        assert_eq!(config.seed, 7);
        assert_eq!(config.tokenizer, TokenizerConfig::Whitespace { truncation: 128 });
        assert_eq!(config.unknown_label_policy, UnknownLabelPolicy::Drop);
        assert_eq!(config.max_token_length, 80);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_pipeline_config("non_existent_config.yaml");
        match result {
            Err(PipelineError::ConfigError(msg)) => {
                assert!(msg.contains("Failed to read pipeline config file"));
                assert!(msg.contains("non_existent_config.yaml"));
            }
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_load_unknown_tokenizer_type() {
        let yaml_content = r#"
tokenizer:
  type: SentencePiece
  truncation: 512
        "#;
        let temp_file = create_temp_config_file(yaml_content);
        match load_pipeline_config(temp_file.path()) {
            Err(PipelineError::ConfigError(msg)) => {
                assert!(msg.contains("Failed to parse pipeline config YAML"));
            }
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_fractions_are_rejected() {
        let config = PipelineConfig {
            data_test_size: 1.0,
            ..PipelineConfig::default()
        };
        assert_config_validation_error!(config.validate(), "data_test_size");

        let config = PipelineConfig {
            validation_fraction: 0.0,
            ..PipelineConfig::default()
        };
        assert_config_validation_error!(config.validate(), "validation_fraction");
    }

    #[test]
    fn test_empty_column_name_is_rejected() {
        let mut config = PipelineConfig::default();
        config.input.sentiment_column = String::new();
        assert_config_validation_error!(config.validate(), "sentiment_column");
    }

    #[test]
    fn test_invalid_tokenizer_is_rejected() {
        let config = PipelineConfig {
            tokenizer: TokenizerConfig::Pretrained {
                name: "".to_string(),
                truncation: 512,
            },
            ..PipelineConfig::default()
        };
        assert_config_validation_error!(config.validate(), "name cannot be empty");

        let config = PipelineConfig {
            tokenizer: TokenizerConfig::Whitespace { truncation: 0 },
            ..PipelineConfig::default()
        };
        assert_config_validation_error!(config.validate(), "truncation");
    }

    #[test]
    fn test_load_validates_after_parsing() {
        let yaml_content = r#"
max_token_length: 0
        "#;
        let temp_file = create_temp_config_file(yaml_content);
        assert_config_validation_error!(
            load_pipeline_config(temp_file.path()),
            "max_token_length"
        );
    }

    #[test]
    fn test_fingerprint_is_content_stable() {
        let a = PipelineConfig::default();
        let b = PipelineConfig::default();
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());

        let c = PipelineConfig {
            seed: 1,
            ..PipelineConfig::default()
        };
        assert_ne!(a.fingerprint().unwrap(), c.fingerprint().unwrap());
    }
}
