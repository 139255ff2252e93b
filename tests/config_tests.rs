use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use SentimentSieve::config::pipeline::*;
use SentimentSieve::error::PipelineError;

// Helper to create a temporary config file with given content
fn create_temp_config_file(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(temp_file, "{}", content).expect("Failed to write to temp file");
    temp_file
}

#[test]
fn test_load_full_config() {
    let yaml_content = r#"
input:
  path: data/tweets.csv
  delimiter: ";"
  text_column: tweet
  sentiment_column: label
  date_column: created_at
seed: 7
data_test_size: 0.25
validation_fraction: 0.15
min_text_length: 3
max_token_length: 64
tokenizer:
  type: Whitespace
  truncation: 128
unknown_label_policy: drop
report_path: out/report.txt
show_progress: false
"#;
    let temp_file = create_temp_config_file(yaml_content);
    let config = load_pipeline_config(temp_file.path()).expect("Should load valid config");

    assert_eq!(config.input.path, PathBuf::from("data/tweets.csv"));
    assert_eq!(config.input.delimiter, ';');
    assert_eq!(config.input.text_column, "tweet");
    assert_eq!(config.input.sentiment_column, "label");
    assert_eq!(config.input.date_column, "created_at");
    assert_eq!(config.seed, 7);
    assert_eq!(config.data_test_size, 0.25);
    assert_eq!(config.validation_fraction, 0.15);
    assert_eq!(config.min_text_length, 3);
    assert_eq!(config.max_token_length, 64);
    assert_eq!(config.tokenizer, TokenizerConfig::Whitespace { truncation: 128 });
    assert_eq!(config.unknown_label_policy, UnknownLabelPolicy::Drop);
    assert_eq!(config.report_path, PathBuf::from("out/report.txt"));
    assert!(!config.show_progress);
}

#[test]
fn test_partial_config_keeps_defaults() {
    let temp_file = create_temp_config_file("seed: 1\ninput:\n  path: other.csv\n");
    let config = load_pipeline_config(temp_file.path()).unwrap();
    let defaults = PipelineConfig::default();

    assert_eq!(config.seed, 1);
    assert_eq!(config.input.path, PathBuf::from("other.csv"));
    assert_eq!(config.input.text_column, "Text");
    assert_eq!(config.data_test_size, defaults.data_test_size);
    assert_eq!(config.tokenizer, defaults.tokenizer);
    assert_eq!(config.tokenizer.name(), "bert-base-uncased");
    assert_eq!(config.unknown_label_policy, UnknownLabelPolicy::Fail);
}

#[test]
fn test_out_of_range_fraction_is_a_validation_error() {
    let temp_file = create_temp_config_file("data_test_size: 1.5");
    match load_pipeline_config(temp_file.path()) {
        Err(PipelineError::ConfigValidationError(msg)) => {
            assert!(msg.contains("data_test_size"), "unexpected message: {}", msg)
        }
        other => panic!("Expected ConfigValidationError, got {:?}", other),
    }
}

#[test]
fn test_invalid_yaml_is_a_config_error() {
    let temp_file = create_temp_config_file("seed: [unclosed");
    assert!(matches!(
        load_pipeline_config(temp_file.path()),
        Err(PipelineError::ConfigError(_))
    ));

    let unknown_tokenizer = create_temp_config_file("tokenizer:\n  type: Sentencepiece\n");
    assert!(matches!(
        load_pipeline_config(unknown_tokenizer.path()),
        Err(PipelineError::ConfigError(_))
    ));
}

#[test]
fn test_missing_file_is_a_config_error() {
    let result = load_pipeline_config("definitely/not/here.yaml");
    match result {
        Err(PipelineError::ConfigError(msg)) => assert!(msg.contains("here.yaml")),
        other => panic!("Expected ConfigError, got {:?}", other),
    }
}

#[test]
fn test_fingerprint_tracks_content() {
    let a = PipelineConfig::default();
    let mut b = PipelineConfig::default();
    assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    b.seed = 43;
    assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
}

#[test]
fn test_sample_config_file_is_valid() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/pipeline_config.yaml");
    let config = load_pipeline_config(path).expect("Bundled sample config should load");
    assert_eq!(config, PipelineConfig::default());
}
