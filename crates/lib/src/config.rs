//! # Configuration Store
//!
//! Holds the retrieval and generation parameters the user tunes on the home
//! screen. Every field always holds a valid value: edits that fall outside
//! the declared range are rejected and the previous value is kept.

use crate::errors::ConfigError;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_CHUNK_SIZE: u32 = 500;
pub const MIN_CHUNK_SIZE: u32 = 50;
pub const MAX_CHUNK_SIZE: u32 = 2000;

pub const DEFAULT_RETRIEVAL_DEPTH: u32 = 5;
pub const MIN_RETRIEVAL_DEPTH: u32 = 1;
pub const MAX_RETRIEVAL_DEPTH: u32 = 20;

/// The generation models offered by the service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LlmModel {
    #[default]
    TinyLlama,
    Llama2,
    Mistral,
}

impl LlmModel {
    pub const ALL: [LlmModel; 3] = [LlmModel::TinyLlama, LlmModel::Llama2, LlmModel::Mistral];

    /// The identifier sent to the service as `llm_model`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmModel::TinyLlama => "tinyllama",
            LlmModel::Llama2 => "llama2",
            LlmModel::Mistral => "mistral",
        }
    }

    /// Human-readable name for menus.
    pub fn label(&self) -> &'static str {
        match self {
            LlmModel::TinyLlama => "TinyLlama",
            LlmModel::Llama2 => "Llama 2",
            LlmModel::Mistral => "Mistral",
        }
    }

    pub fn next(self) -> Self {
        let i = self.position();
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let i = self.position();
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|m| *m == self).unwrap_or(0)
    }
}

impl fmt::Display for LlmModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmModel {
    type Err = ConfigError;

    /// Accepts either the wire identifier or the display label, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(wanted) || m.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownModel(wanted.to_string()))
    }
}

/// A snapshot of the tunable parameters, handed off by value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Configuration {
    pub chunk_size: u32,
    pub model: LlmModel,
    pub retrieval_depth: u32,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            model: LlmModel::default(),
            retrieval_depth: DEFAULT_RETRIEVAL_DEPTH,
        }
    }
}

/// Names the editable fields of a [`Configuration`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigField {
    ChunkSize,
    Model,
    RetrievalDepth,
}

impl ConfigField {
    pub const ALL: [ConfigField; 3] = [
        ConfigField::ChunkSize,
        ConfigField::Model,
        ConfigField::RetrievalDepth,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ConfigField::ChunkSize => "chunk size",
            ConfigField::Model => "model",
            ConfigField::RetrievalDepth => "number of nearest chunks",
        }
    }
}

/// The mutable holder behind the configuration screen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigStore {
    current: Configuration,
}

impl From<Configuration> for ConfigStore {
    fn from(current: Configuration) -> Self {
        Self { current }
    }
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and stores textual input for `field`.
    pub fn set_field(&mut self, field: ConfigField, input: &str) -> Result<(), ConfigError> {
        match field {
            ConfigField::ChunkSize => {
                let value = parse_number(field, input)?;
                self.set_chunk_size_checked(value)
            }
            ConfigField::Model => {
                self.current.model = input.parse()?;
                Ok(())
            }
            ConfigField::RetrievalDepth => {
                let value = parse_number(field, input)?;
                self.set_retrieval_depth_checked(value)
            }
        }
    }

    pub fn set_chunk_size(&mut self, value: u32) -> Result<(), ConfigError> {
        self.set_chunk_size_checked(i64::from(value))
    }

    pub fn set_model(&mut self, model: LlmModel) {
        self.current.model = model;
    }

    pub fn set_retrieval_depth(&mut self, value: u32) -> Result<(), ConfigError> {
        self.set_retrieval_depth_checked(i64::from(value))
    }

    fn set_chunk_size_checked(&mut self, value: i64) -> Result<(), ConfigError> {
        self.current.chunk_size =
            check_range(ConfigField::ChunkSize, value, MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)?;
        Ok(())
    }

    fn set_retrieval_depth_checked(&mut self, value: i64) -> Result<(), ConfigError> {
        self.current.retrieval_depth = check_range(
            ConfigField::RetrievalDepth,
            value,
            MIN_RETRIEVAL_DEPTH,
            MAX_RETRIEVAL_DEPTH,
        )?;
        Ok(())
    }

    /// Returns the current value of `field` as it would be shown in an input.
    pub fn field_text(&self, field: ConfigField) -> String {
        match field {
            ConfigField::ChunkSize => self.current.chunk_size.to_string(),
            ConfigField::Model => self.current.model.label().to_string(),
            ConfigField::RetrievalDepth => self.current.retrieval_depth.to_string(),
        }
    }

    pub fn is_default_chunk_size(&self) -> bool {
        self.current.chunk_size == DEFAULT_CHUNK_SIZE
    }

    /// The snapshot used for navigation handoff and re-chunk requests.
    pub fn to_payload(&self) -> Configuration {
        self.current
    }
}

fn parse_number(field: ConfigField, input: &str) -> Result<i64, ConfigError> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| ConfigError::InvalidNumber {
            field: field.name(),
            input: input.to_string(),
        })
}

fn check_range(field: ConfigField, value: i64, min: u32, max: u32) -> Result<u32, ConfigError> {
    u32::try_from(value)
        .ok()
        .filter(|v| (min..=max).contains(v))
        .ok_or(ConfigError::OutOfRange {
            field: field.name(),
            value,
            min,
            max,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let store = ConfigStore::new();
        assert_eq!(
            store.to_payload(),
            Configuration {
                chunk_size: 500,
                model: LlmModel::TinyLlama,
                retrieval_depth: 5,
            }
        );
        assert!(store.is_default_chunk_size());
    }

    #[test]
    fn test_set_then_read_keeps_every_valid_value() {
        let mut store = ConfigStore::new();
        for size in [MIN_CHUNK_SIZE, 777, MAX_CHUNK_SIZE] {
            for depth in [MIN_RETRIEVAL_DEPTH, 11, MAX_RETRIEVAL_DEPTH] {
                for model in LlmModel::ALL {
                    store.set_chunk_size(size).unwrap();
                    store.set_retrieval_depth(depth).unwrap();
                    store.set_model(model);
                    let payload = store.to_payload();
                    assert_eq!(payload.chunk_size, size);
                    assert_eq!(payload.retrieval_depth, depth);
                    assert_eq!(payload.model, model);
                }
            }
        }
    }

    #[test]
    fn test_out_of_range_is_rejected_and_previous_value_kept() {
        let mut store = ConfigStore::new();
        store.set_field(ConfigField::ChunkSize, "800").unwrap();

        let err = store.set_field(ConfigField::ChunkSize, "49").unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { min: 50, max: 2000, .. }));
        assert_eq!(store.to_payload().chunk_size, 800);

        let err = store.set_field(ConfigField::RetrievalDepth, "21").unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { value: 21, .. }));
        assert_eq!(store.to_payload().retrieval_depth, 5);

        assert!(store.set_field(ConfigField::RetrievalDepth, "-3").is_err());
        assert_eq!(store.to_payload().retrieval_depth, 5);
    }

    #[test]
    fn test_values_past_u32_are_out_of_range() {
        let mut store = ConfigStore::new();
        // Would wrap to 50 if narrowed blindly.
        let err = store.set_field(ConfigField::ChunkSize, "4294967346").unwrap_err();
        assert_eq!(
            err,
            ConfigError::OutOfRange {
                field: "chunk size",
                value: 4_294_967_346,
                min: 50,
                max: 2000,
            }
        );
        assert_eq!(store.to_payload().chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_non_numeric_input_is_rejected() {
        let mut store = ConfigStore::new();
        let err = store.set_field(ConfigField::ChunkSize, "abc").unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                field: "chunk size",
                input: "abc".to_string()
            }
        );
        assert_eq!(store.to_payload().chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_model_accepts_id_or_label() {
        let mut store = ConfigStore::new();
        store.set_field(ConfigField::Model, "Llama 2").unwrap();
        assert_eq!(store.to_payload().model, LlmModel::Llama2);
        store.set_field(ConfigField::Model, "MISTRAL").unwrap();
        assert_eq!(store.to_payload().model, LlmModel::Mistral);
        assert_eq!(
            store.set_field(ConfigField::Model, "gpt-9"),
            Err(ConfigError::UnknownModel("gpt-9".to_string()))
        );
        assert_eq!(store.to_payload().model, LlmModel::Mistral);
    }

    #[test]
    fn test_model_cycling_wraps() {
        assert_eq!(LlmModel::Mistral.next(), LlmModel::TinyLlama);
        assert_eq!(LlmModel::TinyLlama.previous(), LlmModel::Mistral);
        assert_eq!(LlmModel::TinyLlama.next(), LlmModel::Llama2);
    }
}
