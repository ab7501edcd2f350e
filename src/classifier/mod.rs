pub mod ai;
pub mod rules;

pub use ai::{AiClassification, ClassificationOutcome, ImageClassifier, OpenAiClassifier};
pub use rules::{Classification, RuleTable};
