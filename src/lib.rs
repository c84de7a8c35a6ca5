//! @ai:module:intent Qualia Probe library: batched LLM conversation runner
//! @ai:module:layer application
//! @ai:module:public_api config, questions, plan, provider, dispatcher, recorder, combiner

pub mod combiner;
pub mod config;
pub mod dispatcher;
pub mod plan;
pub mod provider;
pub mod questions;
pub mod recorder;

pub use combiner::{combine_shards, shard_paths};
pub use config::{ApiConfig, ProbeConfig, Provider, RunConfig};
pub use dispatcher::BatchDispatcher;
pub use plan::{build_plan, ConversationUnit};
pub use provider::{
    AnthropicClient, GeminiClient, MockProviderClient, OpenAiClient, Outcome, OutcomeStatus,
    ProviderClient,
};
pub use questions::{load_questions, Question};
pub use recorder::{read_records, write_records, ResultRecord};
