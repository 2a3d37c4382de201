//! AI adapter module. Implements CompletionPort for LLM integration.
//!
//! Provides the OpenAI-compatible adapter, a mock adapter for testing, and the
//! event-stream and payload decoding shared by both.

pub mod mock_adapter;
pub mod openai_adapter;
pub mod payload;
pub mod stream_decoder;

pub use mock_adapter::{DEMO_STRATEGY, MockCompletionAdapter, encode_event_stream};
pub use openai_adapter::OpenAiAdapter;
pub use payload::{extract_json_payload, parse_strategy_payload};
pub use stream_decoder::{StreamDecoder, decode_stream};
