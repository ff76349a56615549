mod openai_whisper;

pub use openai_whisper::OpenAiWhisperProvider;
