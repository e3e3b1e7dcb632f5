pub mod prompt_log;

pub use prompt_log::PromptLogConfig;
