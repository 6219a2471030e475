mod core;

pub use self::core::{
    BoxedChatCompletion, ChatCompletion, CompletionError, CompletionParams, Message, OpenAiClient,
    Role, completion,
};
