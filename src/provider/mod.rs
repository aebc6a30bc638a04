pub mod inference;
#[cfg(test)]
pub mod testing;

pub use inference::{
    ChatModel, ChatRequestSpec, InferenceClient, RequestInspector, ResponseFormat,
};
