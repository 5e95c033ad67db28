pub mod error;
pub mod gemini;
pub mod openai;
pub mod traits;
pub mod util;

pub use error::{AiError, Result};
pub use gemini::Gemini;
pub use openai::OpenAi;
pub use traits::{CompletionModel, Message, MessageRole};
pub use util::{strip_code_fence, truncate_to_char_boundary};
