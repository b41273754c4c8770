pub mod gemini_candidate;
pub mod gemini_content;
pub mod gemini_error;
pub mod gemini_finish_reason;
pub mod gemini_inline_data;
pub mod gemini_part;
pub mod gemini_request;
pub mod gemini_response;
pub mod gemini_usage;

pub use gemini_candidate::GeminiCandidate;
pub use gemini_content::GeminiContent;
pub use gemini_error::GeminiErrorResponse;
pub use gemini_finish_reason::GeminiFinishReason;
pub use gemini_inline_data::GeminiInlineData;
pub use gemini_part::GeminiPart;
pub use gemini_request::GeminiRequest;
pub use gemini_response::GeminiResponse;
pub use gemini_usage::GeminiUsage;
