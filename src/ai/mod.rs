pub mod emotion;
pub mod prompts;
pub mod reply;

pub use emotion::{resolve, AssetId, EmotionLabel, UnknownEmotion};
pub use reply::{parse_reply, MalformedReply, ParsedResponse};
