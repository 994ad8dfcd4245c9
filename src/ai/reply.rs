//! Reply parsing: splits a raw chat reply into caption lines and the
//! trailing emotion token.
//!
//! The last non-blank line, trimmed, must equal one of the catalog tokens
//! exactly. Everything before it is the caption body, kept verbatim.

use super::emotion::EmotionLabel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    /// Caption lines in order, untrimmed.
    pub body: Vec<String>,
    pub emotion: EmotionLabel,
}

impl ParsedResponse {
    /// Caption text as displayed: every body line terminated by `\n`.
    pub fn caption_text(&self) -> String {
        self.body.iter().fold(String::new(), |mut acc, line| {
            acc.push_str(line);
            acc.push('\n');
            acc
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedReply {
    #[error("malformed reply: empty")]
    Empty { raw: String },
    #[error("malformed reply: unrecognized emotion token")]
    UnrecognizedEmotion { raw: String },
}

impl MalformedReply {
    pub fn reason(&self) -> &'static str {
        match self {
            MalformedReply::Empty { .. } => "empty",
            MalformedReply::UnrecognizedEmotion { .. } => "unrecognized emotion token",
        }
    }

    /// The offending reply text, if the model sent anything at all.
    pub fn raw(&self) -> Option<&str> {
        let raw = match self {
            MalformedReply::Empty { raw } | MalformedReply::UnrecognizedEmotion { raw } => raw,
        };
        (!raw.is_empty()).then_some(raw.as_str())
    }
}

/// Parse a raw chat reply.
pub fn parse_reply(raw: &str) -> Result<ParsedResponse, MalformedReply> {
    let lines: Vec<&str> = raw.lines().collect();

    // Blank trailing lines are tolerated; the token is the last real line.
    let token_idx = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .ok_or_else(|| MalformedReply::Empty {
            raw: raw.to_string(),
        })?;

    let candidate = lines[token_idx].trim();
    let emotion =
        EmotionLabel::from_token(candidate).ok_or_else(|| MalformedReply::UnrecognizedEmotion {
            raw: raw.to_string(),
        })?;

    let body = lines[..token_idx].iter().map(|l| l.to_string()).collect();
    Ok(ParsedResponse { body, emotion })
}
