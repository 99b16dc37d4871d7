//! Chat skill response envelopes
//!
//! The calling chat platform expects every skill response as a versioned
//! envelope of typed output blocks. Answers are rendered as a `simpleText`
//! block followed by a `listCard` of follow-up questions; the immediate
//! acknowledgment instead asks the platform to wait for the callback.

use serde::{Deserialize, Serialize};

pub const SKILL_RESPONSE_VERSION: &str = "2.0";

/// Header shown above the follow-up question list
pub const FOLLOW_UP_HEADER: &str = "이런 점도 궁금하신가요? 🤖";

/// Text shown while the answer is produced in the background
pub const ACK_MESSAGE: &str =
    "네, 질문을 확인했어요. AI가 답변을 열심히 준비하고 있으니 잠시만 기다려주세요! 🤖";

pub const INVALID_REQUEST_MESSAGE: &str = "잘못된 요청입니다.";

pub const SUBMIT_FAILED_MESSAGE: &str = "시스템 오류로 작업을 시작하지 못했어요. 다시 시도해주세요.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub version: String,
    pub template: Template,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub outputs: Vec<Output>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Output {
    SimpleText { text: String },
    ListCard {
        header: ListCardHeader,
        items: Vec<ListItem>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListCardHeader {
    pub title: String,
}

/// A selectable list entry; choosing it sends `message_text` back as the next utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub title: String,
    pub action: String,
    pub message_text: String,
}

impl ListItem {
    fn message(question: &str) -> Self {
        Self {
            title: question.to_string(),
            action: "message".to_string(),
            message_text: question.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckEnvelope {
    pub version: String,
    pub use_callback: bool,
    pub data: AckData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AckData {
    pub text: String,
}

/// Render an answer and its follow-up questions into the two-block envelope.
///
/// The list block always carries one item per question, zero included.
pub fn format_answer<S: AsRef<str>>(main_text: &str, questions: &[S]) -> ResponseEnvelope {
    ResponseEnvelope {
        version: SKILL_RESPONSE_VERSION.to_string(),
        template: Template {
            outputs: vec![
                Output::SimpleText {
                    text: main_text.to_string(),
                },
                Output::ListCard {
                    header: ListCardHeader {
                        title: FOLLOW_UP_HEADER.to_string(),
                    },
                    items: questions.iter().map(|q| ListItem::message(q.as_ref())).collect(),
                },
            ],
        },
    }
}

/// Polite error envelope: the message with an empty follow-up list
pub fn format_error(message: &str) -> ResponseEnvelope {
    format_answer::<&str>(message, &[])
}

pub fn format_ack() -> AckEnvelope {
    AckEnvelope {
        version: SKILL_RESPONSE_VERSION.to_string(),
        use_callback: true,
        data: AckData {
            text: ACK_MESSAGE.to_string(),
        },
    }
}
