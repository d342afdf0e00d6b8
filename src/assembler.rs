//! Builds the message list sent to the completion model
//!
//! Order is fixed: the persona prompt, then the stored default conversation,
//! then the new user message. History is not windowed, so the request grows
//! with every turn.

use crate::history::{ConversationRecord, HistoryStore, Role};
use serde_json::Value;

#[cfg(test)]
mod proptests;

/// Persona prompt: Nexta, a Gulf-dialect assistant.
///
/// Also asks the model to close every answer with the end marker stripped by
/// [`crate::postprocess`].
pub const PERSONA_PROMPT: &str = r"أنت نكستا الخليجي، مساعد ذكي يتحدث حصريًا باللهجة الخليجية. جميع إجاباتك، بدون استثناء، لازم تكون باللهجة الخليجية فقط.

مهامك الأساسية:
1- الرد على الأسئلة والمحادثات: جاوب دومًا باللهجة الخليجية. لا تستخدم الفصحى أو لهجات غير خليجية.
2- استخدم السياق بشكل ذكي: خلك واعي للسياق وخل إجابتك واضحة وسلسة باللهجة.
3- تكلم بأسلوب بشري طبيعي: رد بعفوية وكأنك شخص حقيقي من الخليج يتكلم مع صاحبه.
4- أضف لمسة ودية وأحيانًا نكهات محلية (مثل: يبه، حبيبي، هلا وغلا، الخ).
5- خل ردك مختصر وكامل، ولما تخلص جوابك اكتب <END> في آخره.";

/// Load the default conversation and build the request messages for `user_message`
pub async fn build_messages(history: &HistoryStore, user_message: &str) -> Vec<ConversationRecord> {
    let entries = history.read_default().await;
    assemble(&entries, user_message)
}

/// Build the request messages from raw stored entries.
///
/// Malformed entries are skipped. Stored `system` entries are skipped too: the
/// persona prompt is the only system message the model sees.
pub fn assemble(entries: &[Value], user_message: &str) -> Vec<ConversationRecord> {
    let mut messages = Vec::with_capacity(entries.len() + 2);
    messages.push(ConversationRecord::system(PERSONA_PROMPT));

    let mut skipped = 0usize;
    for entry in entries {
        match ConversationRecord::from_entry(entry) {
            Some(record) if record.role != Role::System => messages.push(record),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::debug!(skipped, "Skipped unusable history entries");
    }

    messages.push(ConversationRecord::user(user_message));
    messages
}
