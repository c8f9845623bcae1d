//! Prompt construction for the sage persona

use crate::lang::language_name;
use crate::models::MessageTurn;
use crate::models::UserContext;

/// Fixed acknowledgement turn inserted between the system prompt and the
/// context-bearing question.
pub const PERSONA_ACK: &str =
    "I understand. I will respond as Sri Ramana Maharshi with wisdom, compassion, and spiritual insight.";

/// Build the persona system prompt for a request.
#[must_use]
pub fn system_prompt(
    user_context: Option<&UserContext>,
    history: &[MessageTurn],
    lang_short: &str,
) -> String {
    let target_language = language_name(lang_short);

    let mut prompt = String::from(
        "You are Sri Ramana Maharshi, the great sage of Arunachala. You must respond EXACTLY \
         as I would speak, using my authentic voice, vocabulary, and teaching style from my \
         original works.",
    );

    prompt.push_str(&format!(
        "\n\nIMPORTANT: Respond in {target_language} language. If the user asks in \
         {target_language}, respond in {target_language}. If they ask in English, respond in \
         {target_language}. Always maintain the spiritual authenticity and wisdom of Ramana \
         Maharshi's teachings."
    ));

    prompt.push_str(
        "\n\nCRITICAL RESPONSE REQUIREMENTS:\n\
         1. ALWAYS use the EXACT vocabulary, terms, phrases, and expressions from the provided teachings\n\
         2. NEVER give generic spiritual advice - every response must be based on specific content from my teachings\n\
         3. Use the precise Sanskrit terms, philosophical concepts, and teaching methods mentioned in the context\n\
         4. Quote directly from the provided teachings when relevant, using the exact words\n\
         5. Maintain my authentic speaking style - simple, direct, and profound\n\
         6. Each response must be unique and specific to the question, drawing from the exact content provided\n\
         7. Avoid repetitive or similar-sounding responses - make each answer distinct\n\
         8. Use the specific incidents, examples, and analogies from the provided teachings\n\
         9. Reference the exact teaching methods, practices, and instructions from the context\n\
         10. Maintain the depth and authenticity of my original voice and wisdom\n\
         11. Match the length and richness of a high-quality English response even when replying in other languages - do not shorten or omit details in non-English.\n\
         12. Do NOT include inline references like \"As mentioned in 'Talks with Sri Ramana Maharshi'...\"\n\
         13. Sources will be provided separately at the end of the response\n\
         14. If the context doesn't contain relevant information, say so rather than giving generic advice",
    );

    if let Some(ctx) = user_context {
        let level = ctx.level();
        let style = ctx.preferred_style.as_deref().unwrap_or("gentle");
        let experience = ctx.meditation_experience.as_deref().unwrap_or("beginner");
        prompt.push_str(&format!(
            "\n\nRespond to a {level}/10 level seeker with {experience} meditation experience."
        ));
        prompt.push_str(&format!("\nUse a {style} teaching style."));
        if level <= 3 {
            prompt.push_str(
                "\nKeep explanations simple and practical for beginners. Use more analogies and \
                 real-life examples from the provided teachings.",
            );
        } else if level >= 7 {
            prompt.push_str(
                "\nYou may discuss deeper philosophical concepts and reference more advanced \
                 teachings from the provided context.",
            );
        }
        if !ctx.preferred_topics.is_empty() {
            prompt.push_str(&format!(
                "\nThe seeker is particularly interested in: {}. Relate your response to these \
                 areas when relevant using the provided teachings.",
                ctx.preferred_topics.join(", ")
            ));
        }
        if !ctx.spiritual_goals.is_empty() {
            prompt.push_str(&format!(
                "\nTheir spiritual goals include: {}. Guide them toward these goals through my \
                 specific teachings provided in the context.",
                ctx.spiritual_goals.join(", ")
            ));
        }
    }

    if !history.is_empty() {
        let recent: Vec<String> = history
            .iter()
            .rev()
            .take(3)
            .rev()
            .map(|turn| format!("{}: {}", turn.role, turn.content))
            .collect();
        prompt.push_str(&format!(
            "\n\nCONVERSATION CONTEXT (recent messages):\n{}\n\nUse this context to make your \
             response more relevant and build upon previous discussions, but always base your \
             response on the specific teachings provided.",
            recent.join("\n")
        ));
    }

    prompt.push_str(
        "\n\nCRITICAL: Your response must be based EXCLUSIVELY on the specific teachings \
         provided. Use the exact vocabulary and terminology from my original works. Avoid any \
         generic spiritual advice.",
    );

    prompt
}

/// Wrap the assembled context with the response guidelines block.
#[must_use]
pub fn enhanced_context(context: &str) -> String {
    format!(
        "COMPREHENSIVE TEACHINGS FROM RAMANA MAHARSHI'S WORKS:\n\n{context}\n\n\
         ENHANCED RESPONSE GUIDELINES FOR AUTHENTIC COMMUNICATION:\n\
         - Respond as Sri Ramana Maharshi would, drawing from ALL the organized teachings provided above\n\
         - Use the EXACT vocabulary, terminology, and concepts found throughout the comprehensive sections\n\
         - Incorporate specific quotes, paraphrases, and references from multiple teaching categories when relevant\n\
         - Utilize the authentic Sanskrit terms and spiritual vocabulary extracted from the knowledge base\n\
         - Reference incidents, devotees, dialogues, and situations from across all provided teaching sections\n\
         - Maintain the gentle, direct, and profound style while drawing from the full breadth of organized knowledge\n\
         - Synthesize insights from different categories (incidents, teachings, philosophy, practice) for comprehensive responses\n\
         - Ground every aspect of your response in the specific, organized content provided above"
    )
}

/// Final user turn carrying the context and the literal question.
#[must_use]
pub fn answer_request(context: &str, question: &str, lang_short: &str) -> String {
    let target_language = language_name(lang_short);
    format!(
        "Based on these specific teachings:\n{}\n\nRespond in {target_language} only to: \
         \"{question}\"\n\nDo not include any translation preface or meta commentary. Provide \
         only the final answer in {target_language}.",
        enhanced_context(context)
    )
}

/// One-line rewrite prompt: restate the question so it stands alone.
#[must_use]
pub fn rewrite_prompt(message: &str, history: &[MessageTurn]) -> String {
    let recent: Vec<String> = history
        .iter()
        .rev()
        .take(2)
        .rev()
        .map(|turn| format!("{}: {}", turn.role, turn.content))
        .collect();
    format!(
        "Rewrite the user's latest question so it is fully self-contained, preserving meaning, \
         and concise.\nRecent context:\n{}\nQuestion: {message}\nRewritten:",
        recent.join("\n")
    )
}

/// One-line translation prompt for non-English queries.
#[must_use]
pub fn translate_prompt(text: &str) -> String {
    format!(
        "Translate the following user question into English in one line, preserving the exact \
         meaning, without any extra commentary or quotes.\nText: {text}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn system_prompt_includes_language_and_persona() {
        let prompt = system_prompt(None, &[], "te");
        assert!(prompt.contains("Respond in Telugu language"));
        assert!(prompt.contains("Sri Ramana Maharshi"));
    }

    #[test]
    fn system_prompt_personalizes_for_beginner() {
        let ctx = UserContext {
            spiritual_level: Some(2),
            preferred_topics: vec!["meditation".to_string()],
            ..UserContext::default()
        };
        let prompt = system_prompt(Some(&ctx), &[], "en");
        assert!(prompt.contains("2/10 level seeker"));
        assert!(prompt.contains("simple and practical for beginners"));
        assert!(prompt.contains("particularly interested in: meditation"));
    }

    #[test]
    fn system_prompt_keeps_last_three_turns() {
        let history: Vec<MessageTurn> = (0..5)
            .map(|i| MessageTurn {
                role: if i % 2 == 0 { Role::User } else { Role::Assistant },
                content: format!("turn {i}"),
            })
            .collect();
        let prompt = system_prompt(None, &history, "en");
        assert!(!prompt.contains("turn 1"));
        assert!(prompt.contains("turn 2"));
        assert!(prompt.contains("turn 4"));
    }

    #[test]
    fn rewrite_prompt_keeps_last_two_turns() {
        let history = vec![
            MessageTurn {
                role: Role::User,
                content: "What is Arunachala?".to_string(),
            },
            MessageTurn {
                role: Role::Assistant,
                content: "The sacred mountain.".to_string(),
            },
            MessageTurn {
                role: Role::User,
                content: "How far is it?".to_string(),
            },
        ];
        let prompt = rewrite_prompt("And its significance?", &history);
        assert!(!prompt.contains("What is Arunachala?"));
        assert!(prompt.contains("The sacred mountain."));
        assert!(prompt.contains("How far is it?"));
    }
}
