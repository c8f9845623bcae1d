//! Context assembly from the final ranked passages
//!
//! Groups passages into thematic sections and renders the prompt-context
//! document the answer generator consumes. Section labels and entry
//! numbering are part of that contract.

use super::ScoredChunk;
use crate::models::SectionKind;
use crate::models::SourceAttribution;

/// Assembler for the structured context document and its parallel
/// source-attribution list. Pure and total: empty input yields an empty
/// context and an empty attribution list.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContextAssembler;

struct Section {
    kind: SectionKind,
    header: &'static str,
    entry_label: &'static str,
}

const SECTIONS: [Section; 5] = [
    Section {
        kind: SectionKind::Incident,
        header: "PERSONAL INCIDENTS AND INTERACTIONS WITH DEVOTEES:",
        entry_label: "INCIDENT",
    },
    Section {
        kind: SectionKind::Teaching,
        header: "DIRECT TEACHINGS AND DIALOGUES:",
        entry_label: "TEACHING",
    },
    Section {
        kind: SectionKind::Philosophy,
        header: "PHILOSOPHICAL FOUNDATIONS:",
        entry_label: "PHILOSOPHY",
    },
    Section {
        kind: SectionKind::Practice,
        header: "PRACTICAL METHODS AND GUIDANCE:",
        entry_label: "METHOD",
    },
    Section {
        kind: SectionKind::Other,
        header: "ADDITIONAL RELEVANT TEACHINGS:",
        entry_label: "TEACHING",
    },
];

/// Classify a passage into its thematic section. Mutually exclusive, fixed
/// priority order: narrative content wins over category.
fn classify(chunk: &ScoredChunk) -> SectionKind {
    if chunk.has_incident {
        return SectionKind::Incident;
    }
    match chunk.chunk.category.as_str() {
        "teaching" | "dialogue" => SectionKind::Teaching,
        "philosophy" | "doctrine" => SectionKind::Philosophy,
        "practice" | "method" => SectionKind::Practice,
        _ => SectionKind::Other,
    }
}

impl ContextAssembler {
    /// Render the ranked passages into a sectioned context document plus one
    /// attribution record per passage, in render order.
    #[must_use]
    pub fn assemble(&self, ranked: &[ScoredChunk]) -> (String, Vec<SourceAttribution>) {
        let mut attribution = Vec::with_capacity(ranked.len());
        let mut rendered_sections = Vec::new();

        for section in &SECTIONS {
            let members: Vec<&ScoredChunk> = ranked
                .iter()
                .filter(|chunk| classify(chunk) == section.kind)
                .collect();
            if members.is_empty() {
                continue;
            }

            let mut body = Vec::with_capacity(members.len());
            for (idx, scored) in members.iter().enumerate() {
                attribution.push(SourceAttribution {
                    source: scored.chunk.source.clone(),
                    category: scored.chunk.category.clone(),
                    importance: scored.chunk.importance,
                    tags: scored.chunk.tags.clone(),
                    word_count: scored.chunk.word_count,
                    section: section.kind,
                });
                body.push(format!(
                    "{} {} (from {}):\n{}",
                    section.entry_label,
                    idx + 1,
                    scored.chunk.source,
                    scored.chunk.content
                ));
            }
            rendered_sections.push(format!("{}\n{}", section.header, body.join("\n\n")));
        }

        (rendered_sections.join("\n\n"), attribution)
    }
}
