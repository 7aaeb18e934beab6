//! Human-readable relation rendering for diagnostics

use tlink_domain::{DebugReporter, Document, Entity, Relation};

/// Default [`DebugReporter`]
///
/// Time-time links render as
/// `Time-Time BEFORE\tt1: 2020-01-01 (today)\tt2: 2020-01-02 (tomorrow)`.
/// Everything else renders as `BEFORE(said[ei1],close[ei2])`. When both
/// endpoints are events carrying attributes, a second line lists
/// `id[tense-aspect-class]` for each. The containing sentences follow when
/// the document knows them. Identifiers with no matching entity render bare.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainReporter;

impl DebugReporter for PlainReporter {
    fn describe(&self, relation: &Relation, document: &dyn Document) -> String {
        let e1 = document.entity(&relation.id1);
        let e2 = document.entity(&relation.id2);

        if let (Some(t1), Some(t2)) = (e1, e2) {
            if t1.is_timex() && t2.is_timex() {
                return format!(
                    "Time-Time {}\t{}\t{}",
                    relation.kind,
                    timex_label(t1),
                    timex_label(t2)
                );
            }
        }

        let mut out = format!(
            "{}({}[{}],{}[{}])",
            relation.kind,
            e1.map_or(relation.id1.as_str(), |e| e.text.as_str()),
            relation.id1,
            e2.map_or(relation.id2.as_str(), |e| e.text.as_str()),
            relation.id2,
        );

        let attributes = (
            e1.and_then(|e| e.attributes.as_ref()),
            e2.and_then(|e| e.attributes.as_ref()),
        );
        if let (Some(a1), Some(a2)) = attributes {
            out.push_str(&format!(
                "\n{}[{}-{}-{}], {}[{}-{}-{}]",
                relation.id1, a1.tense, a1.aspect, a1.class, relation.id2, a2.tense, a2.aspect, a2.class
            ));
        }

        for entity in [e1, e2].into_iter().flatten() {
            if let Some(text) = entity.sentence.and_then(|idx| document.sentence(idx)) {
                out.push('\n');
                out.push_str(text);
            }
        }

        out
    }
}

fn timex_label(timex: &Entity) -> String {
    format!(
        "{}: {} ({})",
        timex.id,
        timex.value.as_deref().unwrap_or(""),
        timex.text
    )
}
