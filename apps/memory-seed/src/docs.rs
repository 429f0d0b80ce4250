//! Sample legal documents seeded into the memory collection.
//!
//! A small cross-section of famous trials: evidence snippets, a rule of
//! evidence and a transcript excerpt, each tagged with its case and source.

use domain_memory::Document;
use serde_json::json;

pub fn sample_documents() -> Vec<Document> {
    [
        (
            1u64,
            "The defendant's strategy to eliminate Netscape as a competitor violated antitrust law.",
            "EVIDENCE",
            "msft",
            "GX-20 (Internal Memo)",
        ),
        (
            2,
            "The meeting was characterized as a 'visit from the Godfather' by internal communications.",
            "EVIDENCE",
            "msft",
            "GX-33 (Meeting Minutes)",
        ),
        (
            3,
            "Browser integration was intended as a feature, not a platform control mechanism.",
            "EVIDENCE",
            "msft",
            "GX-41 (Strategy Doc)",
        ),
        (
            4,
            "Mark-to-market accounting was fully disclosed and approved by Arthur Andersen.",
            "EVIDENCE",
            "enron",
            "SEC Filing 2000",
        ),
        (
            5,
            "Raptor hedging vehicles were presented as standard risk management tools.",
            "EVIDENCE",
            "enron",
            "EX-22 (Board Minutes)",
        ),
        (
            6,
            "Rule 802: Hearsay is not admissible unless it falls under an exception.",
            "RULE",
            "general",
            "Federal Rules of Evidence",
        ),
        (
            7,
            "The leather glove had shrunk due to moisture exposure during evidence collection.",
            "EVIDENCE",
            "oj",
            "Forensic Report (Dr. Lee)",
        ),
        (
            8,
            "Sample 42 was left in the van overnight, compromising chain of custody.",
            "EVIDENCE",
            "oj",
            "Lab Log (Sample 42)",
        ),
        (
            9,
            "Dr. Padian testified that 'abrupt appearance' in the fossil record is a geological term spanning millions of years.",
            "TRANSCRIPT",
            "kitzmiller",
            "Trial Transcript (Day 6)",
        ),
        (
            10,
            "Of Pandas and People is a creationist text with intelligent design terminology.",
            "EVIDENCE",
            "kitzmiller",
            "Expert Report (Forrest)",
        ),
    ]
    .into_iter()
    .map(|(id, text, doc_type, case_id, source)| {
        // The text rides along in the payload so search results are readable
        // without a second lookup.
        Document::new(id, text).with_payload(json!({
            "text": text,
            "doc_type": doc_type,
            "case_id": case_id,
            "source": source,
        }))
    })
    .collect()
}
