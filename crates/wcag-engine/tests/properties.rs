//! Property tests for validation, ordering, profiles and auto-fix
//!
//! Run with: cargo test -p wcag-engine --test properties

use std::collections::BTreeSet;

use chrono::{Duration, Utc};
use proptest::prelude::*;
use shared_types::{
    ContentHash, Criterion, Document, IssueSummary, Rgb, StructureNode, Tag, ValidationResult,
    WcagLevel,
};
use wcag_engine::{
    prioritize, validate, AutoFixEngine, EngineSettings, FixRequest,
    InMemoryProfileStore, NoopWriteBack, ProfileStore,
};

// ============================================================================
// Strategies
// ============================================================================

#[derive(Debug, Clone)]
enum Leaf {
    Text { tag: Tag, text: String, size: f64, grey: u8 },
    Figure { alt: Option<String> },
    Link { text: String },
    Table,
}

fn text_tag() -> impl Strategy<Value = Tag> {
    prop_oneof![
        Just(Tag::Paragraph),
        Just(Tag::Untagged),
        (1u8..=6).prop_map(Tag::Heading),
    ]
}

fn leaf() -> impl Strategy<Value = Leaf> {
    prop_oneof![
        4 => (text_tag(), "[A-Za-z ]{0,24}", 8.0f64..30.0, any::<u8>())
            .prop_map(|(tag, text, size, grey)| Leaf::Text { tag, text, size, grey }),
        2 => proptest::option::of(prop_oneof![
            Just("click here".to_string()),
            Just("image".to_string()),
            Just("Floor plan of the second storey".to_string()),
        ])
        .prop_map(|alt| Leaf::Figure { alt }),
        1 => prop_oneof![
            Just("here".to_string()),
            Just("Download the enrolment form".to_string()),
        ]
        .prop_map(|text| Leaf::Link { text }),
        1 => Just(Leaf::Table),
    ]
}

fn document() -> impl Strategy<Value = Document> {
    (
        1u32..=3,
        proptest::collection::vec((leaf(), 0u32..3), 0..12),
        proptest::option::of("[a-z_]{1,12}"),
        proptest::option::of(prop_oneof![Just("en"), Just("fr-CA"), Just("english!")]),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(page_count, leaves, title, language, tagged, named)| {
            let root_tag = if tagged { Tag::Document } else { Tag::Untagged };
            let mut root = StructureNode::new(0, root_tag);
            let mut next_id = 1;
            for (index, (leaf, page)) in leaves.into_iter().enumerate() {
                let page = page % page_count + 1;
                let y = 700.0 - 30.0 * index as f64;
                root.children
                    .push(build_leaf(leaf, &mut next_id, page, y));
            }

            let mut document = Document::new(root, page_count).tagged(tagged);
            if let Some(title) = title {
                document = document.with_title(&title);
            }
            if let Some(language) = language {
                document = document.with_language(language);
            }
            if named {
                document = document.with_file_name("weekly_status-update.pdf");
            }
            document
        })
}

fn build_leaf(leaf: Leaf, next_id: &mut u32, page: u32, y: f64) -> StructureNode {
    let mut id = || {
        let id = *next_id;
        *next_id += 1;
        id
    };
    match leaf {
        Leaf::Text { tag, text, size, grey } => StructureNode::new(id(), tag)
            .on_page(page)
            .with_bbox(72.0, y, 300.0, y + size)
            .with_text(&text)
            .with_font_size(size)
            .with_colors(Rgb(grey, grey, grey), Rgb::WHITE),
        Leaf::Figure { alt } => {
            let figure = StructureNode::new(id(), Tag::Figure).on_page(page);
            match alt {
                Some(alt) => figure.with_alt_text(&alt),
                None => figure,
            }
        }
        Leaf::Link { text } => StructureNode::new(id(), Tag::Link)
            .on_page(page)
            .with_text(&text),
        Leaf::Table => {
            let mut table = StructureNode::new(id(), Tag::Table).on_page(page);
            for _ in 0..2 {
                let mut row = StructureNode::new(id(), Tag::TableRow);
                for column in 0..3 {
                    row.children.push(
                        StructureNode::new(id(), Tag::TableDataCell)
                            .with_text(&format!("cell {}", column)),
                    );
                }
                table.children.push(row);
            }
            table
        }
    }
}

fn level() -> impl Strategy<Value = WcagLevel> {
    prop_oneof![Just(WcagLevel::A), Just(WcagLevel::AA), Just(WcagLevel::AAA)]
}

fn session(score: u8, passed: BTreeSet<Criterion>) -> ValidationResult {
    ValidationResult {
        issues: vec![],
        score,
        level_achieved: None,
        target_level: WcagLevel::AAA,
        summary: IssueSummary::default(),
        applicable_criteria_count: 12,
        passed_criteria_count: passed.len(),
        passed_criteria: passed,
        failed_criteria: BTreeSet::new(),
        is_compliant: true,
        revision: 0,
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Same document and settings always give the same result
    #[test]
    fn validation_is_deterministic(document in document(), level in level()) {
        let settings = EngineSettings::for_level(level);
        let first = validate(&document, &settings).unwrap();
        let second = validate(&document, &settings).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Score stays in range and matches the passed share of applicable criteria
    #[test]
    fn score_is_bounded(document in document(), level in level()) {
        let settings = EngineSettings::for_level(level);
        let result = validate(&document, &settings).unwrap();

        prop_assert!(result.score <= 100);
        prop_assert_eq!(
            result.passed_criteria_count + result.failed_criteria.len(),
            result.applicable_criteria_count
        );
        let expected = (100.0 * result.passed_criteria_count as f64
            / result.applicable_criteria_count as f64)
            .round() as u8;
        prop_assert_eq!(result.score, expected);
        prop_assert!(result.issues.iter().all(|i| i.level <= level));
    }

    /// Priority order never puts a higher level, or a milder issue at the
    /// same level, ahead of another
    #[test]
    fn priority_order_holds(document in document()) {
        let result = validate(&document, &EngineSettings::for_level(WcagLevel::AAA)).unwrap();
        let ordered = prioritize(&result.issues);
        prop_assert_eq!(ordered.len(), result.issues.len());
        for pair in ordered.windows(2) {
            prop_assert!(pair[0].level <= pair[1].level);
            if pair[0].level == pair[1].level {
                prop_assert!(pair[0].severity <= pair[1].severity);
            }
        }
    }

    /// Resolved criteria only ever grow across sessions
    #[test]
    fn resolved_criteria_only_grow(
        sessions in proptest::collection::vec(
            (0u8..=100, proptest::sample::subsequence(Criterion::ALL.to_vec(), 0..=12)),
            1..8,
        )
    ) {
        let mut store = InMemoryProfileStore::new();
        let hash = ContentHash::of_bytes(b"handbook");
        let start = Utc::now();
        let mut previous: BTreeSet<Criterion> = BTreeSet::new();

        for (index, (score, passed)) in sessions.iter().enumerate() {
            let passed: BTreeSet<Criterion> = passed.iter().copied().collect();
            let at = start + Duration::minutes(index as i64);
            let profile = store.record_at(&hash, &session(*score, passed.clone()), at);

            prop_assert!(profile.resolved_criteria.is_superset(&previous));
            prop_assert!(profile.resolved_criteria.is_superset(&passed));
            prop_assert_eq!(profile.session_count as usize, index + 1);
            prop_assert_eq!(profile.score_history.len(), index + 1);
            previous = profile.resolved_criteria;
        }
    }

    /// Replaying the same fixes against the repaired document changes nothing
    #[test]
    fn autofix_is_idempotent(document in document()) {
        let settings = EngineSettings::for_level(WcagLevel::AAA);
        let request = FixRequest::new();
        let result = validate(&document, &settings).unwrap();

        let first = AutoFixEngine::new(&settings, &request, &mut NoopWriteBack)
            .run(document, &result)
            .unwrap();
        prop_assert_eq!(first.dirty, !first.entries.is_empty());

        let mut replay = result.clone();
        replay.revision = first.document.revision();
        let second = AutoFixEngine::new(&settings, &request, &mut NoopWriteBack)
            .run(first.document, &replay)
            .unwrap();
        prop_assert!(second.entries.is_empty(), "replay applied {:?}", second.entries);
        prop_assert!(!second.dirty);
    }
}
