//! Builtin Thanglish to Tamil suite.
//!
//! 24 positive functional scenarios, 10 negative functional scenarios and one
//! UI behavior scenario. Negative scenarios assert availability only, except
//! where the input carries a token the widget must leave untouched.

use super::ScenarioRecord;
use crate::domain::models::{ApplyMode, Category, OracleKind};

const POSITIVE: &[(&str, &str)] = &[
    ("Simple sentence conversion", "naan veetukku poren"),
    ("Greeting question", "vanakkam eppadi irukkeenga?"),
    ("Polite request sentence", "thayavu seithu enakku konjam help pannunga"),
    ("Informal command", "dei inge vaa"),
    ("Daily question sentence", "nee eppo varuva?"),
    ("Present tense sentence", "naan ippo padikkiren"),
    ("Past tense sentence", "naan nethu school ponen"),
    ("Future tense sentence", "naalai naan office poren"),
    ("Pronoun variation (we)", "naanga innaikku outing porom"),
    ("Plural sentence", "pasanga ground la vilaiyaaduraanga"),
    ("Compound sentence", "naan bus pidichen aana seat kidaikala"),
    ("Conditional sentence", "nee vandhaal naan unakku solluren"),
    ("Simple request", "konjam thanni kudunga"),
    ("Repeated words", "seri seri naan varren"),
    ("Mixed English app word", "naan WhatsApp la message anuppitten"),
    ("Abbreviation usage", "enakku OTP varala"),
    ("Place name", "naan Colombo poren"),
    ("Currency and number", "Rs. 2500 kuduthen"),
    ("Time format", "7.30 AM class irukku"),
    ("Date format", "2026-02-01 exam irukku"),
    ("Units", "2 kg arisi venum"),
    ("Punctuation variety", "wow nee vandhutiya? super!!!"),
    ("Multiple spaces", "naan   innaikku   late  aagitten"),
    (
        "Long paragraph conversion (L)",
        concat!(
            "innaikku naan office la romba busy. morning la meeting documents review client call ellam irundhuchu. ",
            "lunch kooda time illa. evening la thirumba travel pannitu veetukku late aa vandhen. ",
            "aana work mudichuten nu sandhosham. naalai early aa ezhundhu vela seyyanum."
        ),
    ),
];

/// `(title, input, preserved token)`; no token means NonCrash.
const NEGATIVE: &[(&str, &str, Option<&str>)] = &[
    ("Joined words without spaces", "naanveetukkuporenippo", None),
    ("Heavy typos", "naaan veetukku pogireeen ipoo", None),
    ("Random symbols", "naan #$%@ veetukku !!! poren", None),
    ("Mixed Tamil + Thanglish", "naan வீட்டுக்கு poren", Some("வீட்டுக்கு")),
    ("Repeated characters", "soooo happyyyyy innaikku", None),
    ("Abbreviation heavy", "ID NIC OTP URL QR CPU GPU OS", None),
    ("Very long number", "order number 12345678901234567890", Some("12345678901234567890")),
    ("Tabs and spaces", "naan\t\tinnaikku\tlate", None),
    ("Only punctuation", "!!!???...", None),
    ("Empty input", "", None),
];

fn record(
    id: String,
    title: &str,
    category: Category,
    input_text: &str,
    apply_mode: ApplyMode,
    oracle: OracleKind,
) -> ScenarioRecord {
    ScenarioRecord {
        id,
        title: title.to_string(),
        category,
        input_text: input_text.to_string(),
        apply_mode,
        oracle,
        timing: None,
    }
}

/// Records of the builtin suite, in execution order.
pub fn records() -> Vec<ScenarioRecord> {
    let positive = POSITIVE.iter().enumerate().map(|(i, (title, input))| {
        record(
            format!("Pos_Fun_{:04}", i + 1),
            title,
            Category::Positive,
            input,
            ApplyMode::Atomic,
            OracleKind::tamil(),
        )
    });

    let negative = NEGATIVE.iter().enumerate().map(|(i, (title, input, token))| {
        let oracle = token.map_or(OracleKind::NonCrash, OracleKind::substring);
        record(
            format!("Neg_Fun_{:04}", i + 1),
            title,
            Category::Negative,
            input,
            ApplyMode::Atomic,
            oracle,
        )
    });

    let ui = std::iter::once(record(
        "Pos_UI_0001".to_string(),
        "Real-time output changes while typing",
        Category::UiBehavior,
        "naan veetukku poren",
        ApplyMode::Incremental {
            per_char_delay_ms: 120,
            checkpoints: vec![4],
        },
        OracleKind::MonotonicGrowth,
    ));

    positive.chain(negative).chain(ui).collect()
}
