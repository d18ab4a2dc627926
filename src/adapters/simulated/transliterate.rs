//! Phonetic Thanglish to Tamil mapping used by the simulated widget.
//!
//! Greedy longest match over lowercase Latin letters. Consonants followed by
//! a vowel take the vowel sign, bare consonants take the virama. Anything
//! that is not an ASCII letter (digits, punctuation, whitespace, text that is
//! already Tamil) passes through untouched.

const VIRAMA: &str = "\u{0BCD}";

/// Longest keys first so `aa` wins over `a`.
const VOWELS: &[(&str, &str, &str)] = &[
    // (latin, independent, sign)
    ("aa", "ஆ", "ா"),
    ("ai", "ஐ", "ை"),
    ("au", "ஔ", "ௌ"),
    ("ee", "ஈ", "ீ"),
    ("ii", "ஈ", "ீ"),
    ("oo", "ஊ", "ூ"),
    ("uu", "ஊ", "ூ"),
    ("ae", "ஏ", "ே"),
    ("oa", "ஓ", "ோ"),
    ("a", "அ", ""),
    ("i", "இ", "ி"),
    ("u", "உ", "ு"),
    ("e", "எ", "ெ"),
    ("o", "ஒ", "ொ"),
];

const CONSONANTS: &[(&str, &str)] = &[
    ("zh", "ழ"),
    ("ng", "ங"),
    ("nj", "ஞ"),
    ("ch", "ச"),
    ("sh", "ஷ"),
    ("th", "த"),
    ("dh", "த"),
    ("k", "க"),
    ("g", "க"),
    ("c", "க"),
    ("q", "க"),
    ("s", "ச"),
    ("j", "ஜ"),
    ("z", "ஜ"),
    ("t", "ட"),
    ("d", "ட"),
    ("n", "ந"),
    ("p", "ப"),
    ("b", "ப"),
    ("f", "ப"),
    ("m", "ம"),
    ("y", "ய"),
    ("r", "ர"),
    ("l", "ல"),
    ("v", "வ"),
    ("w", "வ"),
    ("h", "ஹ"),
    ("x", "க்ஸ"),
];

/// `n` inside a word is the alveolar nasal.
const MEDIAL_N: &str = "ன";

fn starts_with(chars: &[char], at: usize, key: &str) -> bool {
    let end = at + key.len();
    end <= chars.len() && chars[at..end].iter().copied().eq(key.chars())
}

fn consonant_at(chars: &[char], at: usize) -> Option<(usize, &'static str)> {
    CONSONANTS
        .iter()
        .find(|(key, _)| starts_with(chars, at, key))
        .map(|(key, letter)| (key.len(), *letter))
}

fn vowel_at(chars: &[char], at: usize) -> Option<(usize, &'static str, &'static str)> {
    VOWELS
        .iter()
        .find(|(key, _, _)| starts_with(chars, at, key))
        .map(|(key, independent, sign)| (key.len(), *independent, *sign))
}

/// Transliterate Thanglish text into Tamil script.
pub fn transliterate(text: &str) -> String {
    let chars: Vec<char> = text.chars().map(|c| c.to_ascii_lowercase()).collect();
    let original: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() * 3);
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_alphabetic() {
            out.push(original[i]);
            i += 1;
            continue;
        }
        let word_start = i == 0 || !chars[i - 1].is_ascii_alphabetic();

        if let Some((len, letter)) = consonant_at(&chars, i) {
            let letter = if letter == "ந" && !word_start {
                MEDIAL_N
            } else {
                letter
            };
            out.push_str(letter);
            i += len;

            if let Some((len, _, sign)) = vowel_at(&chars, i) {
                out.push_str(sign);
                i += len;
            } else {
                out.push_str(VIRAMA);
            }
        } else if let Some((len, independent, _)) = vowel_at(&chars, i) {
            out.push_str(independent);
            i += len;
        } else {
            out.push(original[i]);
            i += 1;
        }
    }
    out
}
