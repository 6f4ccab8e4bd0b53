// Porter stemmer with the NLTK extensions (irregular forms, short-word guard,
// revised step 1 and 2 rules), the stemmer ROUGE reference scores are computed with.

// Whole-word overrides checked before any rule.
const IRREGULAR_FORMS: [(&str, &str); 16] = [
    ("sky", "sky"),
    ("skies", "sky"),
    ("dying", "die"),
    ("lying", "lie"),
    ("tying", "tie"),
    ("news", "news"),
    ("innings", "inning"),
    ("inning", "inning"),
    ("outings", "outing"),
    ("outing", "outing"),
    ("cannings", "canning"),
    ("canning", "canning"),
    ("howe", "howe"),
    ("proceed", "proceed"),
    ("exceed", "exceed"),
    ("succeed", "succeed"),
];

#[derive(Clone, Copy)]
enum Condition {
    Always,
    /// m(stem) > 0
    Measure,
    /// m(stem) > 1
    MeasureAboveOne,
    /// m(stem) > 1 and stem ends in s or t
    IonStem,
    /// stem longer than one letter and ending in a consonant
    ConsonantBeforeY,
    /// m(word minus the last three letters) > 0
    LogiStem,
    /// m(word minus the last letter) > 1
    DoubleL,
}

impl Condition {
    fn holds(self, word: &[u8], stem: &[u8]) -> bool {
        match self {
            Condition::Always => true,
            Condition::Measure => measure(stem) > 0,
            Condition::MeasureAboveOne => measure(stem) > 1,
            Condition::IonStem => measure(stem) > 1 && matches!(stem.last(), Some(b's' | b't')),
            Condition::ConsonantBeforeY => stem.len() > 1 && is_consonant(stem, stem.len() - 1),
            Condition::LogiStem => measure(&word[..word.len() - 3]) > 0,
            Condition::DoubleL => measure(&word[..word.len() - 1]) > 1,
        }
    }
}

type Rule = (&'static str, &'static str, Condition);

/// Stem one lowercase ASCII word. Words of two letters or fewer and
/// non-ASCII words are returned lowercased but otherwise untouched.
pub fn stem(word: &str) -> String {
    let word = word.to_lowercase();
    if let Some((_, irregular)) = IRREGULAR_FORMS.iter().find(|(form, _)| *form == word) {
        return irregular.to_string();
    }
    if word.len() <= 2 || !word.is_ascii() {
        return word;
    }

    let mut w = word.into_bytes();
    step1a(&mut w);
    step1b(&mut w);
    apply_rules(&mut w, &[("y", "i", Condition::ConsonantBeforeY)]);
    step2(&mut w);
    step3(&mut w);
    step4(&mut w);
    step5a(&mut w);
    apply_rules(&mut w, &[("ll", "l", Condition::DoubleL)]);
    w.into_iter().map(char::from).collect()
}

fn is_consonant(w: &[u8], i: usize) -> bool {
    match w[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_consonant(w, i - 1),
        _ => true,
    }
}

/// Number of vowel-consonant transitions, the `m` in `[C](VC)^m[V]`.
fn measure(stem: &[u8]) -> usize {
    let mut m = 0;
    let mut after_vowel = false;
    for i in 0..stem.len() {
        let consonant = is_consonant(stem, i);
        if consonant && after_vowel {
            m += 1;
        }
        after_vowel = !consonant;
    }
    m
}

fn contains_vowel(stem: &[u8]) -> bool {
    (0..stem.len()).any(|i| !is_consonant(stem, i))
}

fn ends_double_consonant(w: &[u8]) -> bool {
    let n = w.len();
    n >= 2 && w[n - 1] == w[n - 2] && is_consonant(w, n - 1)
}

/// consonant-vowel-consonant with the last not w, x or y; also a bare
/// vowel-consonant pair.
fn ends_cvc(w: &[u8]) -> bool {
    let n = w.len();
    (n >= 3
        && is_consonant(w, n - 3)
        && !is_consonant(w, n - 2)
        && is_consonant(w, n - 1)
        && !matches!(w[n - 1], b'w' | b'x' | b'y'))
        || (n == 2 && !is_consonant(w, 0) && is_consonant(w, 1))
}

fn replace_suffix(w: &mut Vec<u8>, suffix_len: usize, replacement: &[u8]) {
    w.truncate(w.len() - suffix_len);
    w.extend_from_slice(replacement);
}

/// The first rule whose suffix matches decides: it is applied when its
/// condition holds, and no later rule is tried either way.
fn apply_rules(w: &mut Vec<u8>, rules: &[Rule]) {
    for &(suffix, replacement, condition) in rules {
        if w.ends_with(suffix.as_bytes()) {
            let stem_len = w.len() - suffix.len();
            if condition.holds(w, &w[..stem_len]) {
                replace_suffix(w, suffix.len(), replacement.as_bytes());
            }
            return;
        }
    }
}

fn step1a(w: &mut Vec<u8>) {
    if w.len() == 4 && w.ends_with(b"ies") {
        w.pop();
        return;
    }
    apply_rules(
        w,
        &[
            ("sses", "ss", Condition::Always),
            ("ies", "i", Condition::Always),
            ("ss", "ss", Condition::Always),
            ("s", "", Condition::Always),
        ],
    );
}

fn step1b(w: &mut Vec<u8>) {
    if w.ends_with(b"ied") {
        let replacement: &[u8] = if w.len() == 4 { b"ie" } else { b"i" };
        replace_suffix(w, 3, replacement);
        return;
    }
    if w.ends_with(b"eed") {
        if measure(&w[..w.len() - 3]) > 0 {
            w.pop();
        }
        return;
    }

    let stem_len = if w.ends_with(b"ed") && contains_vowel(&w[..w.len() - 2]) {
        w.len() - 2
    } else if w.ends_with(b"ing") && contains_vowel(&w[..w.len() - 3]) {
        w.len() - 3
    } else {
        return;
    };
    w.truncate(stem_len);

    if w.ends_with(b"at") || w.ends_with(b"bl") || w.ends_with(b"iz") {
        w.push(b'e');
    } else if ends_double_consonant(w) {
        if !matches!(w.last(), Some(b'l' | b's' | b'z')) {
            w.pop();
        }
    } else if measure(w) == 1 && ends_cvc(w) {
        w.push(b'e');
    }
}

fn step2(w: &mut Vec<u8>) {
    // "alli" is reduced first and the result goes through the step again.
    if w.ends_with(b"alli") && measure(&w[..w.len() - 4]) > 0 {
        replace_suffix(w, 4, b"al");
        step2(w);
        return;
    }
    apply_rules(
        w,
        &[
            ("ational", "ate", Condition::Measure),
            ("tional", "tion", Condition::Measure),
            ("enci", "ence", Condition::Measure),
            ("anci", "ance", Condition::Measure),
            ("izer", "ize", Condition::Measure),
            ("bli", "ble", Condition::Measure),
            ("alli", "al", Condition::Measure),
            ("entli", "ent", Condition::Measure),
            ("eli", "e", Condition::Measure),
            ("ousli", "ous", Condition::Measure),
            ("ization", "ize", Condition::Measure),
            ("ation", "ate", Condition::Measure),
            ("ator", "ate", Condition::Measure),
            ("alism", "al", Condition::Measure),
            ("iveness", "ive", Condition::Measure),
            ("fulness", "ful", Condition::Measure),
            ("ousness", "ous", Condition::Measure),
            ("aliti", "al", Condition::Measure),
            ("iviti", "ive", Condition::Measure),
            ("biliti", "ble", Condition::Measure),
            ("fulli", "ful", Condition::Measure),
            ("logi", "log", Condition::LogiStem),
        ],
    );
}

fn step3(w: &mut Vec<u8>) {
    apply_rules(
        w,
        &[
            ("icate", "ic", Condition::Measure),
            ("ative", "", Condition::Measure),
            ("alize", "al", Condition::Measure),
            ("iciti", "ic", Condition::Measure),
            ("ical", "ic", Condition::Measure),
            ("ful", "", Condition::Measure),
            ("ness", "", Condition::Measure),
        ],
    );
}

fn step4(w: &mut Vec<u8>) {
    const RULES: [Rule; 19] = [
        ("al", "", Condition::MeasureAboveOne),
        ("ance", "", Condition::MeasureAboveOne),
        ("ence", "", Condition::MeasureAboveOne),
        ("er", "", Condition::MeasureAboveOne),
        ("ic", "", Condition::MeasureAboveOne),
        ("able", "", Condition::MeasureAboveOne),
        ("ible", "", Condition::MeasureAboveOne),
        ("ant", "", Condition::MeasureAboveOne),
        ("ement", "", Condition::MeasureAboveOne),
        ("ment", "", Condition::MeasureAboveOne),
        ("ent", "", Condition::MeasureAboveOne),
        ("ion", "", Condition::IonStem),
        ("ou", "", Condition::MeasureAboveOne),
        ("ism", "", Condition::MeasureAboveOne),
        ("ate", "", Condition::MeasureAboveOne),
        ("iti", "", Condition::MeasureAboveOne),
        ("ous", "", Condition::MeasureAboveOne),
        ("ive", "", Condition::MeasureAboveOne),
        ("ize", "", Condition::MeasureAboveOne),
    ];
    apply_rules(w, &RULES);
}

fn step5a(w: &mut Vec<u8>) {
    if w.last() != Some(&b'e') {
        return;
    }
    let stem = &w[..w.len() - 1];
    let m = measure(stem);
    if m > 1 || (m == 1 && !ends_cvc(stem)) {
        w.pop();
    }
}
