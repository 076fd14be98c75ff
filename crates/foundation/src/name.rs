//! Country-name folding shared by every naming source.
//!
//! The boundary dataset, the attributes API and game answers all spell
//! country names differently. `fold_name` maps them onto one comparable key.

/// Folds a display name into its comparison key.
///
/// - lowercase, common Latin diacritics stripped
/// - `&` becomes `and`; `.` and apostrophes are dropped
/// - `-`, `_`, `/` and brackets become spaces, whitespace is collapsed
/// - the ISO inverted form `"Korea, Republic of"` becomes `"republic of korea"`
/// - a leading `"the "` is removed
pub fn fold_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '.' | '\'' | '\u{2019}' | '`' => {}
            '&' => out.push_str(" and "),
            '-' | '_' | '/' | '(' | ')' | '[' | ']' => out.push(' '),
            c => {
                for lower in c.to_lowercase() {
                    out.push(fold_diacritic(lower));
                }
            }
        }
    }

    let collapsed = collapse_whitespace(&out);
    let ordered = invert_comma_form(&collapsed);
    match ordered.strip_prefix("the ") {
        Some(rest) => rest.to_string(),
        None => ordered,
    }
}

/// Case-insensitive key with surrounding and repeated whitespace removed.
///
/// Unlike [`fold_name`] it keeps punctuation, accents and word order, so two
/// names sharing this key are spelled the same.
pub fn exact_key(raw: &str) -> String {
    collapse_whitespace(raw).to_lowercase()
}

/// `true` when both names fold to the same key.
pub fn names_equal(a: &str, b: &str) -> bool {
    fold_name(a) == fold_name(b)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn invert_comma_form(s: &str) -> String {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [single] => single.to_string(),
        [head, tail] if !tail.is_empty() => collapse_whitespace(&format!("{tail} {head}")),
        _ => collapse_whitespace(&parts.join(" ")),
    }
}

fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' => 'a',
        'ç' | 'č' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'ē' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'š' => 's',
        'ž' => 'z',
        other => other,
    }
}
