//! Heuristic classification of listing-page hyperlinks.

/// Morphological stems that mark a link as a statutory or regulatory text.
/// Substring matching catches the inflected Hebrew forms.
const LAW_STEMS: &[&str] = &[
    "חוק",   // law
    "פקודת", // ordinance
    "תקנות", // regulations
    "תקנון", // bylaws
    "צו",    // order
    "הודע",  // notice
    "כללי",  // rules
    "נוהל",  // procedure
    "הורא",  // instruction
    "הנחי",  // guidance
    "החלט",  // decision
    "היתר",  // permit
    "הכרז",  // declaration
    "אכרז",  // proclamation
    "דבר",   // proclamation (דבר המלך)
    "נורמ",  // norm
    "רשימ",  // list
    "דריש",  // requirement
    "קוו",   // guideline (קווים מנחים)
    "קביע",  // determination
    "פרט",   // schedule item
];

/// Percent-encoded חוק / פקודת / תקנות, matched literally in article paths.
const ENCODED_PATH_TERMS: &[&str] = &[
    "%D7%97%D7%95%D7%A7",
    "%D7%A4%D7%A7%D7%95%D7%93%D7%AA",
    "%D7%AA%D7%A7%D7%A0%D7%95%D7%AA",
];

/// Wiki chrome that must never reach classification.
const NAVIGATION_PATTERNS: &[&str] = &[
    "action=edit",
    "action=history",
    "oldid=",
    "#",
    "Special:",
    "Help:",
    "Template:",
    "Category:",
    "File:",
    "MediaWiki:",
    "/w/index.php",
];

/// Edit/history actions, revision ids, fragment anchors, namespace pages
/// and administrative script paths.
pub fn is_internal_navigation(href: &str) -> bool {
    NAVIGATION_PATTERNS
        .iter()
        .any(|pattern| href.contains(pattern))
}

/// Returns true when the href/text pair looks like a normative instrument:
/// either a legal stem appears somewhere in the combined case-normalized
/// text, or the article path carries one of the encoded legal terms.
pub fn is_law_rule(href: &str, link_text: &str) -> bool {
    let combined = format!("{href} {link_text}").to_lowercase();
    if LAW_STEMS.iter().any(|stem| combined.contains(stem)) {
        return true;
    }

    href.contains("/wiki/") && ENCODED_PATH_TERMS.iter().any(|term| href.contains(term))
}
