//! Static domain synonym table and one-level expansion.

/// Related-term table for the creative-tools feedback domain.
///
/// Expansion is one level deep: synonyms of synonyms are not chased, so
/// expanding an already-expanded set is a no-op.
const DOMAIN_SYNONYMS: &[(&str, &[&str])] = &[
    (
        "brand kit",
        &[
            "brand assets",
            "brand styles",
            "brand guidelines",
            "brand library",
            "branding kit",
        ],
    ),
    ("branding", &["brand kit", "brand assets", "brand styles"]),
    ("logo", &["logomark", "brand logo"]),
    ("font", &["typeface", "typography", "text style"]),
    (
        "color palette",
        &["brand colors", "theme colors", "palette"],
    ),
    ("caption", &["subtitles", "auto captions", "transcript"]),
    ("pdf", &["portable document", "pdf export", "pdf import"]),
    (
        "background removal",
        &["remove background", "bg removal", "background eraser"],
    ),
    ("export", &["download", "save as", "render"]),
    ("resize", &["resizing", "scale", "dimensions"]),
    ("watermark", &["logo overlay", "stamp"]),
    ("compress", &["compression", "reduce size"]),
    ("crop", &["trim"]),
    ("merge", &["combine", "append"]),
    ("collaborate", &["share", "invite", "comments"]),
    ("template", &["preset", "layout template", "design template"]),
];

/// Look up the related terms for a term (case-insensitive, whole term).
pub fn synonyms_for(term: &str) -> Option<&'static [&'static str]> {
    let needle = term.to_lowercase();
    DOMAIN_SYNONYMS
        .iter()
        .find(|(key, _)| *key == needle)
        .map(|(_, related)| *related)
}

/// Expand a term list through the table, preserving first-seen order and
/// deduplicating. With `use_synonyms` off this only deduplicates.
pub fn expand_terms(terms: &[String], use_synonyms: bool) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push_unique = |term: &str, out: &mut Vec<String>| {
        if !out.iter().any(|t| t == term) {
            out.push(term.to_string());
        }
    };

    for term in terms {
        push_unique(term, &mut out);
        if use_synonyms {
            if let Some(related) = synonyms_for(term) {
                for syn in related {
                    push_unique(syn, &mut out);
                }
            }
        }
    }
    out
}
