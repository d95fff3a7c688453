//! Country/region name normalisation
//!
//! Catalogue entries use common short names ("Vietnam", "Laos") while
//! ISO-3166 spells them differently. Both spellings are made searchable.

/// Common name -> ISO-3166 short name
const ISO_ALIASES: &[(&str, &str)] = &[
    ("vietnam", "viet nam"),
    ("laos", "lao people's democratic republic"),
    ("lao pdr", "lao people's democratic republic"),
    ("east-timor", "timor-leste"),
    ("east timor", "timor-leste"),
];

/// ISO-3166 spelling of a region, lower-cased
pub fn iso_name(region: &str) -> String {
    let lowered = region.trim().to_lowercase();
    ISO_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, iso)| (*iso).to_string())
        .unwrap_or(lowered)
}

/// Every lower-cased spelling a region is known by
pub fn spellings(region: &str) -> Vec<String> {
    let lowered = region.trim().to_lowercase();
    let iso = iso_name(&lowered);
    let mut names = vec![lowered.clone()];
    if iso != lowered {
        names.push(iso.clone());
    }
    names.extend(
        ISO_ALIASES
            .iter()
            .filter(|(alias, target)| *target == iso && *alias != lowered)
            .map(|(alias, _)| (*alias).to_string()),
    );
    names
}
