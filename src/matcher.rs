// Ordered rule-based product matching.
//
// Ad names are free text typed by campaign managers; the rules below map
// known name fragments to canonical costing products. Rule order is the
// sole source of precedence: the first pattern found in the ad name wins,
// so more specific fragments must be listed before their prefixes (e.g.
// "BIG ARMOR" before "ARMOR").

/// (pattern, canonical product) pairs, evaluated top to bottom. Patterns
/// are matched case-insensitively as substrings of the ad name. Canonical
/// names must equal the `Product Name` values in the costing table for the
/// cost join to land.
pub const MATCH_RULES: &[(&str, &str)] = &[
    ("BIG ARMOR", "BIG ARMOR"),
    ("ARMOR MATTE", "ARMOR MATTE"),
    ("ARMOR", "ARMOR"),
    ("GRAPHENE", "GRAPHENE CASE"),
    ("MAGNETIC", "MAGNETIC CASE"),
    ("PRIVACY GLASS", "PRIVACY GLASS"),
    ("TEMPERED", "TEMPERED GLASS"),
    ("CLEAR CASE", "CLEAR CASE"),
    ("LENS PROTECT", "LENS PROTECTOR"),
    ("KEYCHAIN", "KEYCHAIN STRAP"),
];

/// Resolve an ad display name to a canonical product via the ordered rule
/// list, or `None` when no pattern is found (or there is no name at all).
pub fn match_product(ad_name: Option<&str>) -> Option<&'static str> {
    let name = ad_name?.to_uppercase();
    MATCH_RULES
        .iter()
        .find(|(pattern, _)| name.contains(pattern))
        .map(|(_, product)| *product)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_listed_rule_wins() {
        // Contains both an ARMOR and a GRAPHENE fragment; ARMOR variants
        // are listed first so they take precedence.
        assert_eq!(
            match_product(Some("BIG ARMOR GRAPHENE bundle")),
            Some("BIG ARMOR")
        );
        // "BIG ARMOR" and "ARMOR MATTE" do not match here, so plain
        // "ARMOR" wins over "GRAPHENE" by list order.
        assert_eq!(match_product(Some("graphene armor combo")), Some("ARMOR"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(match_product(Some("big armor promo")), Some("BIG ARMOR"));
        assert_eq!(match_product(Some("Tempered Glass 9H")), Some("TEMPERED GLASS"));
    }

    #[test]
    fn unknown_or_missing_names_do_not_match() {
        assert_eq!(match_product(Some("random product")), None);
        assert_eq!(match_product(None), None);
    }
}
