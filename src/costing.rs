// Product costing loader.
//
// The costing table comes from finance as either a tab-delimited `.txt`
// dump or a plain CSV. Header matching is deliberately loose (lowercased,
// trimmed, internal whitespace ignored) because the sheet is hand-edited.
use std::collections::HashMap;

use csv::ReaderBuilder;

use crate::error::ReportError;
use crate::types::CostRecord;
use crate::util::parse_money_lenient;

const REQUIRED: &[&str] = &["product name", "product cost", "srp price"];

fn squash(s: &str) -> String {
    s.trim().to_lowercase().replace(' ', "")
}

/// Try to resolve the three required headers; returns their column indices
/// in `REQUIRED` order, or the list of unresolved display names.
fn resolve_headers(headers: &[String]) -> Result<[usize; 3], Vec<String>> {
    let squashed: Vec<String> = headers.iter().map(|h| squash(h)).collect();
    let mut idx = [usize::MAX; 3];
    let mut missing = Vec::new();
    for (slot, target) in REQUIRED.iter().enumerate() {
        match squashed.iter().position(|h| h == &target.replace(' ', "")) {
            Some(i) => idx[slot] = i,
            None => missing.push(display_name(target)),
        }
    }
    if missing.is_empty() {
        Ok(idx)
    } else {
        Err(missing)
    }
}

fn display_name(target: &str) -> String {
    match target {
        "srp price" => "SRP Price".to_string(),
        "product name" => "Product Name".to_string(),
        "product cost" => "Product Cost".to_string(),
        other => other.to_string(),
    }
}

fn parse_with(raw: &str, delimiter: u8) -> Result<Vec<CostRecord>, ReportError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(raw.as_bytes());
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let [c_name, c_cost, c_srp] = resolve_headers(&headers)
        .map_err(|missing| ReportError::schema("costing file", missing))?;

    let mut out = Vec::new();
    for result in rdr.records() {
        let rec = result?;
        let cell = |i: usize| rec.get(i).unwrap_or("");
        out.push(CostRecord {
            product_name: cell(c_name).trim().to_string(),
            product_cost: parse_money_lenient(cell(c_cost)).max(0.0),
            srp_price: parse_money_lenient(cell(c_srp)).max(0.0),
        });
    }
    Ok(out)
}

/// Load the costing table. A `.txt` filename hint selects tab-delimited
/// parsing first, retrying as comma-delimited if the headers do not
/// resolve under tabs.
pub fn load_costing(raw: &str, filename_hint: &str) -> Result<Vec<CostRecord>, ReportError> {
    if filename_hint.to_lowercase().ends_with(".txt") {
        if let Ok(rows) = parse_with(raw, b'\t') {
            return Ok(rows);
        }
        // fall through and retry as comma-delimited
    }
    parse_with(raw, b',')
}

/// Build the join map keyed by `product_key`. Duplicate keys are not
/// rejected; the last row wins, matching plain map insertion.
pub fn costing_index(rows: &[CostRecord]) -> HashMap<String, CostRecord> {
    let mut map = HashMap::with_capacity(rows.len());
    for r in rows {
        map.insert(r.product_key(), r.clone());
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;

    #[test]
    fn loads_tab_delimited_txt() {
        let raw = "Product Name\tProduct Cost\tSRP Price\nBIG ARMOR\t20\t50\n";
        let rows = load_costing(raw, "costing.txt").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product_name, "BIG ARMOR");
        assert_eq!(rows[0].product_cost, 20.0);
        assert_eq!(rows[0].srp_price, 50.0);
    }

    #[test]
    fn txt_hint_retries_as_comma() {
        // Mislabelled .txt that is actually comma-delimited.
        let raw = "Product Name,Product Cost,SRP Price\nARMOR,10,25\n";
        let rows = load_costing(raw, "costing.txt").unwrap();
        assert_eq!(rows[0].product_name, "ARMOR");
    }

    #[test]
    fn headers_match_ignoring_case_and_internal_whitespace() {
        let raw = "productname,PRODUCT  COST,Srp price\nARMOR,10,25\n";
        let rows = load_costing(raw, "costing.csv").unwrap();
        assert_eq!(rows[0].product_cost, 10.0);
        assert_eq!(rows[0].srp_price, 25.0);
    }

    #[test]
    fn missing_headers_list_required_names() {
        let raw = "Product Name,Unit Price\nARMOR,10\n";
        let err = load_costing(raw, "costing.csv").unwrap_err();
        match err {
            ReportError::Schema { missing, .. } => {
                assert_eq!(missing, vec!["Product Cost", "SRP Price"]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn product_key_is_uppercase_trimmed() {
        let raw = "Product Name,Product Cost,SRP Price\n  big armor ,20,50\n";
        let rows = load_costing(raw, "c.csv").unwrap();
        assert_eq!(rows[0].product_key(), "BIG ARMOR");
    }

    #[test]
    fn duplicate_keys_last_write_wins() {
        let raw = "Product Name,Product Cost,SRP Price\nARMOR,10,25\nARMOR,12,30\n";
        let rows = load_costing(raw, "c.csv").unwrap();
        let index = costing_index(&rows);
        let hit = index.get("ARMOR").unwrap();
        assert_eq!(hit.product_cost, 12.0);
        assert_eq!(hit.srp_price, 30.0);
    }

    #[test]
    fn unparsable_prices_default_to_zero() {
        let raw = "Product Name,Product Cost,SRP Price\nARMOR,tbd,\n";
        let rows = load_costing(raw, "c.csv").unwrap();
        assert_eq!(rows[0].product_cost, 0.0);
        assert_eq!(rows[0].srp_price, 0.0);
    }
}
