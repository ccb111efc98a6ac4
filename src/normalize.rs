// Schema normalizer for the ads export.
//
// Shopee changes export column names between app versions and locales, so
// every canonical field carries an alias list. Resolution is two-pass per
// alias: exact header match first, then case-insensitive, and at most one
// source column maps to each canonical field.
use csv::ReaderBuilder;

use crate::error::ReportError;
use crate::types::AdRecord;
use crate::util::parse_money_lenient;

/// Canonical field -> accepted source column names, in lookup order.
const ALIASES: &[(&str, &[&str])] = &[
    ("ad_name", &["Ad Name", "AdName", "Name", "Ad Title"]),
    ("status", &["Status"]),
    ("sequence", &["Sequence", "Seq"]),
    ("expense", &["Expense", "Spend", "Cost"]),
    ("gmv", &["GMV", "Sales", "Revenue"]),
    ("roas", &["ROAS", "Original ROAS", "Ad ROAS"]),
    (
        "items",
        &["Items Sold", "Orders", "Conversions", "Purchases", "Units Sold"],
    ),
];

/// `items` is optional and defaults to 0.0 when absent.
const REQUIRED: &[&str] = &["ad_name", "status", "sequence", "expense", "gmv", "roas"];

const SNIFF_SAMPLE_BYTES: usize = 4096;
const DELIMITER_CANDIDATES: &[u8] = b",\t;|";

/// Sniff the field delimiter from a sample of the raw content.
///
/// Picks the candidate that appears in every sampled line with a consistent
/// per-line count, preferring the one that splits into the most fields.
/// Falls back to comma when nothing qualifies.
pub fn detect_delimiter(raw: &str) -> u8 {
    let mut end = raw.len().min(SNIFF_SAMPLE_BYTES);
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    let sample = &raw[..end];
    let lines: Vec<&str> = sample
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(10)
        .collect();
    if lines.is_empty() {
        return b',';
    }

    let mut best: Option<(u8, usize)> = None;
    for &cand in DELIMITER_CANDIDATES {
        let counts: Vec<usize> = lines
            .iter()
            .map(|l| l.bytes().filter(|b| *b == cand).count())
            .collect();
        let first = counts[0];
        if first == 0 || counts.iter().any(|c| *c != first) {
            continue;
        }
        if best.map_or(true, |(_, n)| first > n) {
            best = Some((cand, first));
        }
    }
    best.map(|(d, _)| d).unwrap_or(b',')
}

/// Map raw headers to canonical field names. Returns, per canonical field,
/// the index of the source column (if resolved).
fn resolve_columns(headers: &[String]) -> Vec<(&'static str, Option<usize>)> {
    let mut taken = vec![false; headers.len()];
    let mut out = Vec::with_capacity(ALIASES.len());
    for (canonical, candidates) in ALIASES {
        let mut found = None;
        'alias: for cand in *candidates {
            for (idx, h) in headers.iter().enumerate() {
                if !taken[idx] && h.as_str() == *cand {
                    found = Some(idx);
                    break 'alias;
                }
            }
            for (idx, h) in headers.iter().enumerate() {
                if !taken[idx] && h.eq_ignore_ascii_case(cand) {
                    found = Some(idx);
                    break 'alias;
                }
            }
        }
        if let Some(idx) = found {
            taken[idx] = true;
        }
        out.push((*canonical, found));
    }
    out
}

/// Normalize raw ads-export content into typed records.
///
/// Returns the records plus the detected delimiter; the delimiter is only
/// for display, nothing downstream depends on it.
pub fn normalize_ads(raw: &str) -> Result<(Vec<AdRecord>, u8), ReportError> {
    let delimiter = detect_delimiter(raw);
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(raw.as_bytes());

    // All cells come in as text; coercion happens per field below.
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let columns = resolve_columns(&headers);

    let missing: Vec<String> = columns
        .iter()
        .filter(|(canonical, idx)| idx.is_none() && REQUIRED.contains(canonical))
        .map(|(canonical, _)| canonical.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ReportError::schema("ads export", missing));
    }

    let col = |name: &str| -> Option<usize> {
        columns
            .iter()
            .find(|(canonical, _)| *canonical == name)
            .and_then(|(_, idx)| *idx)
    };
    let (c_name, c_status, c_seq) = (col("ad_name"), col("status"), col("sequence"));
    let (c_expense, c_gmv, c_roas, c_items) =
        (col("expense"), col("gmv"), col("roas"), col("items"));

    let text = |rec: &csv::StringRecord, idx: Option<usize>| -> String {
        idx.and_then(|i| rec.get(i)).unwrap_or("").trim().to_string()
    };
    let number = |rec: &csv::StringRecord, idx: Option<usize>| -> f64 {
        idx.and_then(|i| rec.get(i))
            .map(parse_money_lenient)
            .unwrap_or(0.0)
    };

    let mut out = Vec::new();
    for result in rdr.records() {
        let rec = result?;
        out.push(AdRecord {
            ad_name: text(&rec, c_name),
            status: text(&rec, c_status),
            sequence: text(&rec, c_seq),
            expense: number(&rec, c_expense),
            gmv: number(&rec, c_gmv),
            roas: number(&rec, c_roas),
            items: number(&rec, c_items),
        });
    }
    Ok((out, delimiter))
}
