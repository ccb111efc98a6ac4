// Excel report renderer.
//
// Produces the three-sheet workbook the analysts actually open: the active
// table with a summary block and decision highlighting, plus the deleted
// and unmatched review sheets. Numeric cells are written as numbers so the
// SUM/AVERAGE/COUNTIF summary formulas keep working when rows are edited
// by hand; non-finite ROAS thresholds are written as the text "INF".
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet, XlsxError};

use crate::types::{DecoratedAd, MatchStatus, RunDecision, Tier};

const GREEN_FILL: u32 = 0xD5F5E3;
const YELLOW_FILL: u32 = 0xFCF3CF;
const RED_FILL: u32 = 0xFADBD8;
const AMBER_FILL: u32 = 0xFFF3CD;

const HEADERS: &[&str] = &[
    "Ad Name",
    "Status",
    "Sequence",
    "Expense",
    "GMV",
    "ROAS",
    "Items",
    "Matched Product",
    "Match Status",
    "Product Cost",
    "SRP Price",
    "Net Profit",
    "Break-even ROAS",
    "Suggested ROAS",
    "Decision (RUN/OFF)",
    "Decision (WIN/OPT/LOSE)",
];

const COL_EXPENSE: u16 = 3;
const COL_GMV: u16 = 4;
const COL_ROAS: u16 = 5;
const COL_MATCH_STATUS: u16 = 8;
const COL_NET_PROFIT: u16 = 11;
const COL_RUN_OFF: u16 = 14;
const COL_TIER: u16 = 15;

struct Fills {
    green: Format,
    yellow: Format,
    red: Format,
    amber: Format,
    bold: Format,
}

impl Fills {
    fn new() -> Self {
        Fills {
            green: Format::new().set_background_color(Color::RGB(GREEN_FILL)),
            yellow: Format::new().set_background_color(Color::RGB(YELLOW_FILL)),
            red: Format::new().set_background_color(Color::RGB(RED_FILL)),
            amber: Format::new().set_background_color(Color::RGB(AMBER_FILL)),
            bold: Format::new().set_bold(),
        }
    }
}

/// Write the full workbook to `path`.
pub fn write_workbook(
    path: &str,
    active: &[DecoratedAd],
    deleted: &[DecoratedAd],
    unmatched: &[DecoratedAd],
    multiplier: f64,
    source_name: &str,
) -> Result<(), XlsxError> {
    let fills = Fills::new();
    let mut workbook = Workbook::new();

    let ws = workbook.add_worksheet().set_name("Performance Summary")?;
    ws.write_string_with_format(0, 0, "Shopee Ads ROAS Report", &fills.bold)?;
    ws.write_string(1, 0, "Profit Multiplier")?;
    ws.write_number(1, 1, multiplier)?;
    ws.write_string(2, 0, "Source CSV")?;
    ws.write_string(2, 1, source_name)?;
    write_table(ws, active, 5, &fills)?;
    write_summary_block(ws, active.len(), 5, &fills)?;
    fit_columns(ws, active);

    let ws = workbook.add_worksheet().set_name("Deleted Ads")?;
    write_table(ws, deleted, 1, &fills)?;
    fit_columns(ws, if deleted.is_empty() { active } else { deleted });

    let ws = workbook.add_worksheet().set_name("Unmatched Review")?;
    write_table(ws, unmatched, 1, &fills)?;
    fit_columns(ws, if unmatched.is_empty() { active } else { unmatched });

    workbook.save(path)?;
    Ok(())
}

/// Write headers at `header_row` and one row per decorated ad below it.
/// Decision cells get their tier fill directly; the workbook does not rely
/// on conditional-format rules.
fn write_table(
    ws: &mut Worksheet,
    rows: &[DecoratedAd],
    header_row: u32,
    fills: &Fills,
) -> Result<(), XlsxError> {
    for (col, h) in HEADERS.iter().enumerate() {
        ws.write_string_with_format(header_row, col as u16, *h, &fills.bold)?;
    }
    for (i, d) in rows.iter().enumerate() {
        let row = header_row + 1 + i as u32;
        ws.write_string(row, 0, d.ad.ad_name.as_str())?;
        ws.write_string(row, 1, d.ad.status.as_str())?;
        ws.write_string(row, 2, d.ad.sequence.as_str())?;
        ws.write_number(row, COL_EXPENSE, d.ad.expense)?;
        ws.write_number(row, COL_GMV, d.ad.gmv)?;
        ws.write_number(row, COL_ROAS, d.ad.roas)?;
        ws.write_number(row, 6, d.ad.items)?;
        ws.write_string(row, 7, d.matched_product.as_deref().unwrap_or(""))?;
        match d.match_status {
            MatchStatus::Unmatched => {
                ws.write_string_with_format(row, COL_MATCH_STATUS, "Unmatched", &fills.amber)?;
            }
            MatchStatus::Matched => {
                ws.write_string(row, COL_MATCH_STATUS, "Matched")?;
            }
        }
        ws.write_number(row, 9, d.product_cost)?;
        ws.write_number(row, 10, d.srp_price)?;
        ws.write_number(row, COL_NET_PROFIT, d.net_profit)?;
        write_maybe_infinite(ws, row, 12, d.break_even_roas)?;
        write_maybe_infinite(ws, row, 13, d.suggested_roas)?;
        match d.decision_run_off {
            RunDecision::Run => {
                ws.write_string_with_format(row, COL_RUN_OFF, "RUN", &fills.green)?
            }
            RunDecision::Off => ws.write_string_with_format(row, COL_RUN_OFF, "OFF", &fills.red)?,
        };
        let (label, fill) = match d.decision_tier {
            Tier::Winning => ("WINNING", &fills.green),
            Tier::Optimize => ("OPTIMIZE", &fills.yellow),
            Tier::Losing => ("LOSING", &fills.red),
        };
        ws.write_string_with_format(row, COL_TIER, label, fill)?;
    }
    Ok(())
}

fn write_maybe_infinite(
    ws: &mut Worksheet,
    row: u32,
    col: u16,
    value: f64,
) -> Result<(), XlsxError> {
    if value.is_finite() {
        ws.write_number(row, col, value)?;
    } else {
        ws.write_string(row, col, "INF")?;
    }
    Ok(())
}

/// Summary block to the right of the table: totals over the data range via
/// live formulas so the sheet survives manual edits.
fn write_summary_block(
    ws: &mut Worksheet,
    n_rows: usize,
    header_row: u32,
    fills: &Fills,
) -> Result<(), XlsxError> {
    if n_rows == 0 {
        return Ok(());
    }
    let label_col = HEADERS.len() as u16 + 1;
    let value_col = label_col + 1;
    let first = header_row + 2; // 1-based first data row
    let last = header_row + 1 + n_rows as u32;
    let range = |col: u16| {
        let letter = rust_xlsxwriter::utility::column_number_to_name(col);
        format!("{letter}{first}:{letter}{last}")
    };

    ws.write_string_with_format(header_row, label_col, "Summary", &fills.bold)?;
    let items: [(&str, String); 5] = [
        ("Total GMV", format!("=SUM({})", range(COL_GMV))),
        ("Total Expense", format!("=SUM({})", range(COL_EXPENSE))),
        ("Total Net Profit", format!("=SUM({})", range(COL_NET_PROFIT))),
        ("Average ROAS", format!("=AVERAGE({})", range(COL_ROAS))),
        (
            "Winning Ads",
            format!("=COUNTIF({},\"WINNING\")", range(COL_TIER)),
        ),
    ];
    for (i, (label, formula)) in items.iter().enumerate() {
        let row = header_row + 1 + i as u32;
        ws.write_string(row, label_col, *label)?;
        ws.write_formula(row, value_col, formula.as_str())?;
    }
    Ok(())
}

/// Rough auto-fit: widest of the header and the first 100 rendered cells,
/// clamped to a readable band.
fn fit_columns(ws: &mut Worksheet, rows: &[DecoratedAd]) {
    for (col, header) in HEADERS.iter().enumerate() {
        let mut len = header.len();
        for d in rows.iter().take(100) {
            let cell_len = match col {
                0 => d.ad.ad_name.len(),
                1 => d.ad.status.len(),
                2 => d.ad.sequence.len(),
                7 => d.matched_product.as_deref().unwrap_or("").len(),
                _ => 12,
            };
            len = len.max(cell_len);
        }
        let width = (len as f64 * 0.9).clamp(10.0, 60.0);
        let _ = ws.set_column_width(col as u16, width);
    }
}
