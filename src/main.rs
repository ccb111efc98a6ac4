// Entry point and high-level CLI flow.
//
// - Option [1] loads and normalizes the ads export plus the costing table,
//   printing diagnostics.
// - Option [2] asks for the profit multiplier, runs the decision engine,
//   prints KPI lines and a preview, and writes the CSV/JSON/Excel outputs.
// - After generating a report, the user can go back to the menu or exit.
mod costing;
mod engine;
mod error;
mod matcher;
mod normalize;
mod output;
mod partition;
mod types;
mod util;
mod xlsx;

use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;

use types::{AdRecord, CostRecord, ReportRow};

const DEFAULT_ADS_PATH: &str = "shopee_ads_export.csv";
const DEFAULT_COSTING_PATH: &str = "product_costing.txt";
const XLSX_PATH: &str = "roas_report.xlsx";

// Simple in-memory app state so we only load the input files once but can
// generate reports with different multipliers in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        ads: None,
        costing: None,
        delimiter: b',',
        ads_source: String::new(),
    })
});

struct AppState {
    ads: Option<Vec<AdRecord>>,
    costing: Option<Vec<CostRecord>>,
    delimiter: u8,
    ads_source: String,
}

/// Read a single line of input after printing the common "Enter choice:"
/// prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Prompt for the profit multiplier. Blank input takes the default; values
/// that are not positive finite numbers re-prompt.
fn prompt_multiplier() -> f64 {
    loop {
        print!(
            "Profit multiplier for Suggested ROAS [{}]: ",
            engine::DEFAULT_MULTIPLIER
        );
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        let trimmed = buf.trim();
        if trimmed.is_empty() {
            return engine::DEFAULT_MULTIPLIER;
        }
        match trimmed.parse::<f64>() {
            Ok(m) if m > 0.0 && m.is_finite() => return m,
            _ => println!("Invalid multiplier. Please enter a number greater than 0."),
        }
    }
}

/// Ask whether to go back to the menu after generating a report.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to menu (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn delimiter_label(d: u8) -> &'static str {
    match d {
        b',' => "comma",
        b'\t' => "tab",
        b';' => "semicolon",
        b'|' => "pipe",
        _ => "other",
    }
}

/// Handle option [1]: read and normalize both input files.
fn handle_load() {
    let ads_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ADS_PATH.to_string());
    let costing_path = std::env::args()
        .nth(2)
        .unwrap_or_else(|| DEFAULT_COSTING_PATH.to_string());

    let result = (|| -> Result<(), error::ReportError> {
        let ads_raw = std::fs::read_to_string(&ads_path)?;
        let (ads, delimiter) = normalize::normalize_ads(&ads_raw)?;
        let costing_raw = std::fs::read_to_string(&costing_path)?;
        let costing = costing::load_costing(&costing_raw, &costing_path)?;

        println!(
            "Loaded {} ads ({} delimited) and {} costing rows.\n",
            util::format_int(ads.len() as i64),
            delimiter_label(delimiter),
            util::format_int(costing.len() as i64)
        );
        let mut state = APP_STATE.lock().unwrap();
        state.ads = Some(ads);
        state.costing = Some(costing);
        state.delimiter = delimiter;
        state.ads_source = ads_path.clone();
        Ok(())
    })();
    if let Err(e) = result {
        eprintln!("Failed to load files: {}\n", e);
    }
}

/// Handle option [2]: run the engine and write every report output.
///
/// A structural error anywhere aborts the run before any file is written;
/// a failed run produces no partial report.
fn handle_generate_report() {
    let (ads, costing_rows, ads_source, delimiter) = {
        let state = APP_STATE.lock().unwrap();
        (
            state.ads.clone(),
            state.costing.clone(),
            state.ads_source.clone(),
            state.delimiter,
        )
    };
    let (Some(ads), Some(costing_rows)) = (ads, costing_rows) else {
        println!("Error: No data loaded. Please load the input files first (option 1).\n");
        return;
    };

    let multiplier = prompt_multiplier();
    let index = costing::costing_index(&costing_rows);
    let decorated = match engine::decorate_ads(&ads, &index, multiplier) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Report failed: {}\n", e);
            return;
        }
    };
    let parts = partition::partition(&decorated);
    let kpis = partition::kpi_summary(&parts.active);

    println!(
        "\nSource: {} ({} delimited), multiplier {}",
        ads_source,
        delimiter_label(delimiter),
        multiplier
    );
    println!("KPIs (active ads):");
    println!("  Total GMV:        {}", util::format_number(kpis.total_gmv, 2));
    println!("  Total Expense:    {}", util::format_number(kpis.total_expense, 2));
    println!("  Total Net Profit: {}", util::format_number(kpis.total_net_profit, 2));
    println!("  Average ROAS:     {}", util::format_number(kpis.avg_roas, 2));
    println!("  Winning / Losing: {} / {}\n", kpis.winning_ads, kpis.losing_ads);

    let active_rows: Vec<ReportRow> = parts.active.iter().map(ReportRow::from_decorated).collect();
    let deleted_rows: Vec<ReportRow> = parts.deleted.iter().map(ReportRow::from_decorated).collect();
    let unmatched_rows: Vec<ReportRow> =
        parts.unmatched.iter().map(ReportRow::from_decorated).collect();

    println!("Preview (first 5 active rows):");
    output::preview_table_rows(&active_rows, 5);

    let writes = (|| -> Result<(), error::ReportError> {
        output::write_csv("report_active.csv", &active_rows)?;
        output::write_csv("report_deleted.csv", &deleted_rows)?;
        output::write_csv("report_unmatched.csv", &unmatched_rows)?;
        output::write_json("summary.json", &kpis)?;
        xlsx::write_workbook(
            XLSX_PATH,
            &parts.active,
            &parts.deleted,
            &parts.unmatched,
            multiplier,
            &ads_source,
        )?;
        Ok(())
    })();
    match writes {
        Ok(()) => println!(
            "Wrote report_active.csv, report_deleted.csv, report_unmatched.csv, summary.json, {}\n",
            XLSX_PATH
        ),
        Err(e) => eprintln!("Write error: {}\n", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MatchStatus, RunDecision, Tier};

    #[test]
    fn full_pipeline_from_raw_text() {
        let ads_raw = "Ad Name,Status,Sequence,Expense,GMV,ROAS,Items Sold\n\
                       BIG ARMOR Promo,Ongoing,1,100,500,5,10\n\
                       Old campaign,DELETED,2,50,0,0,0\n\
                       mystery gadget,Ongoing,3,10,20,2,1\n";
        let costing_raw = "Product Name\tProduct Cost\tSRP Price\nBIG ARMOR\t20\t50\n";

        let (ads, delimiter) = normalize::normalize_ads(ads_raw).unwrap();
        assert_eq!(delimiter, b',');
        let costing = costing::load_costing(costing_raw, "costing.txt").unwrap();
        let index = costing::costing_index(&costing);
        let decorated = engine::decorate_ads(&ads, &index, 1.25).unwrap();
        let parts = partition::partition(&decorated);

        assert_eq!(parts.active.len(), 2);
        assert_eq!(parts.deleted.len(), 1);
        assert_eq!(parts.unmatched.len(), 1);
        assert_eq!(parts.unmatched[0].match_status, MatchStatus::Unmatched);

        let winner = &parts.active[0];
        assert_eq!(winner.matched_product.as_deref(), Some("BIG ARMOR"));
        assert_eq!(winner.net_profit, 200.0);
        assert_eq!(winner.decision_run_off, RunDecision::Run);
        assert_eq!(winner.decision_tier, Tier::Winning);

        let kpis = partition::kpi_summary(&parts.active);
        assert_eq!(kpis.total_gmv, 520.0);
        assert_eq!(kpis.total_expense, 110.0);
        assert_eq!(kpis.winning_ads, 1);
        assert_eq!(kpis.losing_ads, 1);
        assert!((kpis.avg_roas - 3.5).abs() < 1e-12);
    }
}

fn main() {
    loop {
        println!("Shopee Ads ROAS Report");
        println!("[1] Load files");
        println!("[2] Generate report\n");
        match read_choice().as_str() {
            "1" => handle_load(),
            "2" => {
                println!("");
                handle_generate_report();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1 or 2.\n"),
        }
    }
}
