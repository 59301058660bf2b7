use std::process;

use astro_hdb::hdb::{BlockPayload, Hdb};
use astro_hdb::HdbFile;

fn format_hdb(index: usize, hdb: &Hdb) -> String {
    let mut out = String::new();

    let label = if hdb.is_primary() {
        String::from("Primary")
    } else {
        format!("{} extension ({})", hdb.payload().xtension_name(), hdb.name())
    };
    out.push_str(&format!("HDU {}: {}\n", index, label));
    out.push_str(&format!("  BITPIX: {}\n", hdb.bitpix()));
    out.push_str(&format!("  NAXIS: {}\n", hdb.naxis()));
    if hdb.naxis() > 0 {
        out.push_str(&format!("  Dimensions: {:?}\n", hdb.axis_lengths()));
    }

    match hdb.payload() {
        BlockPayload::AsciiTable(info) | BlockPayload::BinaryTable(info) => {
            out.push_str(&format!("  Columns: {}\n", info.column_count()));
            for col in &info.columns {
                let unit = if col.unit.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", col.unit)
                };
                out.push_str(&format!("    {} ({}){}\n", col.name, col.tform, unit));
            }
        }
        BlockPayload::Astrometry(data) => {
            out.push_str(&format!(
                "  Astrometry: {} references, {} targets\n",
                data.references().len(),
                data.targets().len()
            ));
        }
        BlockPayload::Photometry(data) => {
            out.push_str(&format!("  Photometry: {} observations\n", data.len()));
        }
        BlockPayload::Image => {}
    }

    out.push_str(&format!("  Data size: {} bytes\n", hdb.data().len()));
    out
}

fn format_keywords(hdb: &Hdb) -> String {
    let mut out = String::new();
    out.push_str("  Keywords:\n");
    for keyword in hdb.keywords() {
        let value = keyword.to::<String>().unwrap_or_default();
        if keyword.comment().is_empty() {
            out.push_str(&format!("    {} = {}\n", keyword.name(), value));
        } else {
            out.push_str(&format!(
                "    {} = {} / {}\n",
                keyword.name(),
                value,
                keyword.comment()
            ));
        }
    }
    for comment in hdb.comments() {
        out.push_str(&format!("    COMMENT {}\n", comment));
    }
    for history in hdb.history() {
        out.push_str(&format!("    HISTORY {}\n", history));
    }
    out
}

fn format_file_info(file: &HdbFile, verbose: bool) -> String {
    let mut out = String::new();
    for (i, hdb) in file.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format_hdb(i, hdb));
        if verbose {
            out.push_str(&format_keywords(hdb));
        }
    }
    out
}

fn run(args: &[String]) -> Result<String, String> {
    let mut verbose = false;
    let mut file_path = None;

    for arg in args {
        if arg == "-v" || arg == "--verbose" {
            verbose = true;
        } else if arg.starts_with('-') {
            return Err(format!("Unknown option: {}", arg));
        } else {
            if file_path.is_some() {
                return Err("Too many arguments".to_string());
            }
            file_path = Some(arg.as_str());
        }
    }

    let path = file_path.ok_or_else(|| {
        "Usage: hdbinfo [-v] <file.fits>\n\nPrint a block summary for a FITS file.".to_string()
    })?;

    let file = HdbFile::open(path).map_err(|e| format!("Error reading '{}': {}", path, e))?;

    Ok(format_file_info(&file, verbose))
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(output) => print!("{}", output),
        Err(msg) => {
            eprintln!("{}", msg);
            process::exit(1);
        }
    }
}
