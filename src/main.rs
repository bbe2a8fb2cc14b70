//! CLI tool that lists and extracts the embedded files of a PDF document.
//!
//! Set `RUST_LOG=pdfembeds=debug` to see why individual entries are skipped.

use pdfembeds::{ExtractError, ExtractorConfig, PdfAnalyzer, Result};
use std::{env, process};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdfembeds=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("pdfembeds");

    if args.len() < 2 || args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage(program);
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    let pdf_path = &args[1];
    let output_dir = args.get(2).map(String::as_str);

    match run(pdf_path, output_dir) {
        Ok(()) => {}
        Err(ExtractError::NoEmbeddedFiles) => println!("No embedded files found."),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn print_usage(program_name: &str) {
    println!("pdfembeds - list and extract files embedded in a PDF");
    println!();
    println!("USAGE:");
    println!("    {program_name} <pdf_file> [output_dir]");
    println!();
    println!("ARGUMENTS:");
    println!("    <pdf_file>     Path to the PDF file to inspect");
    println!("    [output_dir]   Directory to extract files to (list only when omitted)");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help     Show this help message");
}

fn run(pdf_path: &str, output_dir: Option<&str>) -> Result<()> {
    let config = ExtractorConfig {
        extract_to_disk: output_dir.is_some(),
        output_directory: output_dir.map(str::to_owned),
        max_embedded_file_size: Some(100 * 1024 * 1024),
        ..Default::default()
    };

    let analyzer = PdfAnalyzer::with_config(pdf_path, config)?;

    let listed = analyzer.embedded_file_names()?.len();
    let files = analyzer.extract_embedded_files()?;

    for (i, file) in files.iter().enumerate() {
        println!("#{} {}", i + 1, file.name);
        println!("    size : {}", format_bytes(file.content.len()));
        if !file.description.is_empty() {
            println!("    spec : {}", file.description);
        }
    }

    println!();
    println!("{} of {} listed file(s) extracted", files.len(), listed);
    let total_size: usize = files.iter().map(|f| f.content.len()).sum();
    println!("total size: {}", format_bytes(total_size));
    if let Some(dir) = output_dir {
        println!("written to: {dir}");
    }

    Ok(())
}

fn format_bytes(bytes: usize) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
