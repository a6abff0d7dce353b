//! Command-line accessibility checker for PDF files.

use std::process::ExitCode;

use pdfwam::{check_file, techniques, Report, Status};

const USAGE: &str = "Usage: pdfwam [OPTIONS] <file.pdf>

Options:
  --json          emit the report as JSON
  --sequential    evaluate techniques one at a time
  --list          list the technique catalog and exit
  -h, --help      show this help";

fn main() -> ExitCode {
    env_logger::init();

    let mut json = false;
    let mut sequential = false;
    let mut file: Option<String> = None;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "--sequential" => sequential = true,
            "--list" => {
                for technique in techniques::registry() {
                    println!("{:<18} {}", technique.id(), technique.description());
                }
                return ExitCode::SUCCESS;
            }
            "-h" | "--help" => {
                println!("{}", USAGE);
                return ExitCode::SUCCESS;
            }
            other if other.starts_with('-') => {
                eprintln!("unknown option: {}\n{}", other, USAGE);
                return ExitCode::from(3);
            }
            other => {
                if file.replace(other.to_string()).is_some() {
                    eprintln!("only one input file is supported\n{}", USAGE);
                    return ExitCode::from(3);
                }
            }
        }
    }

    let file = match file {
        Some(f) => f,
        None => {
            eprintln!("{}", USAGE);
            return ExitCode::from(3);
        }
    };

    let report = match run(&file, sequential) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}: could not be checked: {}", file, e);
            return ExitCode::from(3);
        }
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("failed to serialize report: {}", e);
                return ExitCode::from(3);
            }
        }
    } else {
        print_report(&file, &report);
    }

    ExitCode::from(report.exit_code() as u8)
}

fn run(file: &str, sequential: bool) -> pdfwam::Result<Report> {
    if !sequential {
        return check_file(file);
    }
    let bytes = std::fs::read(file)?;
    let graph = pdfwam::ObjectGraph::load(&bytes)?;
    let model = pdfwam::ModelBuilder::new(&graph).build()?;
    let entries = pdfwam::EvaluationEngine::new()
        .with_parallel(false)
        .run(&model, &techniques::registry());
    Ok(Report::aggregate(entries))
}

fn print_report(file: &str, report: &Report) {
    println!("{}", file);
    println!("overall: {}", report.overall);
    println!();
    for entry in &report.entries {
        println!(
            "  {:<18} {:<15} {}",
            entry.technique_id, entry.verdict.status, entry.verdict.message
        );
        for item in &entry.verdict.items {
            match item.page {
                Some(page) => println!("      page {}: {}", page, item.detail),
                None => println!("      {}", item.detail),
            }
        }
    }
    let failed = report.with_status(Status::Fail).count();
    let errored = report.with_status(Status::Error).count();
    println!();
    println!(
        "{} checks, {} failed, {} errored",
        report.entries.len(),
        failed,
        errored
    );
}
