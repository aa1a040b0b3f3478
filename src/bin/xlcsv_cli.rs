//! CLI tool for xlcsv - converts a folder of workbooks into `<root>.zip`
//!
//! Usage:
//!   xlcsv_cli <DIR>                      # Writes ./<DIR name>.zip
//!   xlcsv_cli <DIR> -r Export -o out/    # Writes out/Export.zip
//!   xlcsv_cli <DIR> --json               # Also prints a JSON summary

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use xlcsv::discovery::discover_dir;
use xlcsv::{convert, ConvertOptions, CsvOptions, LineTerminator, RunStatus};

#[derive(Parser)]
#[command(about = "Convert every .xlsx/.xls under a folder into CSV files packed in one ZIP.")]
struct Args {
    /// Folder to convert.
    dir: PathBuf,

    /// Root folder name inside the archive (default: the folder's own name).
    #[arg(short, long)]
    root: Option<String>,

    /// Directory the archive is written to.
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Terminate rows with CRLF instead of LF.
    #[arg(long)]
    crlf: bool,

    /// Leave hidden sheets out.
    #[arg(long)]
    skip_hidden: bool,

    /// Print a JSON summary to stdout.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary<'a> {
    archive: String,
    files_converted: usize,
    entries: &'a [String],
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let files = match discover_dir(&args.dir) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error reading {}: {e}", args.dir.display());
            return ExitCode::FAILURE;
        }
    };

    let root = args.root.clone().unwrap_or_else(|| {
        files
            .first()
            .and_then(|f| f.relative_path().split('/').next())
            .unwrap_or_default()
            .to_string()
    });

    let options = ConvertOptions {
        csv: CsvOptions {
            line_terminator: if args.crlf {
                LineTerminator::CrLf
            } else {
                LineTerminator::Lf
            },
            ..CsvOptions::default()
        },
        skip_hidden_sheets: args.skip_hidden,
    };

    let output = match convert(files, &root, options, |pct| log::debug!("{pct}%")) {
        RunStatus::Success(output) => output,
        RunStatus::ValidationError(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
        RunStatus::Failed { message, file, .. } => {
            match file {
                Some(path) => eprintln!("Error converting {path}: {message}"),
                None => eprintln!("Error: {message}"),
            }
            return ExitCode::FAILURE;
        }
    };

    let target = args.out_dir.join(&output.file_name);
    if let Err(e) = fs::create_dir_all(&args.out_dir).and_then(|()| fs::write(&target, &output.archive))
    {
        eprintln!("Error writing {}: {e}", target.display());
        return ExitCode::FAILURE;
    }
    eprintln!("Written: {}", target.display());

    if args.json {
        let summary = Summary {
            archive: target.display().to_string(),
            files_converted: output.files_converted,
            entries: &output.entries,
        };
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing JSON: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
