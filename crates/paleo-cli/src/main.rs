// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use paleo_cli::parse_record_csv;
use paleo_core::{AgeGrid, PaleoError, ProxyRecord};
use paleo_detect::{detect_changepoints, PeltConfig};
use paleo_filter::filter_record;
use paleo_resample::{bin_records, interpolate, InterpMethod};
use paleo_stats::{rolling_correlation, CorrMethod, RollingConfig, WindowCorrelation};
use serde::Serialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

const DEFAULT_FILTER_ORDER: usize = 4;

struct Cli {
    command: Command,
}

enum Command {
    Bin(BinArgs),
    Interp(InterpArgs),
    Filter(FilterArgs),
    Corr(CorrArgs),
    Detect(DetectArgs),
}

#[derive(Debug, Default)]
struct GridArgs {
    start: Option<f64>,
    end: Option<f64>,
    step: Option<f64>,
}

impl GridArgs {
    fn resolve(&self) -> Result<AgeGrid, CliError> {
        let start = self
            .start
            .ok_or_else(|| CliError::invalid_input("--start is required"))?;
        let end = self
            .end
            .ok_or_else(|| CliError::invalid_input("--end is required"))?;
        let step = self
            .step
            .ok_or_else(|| CliError::invalid_input("--step is required"))?;
        Ok(AgeGrid::new(start, end, step)?)
    }
}

#[derive(Debug, Default)]
struct BinArgs {
    inputs: Vec<PathBuf>,
    grid: GridArgs,
    output: Option<PathBuf>,
}

#[derive(Debug)]
struct InterpArgs {
    input: PathBuf,
    grid: GridArgs,
    method: InterpMethod,
    output: Option<PathBuf>,
}

impl Default for InterpArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            grid: GridArgs::default(),
            method: InterpMethod::Linear,
            output: None,
        }
    }
}

#[derive(Debug)]
struct FilterArgs {
    input: PathBuf,
    grid: GridArgs,
    cutoff: Option<f64>,
    order: usize,
    output: Option<PathBuf>,
}

impl Default for FilterArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            grid: GridArgs::default(),
            cutoff: None,
            order: DEFAULT_FILTER_ORDER,
            output: None,
        }
    }
}

#[derive(Debug)]
struct CorrArgs {
    inputs: Vec<PathBuf>,
    grid: GridArgs,
    window: Option<f64>,
    corr_step: Option<f64>,
    method: CorrMethod,
    output: Option<PathBuf>,
}

impl Default for CorrArgs {
    fn default() -> Self {
        Self {
            inputs: vec![],
            grid: GridArgs::default(),
            window: None,
            corr_step: None,
            method: CorrMethod::Pearson,
            output: None,
        }
    }
}

#[derive(Debug)]
struct DetectArgs {
    input: PathBuf,
    grid: GridArgs,
    penalty: Option<f64>,
    min_segment_len: Option<usize>,
    output: Option<PathBuf>,
}

impl Default for DetectArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            grid: GridArgs::default(),
            penalty: None,
            min_segment_len: None,
            output: None,
        }
    }
}

#[derive(Debug)]
enum CliError {
    Paleo(PaleoError),
    Io {
        context: String,
        source: std::io::Error,
    },
    Json {
        context: String,
        source: serde_json::Error,
    },
    InvalidInput(String),
}

impl CliError {
    fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Paleo(PaleoError::InvalidInput(_)) | Self::InvalidInput(_) => "invalid_input",
            Self::Paleo(PaleoError::NumericalIssue(_)) => "numerical_issue",
            Self::Paleo(PaleoError::NotSupported(_)) => "not_supported",
            Self::Io { .. } => "io_error",
            Self::Json { .. } => "json_error",
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paleo(err) => write!(f, "{err}"),
            Self::Io { context, source } => write!(f, "{context}: {source}"),
            Self::Json { context, source } => write!(f, "{context}: {source}"),
            Self::InvalidInput(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Paleo(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::InvalidInput(_) => None,
        }
    }
}

impl From<PaleoError> for CliError {
    fn from(value: PaleoError) -> Self {
        Self::Paleo(value)
    }
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Serialize)]
struct ErrorPayload {
    code: String,
    message: String,
}

#[derive(Serialize)]
struct NamedColumn {
    name: String,
    values: Vec<f64>,
}

#[derive(Serialize)]
struct BinPayload {
    ages: Vec<f64>,
    columns: Vec<NamedColumn>,
}

#[derive(Serialize)]
struct InterpPayload {
    method: &'static str,
    ages: Vec<f64>,
    values: Vec<f64>,
}

#[derive(Serialize)]
struct FilterPayload {
    cutoff_period: f64,
    order: usize,
    ages: Vec<f64>,
    values: Vec<f64>,
}

#[derive(Serialize)]
struct CorrPayload {
    method: &'static str,
    window: f64,
    step: f64,
    windows: Vec<WindowCorrelation>,
}

fn main() {
    if let Err(err) = run() {
        emit_structured_error(&err);
        process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let Some(cli) = parse_cli_from_env()? else {
        return Ok(());
    };

    match cli.command {
        Command::Bin(args) => handle_bin(args),
        Command::Interp(args) => handle_interp(args),
        Command::Filter(args) => handle_filter(args),
        Command::Corr(args) => handle_corr(args),
        Command::Detect(args) => handle_detect(args),
    }
}

fn parse_cli_from_env() -> Result<Option<Cli>, CliError> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        print_root_help();
        return Ok(None);
    }

    if matches!(args[0].as_str(), "-h" | "--help") {
        print_root_help();
        return Ok(None);
    }
    if matches!(args[0].as_str(), "-V" | "--version") {
        print_version();
        return Ok(None);
    }

    let command_name = args[0].clone();
    let rest = &args[1..];

    if rest
        .iter()
        .any(|arg| matches!(arg.as_str(), "-h" | "--help"))
    {
        print_command_help(command_name.as_str())?;
        return Ok(None);
    }

    let command = match command_name.as_str() {
        "bin" => Command::Bin(parse_bin_args(rest)?),
        "interp" => Command::Interp(parse_interp_args(rest)?),
        "filter" => Command::Filter(parse_filter_args(rest)?),
        "corr" => Command::Corr(parse_corr_args(rest)?),
        "detect" => Command::Detect(parse_detect_args(rest)?),
        _ => {
            return Err(CliError::invalid_input(format!(
                "unknown command '{command_name}'; expected one of: bin, interp, filter, corr, detect"
            )));
        }
    };

    Ok(Some(Cli { command }))
}

fn parse_bin_args(tokens: &[String]) -> Result<BinArgs, CliError> {
    let mut args = BinArgs::default();
    let mut idx = 0usize;
    while idx < tokens.len() {
        let (flag, inline_value) = split_flag(tokens[idx].as_str())?;
        match flag {
            "--input" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.inputs.push(PathBuf::from(raw));
            }
            "--start" | "--end" | "--step" => {
                parse_grid_flag(&mut args.grid, flag, inline_value, tokens, &mut idx)?;
            }
            "--output" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.output = Some(PathBuf::from(raw));
            }
            other => {
                return Err(CliError::invalid_input(format!(
                    "unknown bin option '{other}'"
                )));
            }
        }
        idx += 1;
    }

    if args.inputs.is_empty() {
        return Err(CliError::invalid_input("bin requires at least one --input"));
    }
    Ok(args)
}

fn parse_interp_args(tokens: &[String]) -> Result<InterpArgs, CliError> {
    let mut args = InterpArgs::default();
    let mut idx = 0usize;
    while idx < tokens.len() {
        let (flag, inline_value) = split_flag(tokens[idx].as_str())?;
        match flag {
            "--input" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.input = PathBuf::from(raw);
            }
            "--start" | "--end" | "--step" => {
                parse_grid_flag(&mut args.grid, flag, inline_value, tokens, &mut idx)?;
            }
            "--method" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.method = InterpMethod::parse(raw.to_ascii_lowercase().as_str())?;
            }
            "--output" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.output = Some(PathBuf::from(raw));
            }
            other => {
                return Err(CliError::invalid_input(format!(
                    "unknown interp option '{other}'"
                )));
            }
        }
        idx += 1;
    }

    if args.input.as_os_str().is_empty() {
        return Err(CliError::invalid_input("--input is required"));
    }
    Ok(args)
}

fn parse_filter_args(tokens: &[String]) -> Result<FilterArgs, CliError> {
    let mut args = FilterArgs::default();
    let mut idx = 0usize;
    while idx < tokens.len() {
        let (flag, inline_value) = split_flag(tokens[idx].as_str())?;
        match flag {
            "--input" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.input = PathBuf::from(raw);
            }
            "--start" | "--end" | "--step" => {
                parse_grid_flag(&mut args.grid, flag, inline_value, tokens, &mut idx)?;
            }
            "--cutoff" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.cutoff = Some(parse_f64_arg(raw.as_str(), flag)?);
            }
            "--order" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.order = parse_usize_arg(raw.as_str(), flag)?;
            }
            "--output" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.output = Some(PathBuf::from(raw));
            }
            other => {
                return Err(CliError::invalid_input(format!(
                    "unknown filter option '{other}'"
                )));
            }
        }
        idx += 1;
    }

    if args.input.as_os_str().is_empty() {
        return Err(CliError::invalid_input("--input is required"));
    }
    if args.cutoff.is_none() {
        return Err(CliError::invalid_input("--cutoff is required"));
    }
    Ok(args)
}

fn parse_corr_args(tokens: &[String]) -> Result<CorrArgs, CliError> {
    let mut args = CorrArgs::default();
    let mut idx = 0usize;
    while idx < tokens.len() {
        let (flag, inline_value) = split_flag(tokens[idx].as_str())?;
        match flag {
            "--input" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.inputs.push(PathBuf::from(raw));
            }
            "--start" | "--end" | "--step" => {
                parse_grid_flag(&mut args.grid, flag, inline_value, tokens, &mut idx)?;
            }
            "--window" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.window = Some(parse_f64_arg(raw.as_str(), flag)?);
            }
            "--corr-step" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.corr_step = Some(parse_f64_arg(raw.as_str(), flag)?);
            }
            "--method" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.method = CorrMethod::parse(raw.to_ascii_lowercase().as_str())?;
            }
            "--output" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.output = Some(PathBuf::from(raw));
            }
            other => {
                return Err(CliError::invalid_input(format!(
                    "unknown corr option '{other}'"
                )));
            }
        }
        idx += 1;
    }

    if args.inputs.len() != 2 {
        return Err(CliError::invalid_input(format!(
            "corr requires exactly two --input files; got {}",
            args.inputs.len()
        )));
    }
    if args.window.is_none() {
        return Err(CliError::invalid_input("--window is required"));
    }
    Ok(args)
}

fn parse_detect_args(tokens: &[String]) -> Result<DetectArgs, CliError> {
    let mut args = DetectArgs::default();
    let mut idx = 0usize;
    while idx < tokens.len() {
        let (flag, inline_value) = split_flag(tokens[idx].as_str())?;
        match flag {
            "--input" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.input = PathBuf::from(raw);
            }
            "--start" | "--end" | "--step" => {
                parse_grid_flag(&mut args.grid, flag, inline_value, tokens, &mut idx)?;
            }
            "--penalty" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.penalty = Some(parse_f64_arg(raw.as_str(), flag)?);
            }
            "--min-segment-len" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.min_segment_len = Some(parse_usize_arg(raw.as_str(), flag)?);
            }
            "--output" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.output = Some(PathBuf::from(raw));
            }
            other => {
                return Err(CliError::invalid_input(format!(
                    "unknown detect option '{other}'"
                )));
            }
        }
        idx += 1;
    }

    if args.input.as_os_str().is_empty() {
        return Err(CliError::invalid_input("--input is required"));
    }
    if args.penalty.is_none() {
        return Err(CliError::invalid_input("--penalty is required"));
    }
    Ok(args)
}

fn parse_grid_flag(
    grid: &mut GridArgs,
    flag: &str,
    inline_value: Option<String>,
    tokens: &[String],
    idx: &mut usize,
) -> Result<(), CliError> {
    let raw = take_flag_value(flag, inline_value, tokens, idx)?;
    let value = parse_f64_arg(raw.as_str(), flag)?;
    match flag {
        "--start" => grid.start = Some(value),
        "--end" => grid.end = Some(value),
        "--step" => grid.step = Some(value),
        _ => unreachable!("parse_grid_flag called with non-grid flag"),
    }
    Ok(())
}

fn handle_bin(args: BinArgs) -> Result<(), CliError> {
    let grid = args.grid.resolve()?;
    let records: Vec<(String, ProxyRecord)> = args
        .inputs
        .iter()
        .map(|path| Ok((column_name(path), load_record(path)?)))
        .collect::<Result<_, CliError>>()?;

    let named: Vec<(&str, &ProxyRecord)> = records
        .iter()
        .map(|(name, record)| (name.as_str(), record))
        .collect();
    let table = bin_records(&named, &grid)?;

    let columns = table
        .column_names()
        .into_iter()
        .map(|name| NamedColumn {
            name: name.to_string(),
            values: table.column(name).unwrap_or_default().to_vec(),
        })
        .collect();
    let payload = BinPayload {
        ages: table.ages().to_vec(),
        columns,
    };
    write_json_output(&payload, args.output.as_deref())
}

fn handle_interp(args: InterpArgs) -> Result<(), CliError> {
    let grid = args.grid.resolve()?;
    let record = load_record(&args.input)?;
    let values = interpolate(&record, &grid, args.method)?;

    let payload = InterpPayload {
        method: match args.method {
            InterpMethod::Linear => "linear",
            InterpMethod::Pchip => "pchip",
        },
        ages: grid.ages(),
        values,
    };
    write_json_output(&payload, args.output.as_deref())
}

fn handle_filter(args: FilterArgs) -> Result<(), CliError> {
    let grid = args.grid.resolve()?;
    let cutoff = args.cutoff.unwrap_or_default();
    let record = load_record(&args.input)?;
    let values = filter_record(&record, &grid, cutoff, args.order)?;

    let payload = FilterPayload {
        cutoff_period: cutoff,
        order: args.order,
        ages: grid.ages(),
        values,
    };
    write_json_output(&payload, args.output.as_deref())
}

fn handle_corr(args: CorrArgs) -> Result<(), CliError> {
    let grid = args.grid.resolve()?;
    let window = args.window.unwrap_or_default();
    let step = args.corr_step.unwrap_or_else(|| grid.step());

    let left = load_record(&args.inputs[0])?;
    let right = load_record(&args.inputs[1])?;
    let x = interpolate(&left, &grid, InterpMethod::Linear)?;
    let y = interpolate(&right, &grid, InterpMethod::Linear)?;

    let config = RollingConfig {
        window,
        step,
        method: args.method,
    };
    let windows = rolling_correlation(&grid.ages(), &x, &y, &config)?;

    let payload = CorrPayload {
        method: match args.method {
            CorrMethod::Pearson => "pearson",
            CorrMethod::Spearman => "spearman",
        },
        window,
        step,
        windows,
    };
    write_json_output(&payload, args.output.as_deref())
}

fn handle_detect(args: DetectArgs) -> Result<(), CliError> {
    let grid = args.grid.resolve()?;
    let record = load_record(&args.input)?;
    let values = interpolate(&record, &grid, InterpMethod::Linear)?;

    let mut config = PeltConfig::new(args.penalty.unwrap_or_default());
    if let Some(min_segment_len) = args.min_segment_len {
        config.min_segment_len = min_segment_len;
    }
    let result = detect_changepoints(&grid.ages(), &values, &config)?;

    write_json_output(&result, args.output.as_deref())
}

fn column_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("series")
        .to_string()
}

fn load_record(path: &Path) -> Result<ProxyRecord, CliError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| CliError::io(format!("failed to read '{}'", path.display()), source))?;
    Ok(parse_record_csv(raw.as_str())?)
}

fn split_flag(token: &str) -> Result<(&str, Option<String>), CliError> {
    if !token.starts_with("--") {
        return Err(CliError::invalid_input(format!(
            "unexpected positional argument '{token}'; expected --flag value"
        )));
    }
    if let Some((flag, value)) = token.split_once('=') {
        return Ok((flag, Some(value.to_string())));
    }
    Ok((token, None))
}

fn take_flag_value(
    flag: &str,
    inline_value: Option<String>,
    tokens: &[String],
    idx: &mut usize,
) -> Result<String, CliError> {
    if let Some(value) = inline_value {
        return Ok(value);
    }

    *idx += 1;
    let value = tokens
        .get(*idx)
        .ok_or_else(|| CliError::invalid_input(format!("{flag} requires a value")))?;
    if value.starts_with("--") {
        return Err(CliError::invalid_input(format!(
            "{flag} requires a value, but got option '{value}'"
        )));
    }
    Ok(value.clone())
}

fn parse_usize_arg(raw: &str, flag: &str) -> Result<usize, CliError> {
    raw.parse::<usize>()
        .map_err(|_| CliError::invalid_input(format!("{flag} expects an integer, got '{raw}'")))
}

fn parse_f64_arg(raw: &str, flag: &str) -> Result<f64, CliError> {
    raw.parse::<f64>()
        .map_err(|_| CliError::invalid_input(format!("{flag} expects a number, got '{raw}'")))
}

fn print_version() {
    println!("paleo {}", env!("CARGO_PKG_VERSION"));
}

fn print_root_help() {
    println!(
        "paleo {}\n\nUSAGE:\n  paleo <COMMAND> [OPTIONS]\n\nCOMMANDS:\n  bin      Bin one or more records onto a uniform age grid\n  interp   Interpolate a record onto a uniform age grid\n  filter   Low-pass filter a record on a uniform age grid\n  corr     Sliding-window correlation of two records\n  detect   Change-point detection over a resampled record\n\nGLOBAL OPTIONS:\n  -h, --help      Show help\n  -V, --version   Show version\n\nRun 'paleo <COMMAND> --help' for subcommand options.",
        env!("CARGO_PKG_VERSION")
    );
}

fn print_command_help(command: &str) -> Result<(), CliError> {
    match command {
        "bin" => {
            println!(
                "USAGE:\n  paleo bin --input <path> [--input <path> ...] --start <f> --end <f> --step <f> [OPTIONS]\n\nOPTIONS:\n  --input <path>     Two-column age,value CSV (repeatable)\n  --start <float>    Grid start age\n  --end <float>      Grid end age\n  --step <float>     Grid step; bin half-window is step/2\n  --output <path>    Write JSON output to file"
            );
        }
        "interp" => {
            println!(
                "USAGE:\n  paleo interp --input <path> --start <f> --end <f> --step <f> [OPTIONS]\n\nOPTIONS:\n  --input <path>            Two-column age,value CSV\n  --start <float>           Grid start age\n  --end <float>             Grid end age\n  --step <float>            Grid step\n  --method <linear|pchip>   Default: linear\n  --output <path>           Write JSON output to file"
            );
        }
        "filter" => {
            println!(
                "USAGE:\n  paleo filter --input <path> --start <f> --end <f> --step <f> --cutoff <f> [OPTIONS]\n\nOPTIONS:\n  --input <path>     Two-column age,value CSV\n  --start <float>    Grid start age\n  --end <float>      Grid end age\n  --step <float>     Grid step (sampling interval)\n  --cutoff <float>   Cutoff period in age units\n  --order <usize>    Butterworth order; default: 4\n  --output <path>    Write JSON output to file"
            );
        }
        "corr" => {
            println!(
                "USAGE:\n  paleo corr --input <a.csv> --input <b.csv> --start <f> --end <f> --step <f> --window <f> [OPTIONS]\n\nOPTIONS:\n  --input <path>                 Exactly two two-column age,value CSVs\n  --start <float>                Grid start age\n  --end <float>                  Grid end age\n  --step <float>                 Grid step\n  --window <float>               Window width in age units\n  --corr-step <float>            Window advance; default: grid step\n  --method <pearson|spearman>    Default: pearson\n  --output <path>                Write JSON output to file"
            );
        }
        "detect" => {
            println!(
                "USAGE:\n  paleo detect --input <path> --start <f> --end <f> --step <f> --penalty <f> [OPTIONS]\n\nOPTIONS:\n  --input <path>             Two-column age,value CSV\n  --start <float>            Grid start age\n  --end <float>              Grid end age\n  --step <float>             Grid step\n  --penalty <float>          Per-change penalty; larger means fewer changes\n  --min-segment-len <usize>  Default: 2\n  --output <path>            Write JSON output to file"
            );
        }
        other => {
            return Err(CliError::invalid_input(format!(
                "unknown command '{other}'; expected one of: bin, interp, filter, corr, detect"
            )));
        }
    }
    Ok(())
}

fn write_json_output<T: Serialize>(
    payload: &T,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let encoded = serde_json::to_string_pretty(payload).map_err(|source| CliError::Json {
        context: "failed to serialize JSON output".to_string(),
        source,
    })?;

    if let Some(path) = output_path {
        fs::write(path, format!("{encoded}\n"))
            .map_err(|source| CliError::io(format!("failed to write '{}'", path.display()), source))
    } else {
        println!("{encoded}");
        Ok(())
    }
}

fn emit_structured_error(err: &CliError) {
    let envelope = ErrorEnvelope {
        error: ErrorPayload {
            code: err.code().to_string(),
            message: err.to_string(),
        },
    };

    match serde_json::to_string_pretty(&envelope) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!(
            "{{\"error\":{{\"code\":\"{}\",\"message\":\"{}\"}}}}",
            err.code(),
            err
        ),
    }
}
