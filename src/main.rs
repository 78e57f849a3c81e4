//! Page Replacement Simulator - Main Entry Point
//!
//! Usage: page-replacement [OPTIONS] [trace_file]
//!
//! Arguments:
//!   trace_file  - Line 1: page numbers, line 2 (optional): 0/1 access modes
//!
//! Options:
//!   -a, --algorithm <name>   opt, fifo, lru, clock, eclock or all (default)
//!   -f, --frames <list>      Physical frame numbers, comma separated
//!   -n, --frame-count <N>    Use frames 0..N instead of a list
//!   -p, --page-size <bytes>  Page size
//!   -l, --logic-size <bytes> Logical address space size
//!   -w, --window <N>         Access-field window
//!   -r, --random [N]         Generate N random accesses (default 300)
//!       --write-ratio <x>    Probability of a write in random traces
//!       --seed <u64>         Seed for random traces
//!   -t, --table              Print frame and page tables per algorithm
//!   -o, --output <file>      Write the fault summary to a file
//!   -v, --verbose            Log run summaries, -vv every access
//!   -h, --help               Print help information

use std::env;
use std::process;
use std::str::FromStr;

use log::{warn, LevelFilter, Metadata, Record};

use page_replacement::constants::*;
use page_replacement::io::{generate_trace, write_report, TraceData};
use page_replacement::report::{frame_table, page_table, summary_table};
use page_replacement::{compare, Access, PolicyKind, Process, SimError};

/// Command-line configuration
struct Config {
    trace_file: Option<String>,
    algorithms: Vec<PolicyKind>,
    frame_list: Vec<usize>,
    page_size: usize,
    logic_size: usize,
    window: Option<usize>,
    random: Option<usize>,
    write_ratio: f64,
    seed: Option<u64>,
    show_tables: bool,
    output_file: Option<String>,
    verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            trace_file: None,
            algorithms: PolicyKind::ALL.to_vec(),
            frame_list: DEFAULT_FRAME_LIST.to_vec(),
            page_size: DEFAULT_PAGE_SIZE,
            logic_size: DEFAULT_LOGIC_SIZE,
            window: None,
            random: None,
            write_ratio: DEFAULT_WRITE_RATIO,
            seed: None,
            show_tables: false,
            output_file: None,
            verbosity: 0,
        }
    }
}

/// Writes log records to stderr
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:>5}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// `-v` shows run summaries, `-vv` every fault, eviction and hit
fn log_level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Trace,
    }
}

fn init_logger(verbosity: u8) {
    // a logger can only be installed once per process
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log_level(verbosity));
    }
}

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };
    init_logger(config.verbosity);

    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn print_help(program: &str) {
    eprintln!("Page Replacement Simulator - Compares demand-paging replacement algorithms");
    eprintln!();
    eprintln!("Usage: {} [OPTIONS] [trace_file]", program);
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  trace_file  - Line 1: page numbers, line 2 (optional): 0/1 access modes");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -a, --algorithm <name>   opt, fifo, lru, clock, eclock or all (default)");
    eprintln!("  -f, --frames <list>      Physical frame numbers, comma separated (default 3,5,8,10)");
    eprintln!("  -n, --frame-count <N>    Use frames 0..N instead of a list");
    eprintln!("  -p, --page-size <bytes>  Page size (default {})", DEFAULT_PAGE_SIZE);
    eprintln!("  -l, --logic-size <bytes> Logical address space (default {})", DEFAULT_LOGIC_SIZE);
    eprintln!("  -w, --window <N>         Clear access bits older than N accesses");
    eprintln!("  -r, --random [N]         Generate N random accesses instead of reading a file (default {})", DEFAULT_RANDOM_LENGTH);
    eprintln!("      --write-ratio <x>    Write probability for random traces (default {})", DEFAULT_WRITE_RATIO);
    eprintln!("      --seed <u64>         Seed for random traces");
    eprintln!("  -t, --table              Print frame and page tables per algorithm");
    eprintln!("  -o, --output <file>      Write the fault summary to a file");
    eprintln!("  -v, --verbose            Log run summaries, -vv every access");
    eprintln!("  -h, --help               Print this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} -a lru -n 3 trace.txt", program);
    eprintln!("  {} -r --seed 7 -t", program);
}

fn parse_value<T: FromStr>(flag: &str, value: Option<&String>) -> Result<T, SimError> {
    let value = value.ok_or_else(|| SimError::InvalidConfig(format!("{} needs a value", flag)))?;
    value
        .parse()
        .map_err(|_| SimError::InvalidConfig(format!("Invalid value for {}: {}", flag, value)))
}

fn parse_frame_list(flag: &str, value: Option<&String>) -> Result<Vec<usize>, SimError> {
    let value = value.ok_or_else(|| SimError::InvalidConfig(format!("{} needs a value", flag)))?;
    value
        .split(',')
        .map(|s| {
            s.trim()
                .parse()
                .map_err(|_| SimError::InvalidConfig(format!("Invalid frame number: {}", s)))
        })
        .collect()
}

fn parse_args() -> Result<Config, String> {
    let args: Vec<String> = env::args().collect();
    let program = &args[0];
    parse_config(program, &args[1..]).map_err(|e| e.to_string())
}

fn parse_config(program: &str, args: &[String]) -> Result<Config, SimError> {
    let mut config = Config::default();
    let mut positional: Vec<&String> = Vec::new();
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help(program);
                process::exit(0);
            }
            "-a" | "--algorithm" => {
                let name: String = parse_value(arg, iter.next())?;
                config.algorithms = if name.eq_ignore_ascii_case("all") {
                    PolicyKind::ALL.to_vec()
                } else {
                    vec![name.parse()?]
                };
            }
            "-f" | "--frames" => config.frame_list = parse_frame_list(arg, iter.next())?,
            "-n" | "--frame-count" => {
                let count: usize = parse_value(arg, iter.next())?;
                config.frame_list = (0..count).collect();
            }
            "-p" | "--page-size" => config.page_size = parse_value(arg, iter.next())?,
            "-l" | "--logic-size" => config.logic_size = parse_value(arg, iter.next())?,
            "-w" | "--window" => config.window = Some(parse_value(arg, iter.next())?),
            "-r" | "--random" => {
                // the length is optional; a following flag or file name is not consumed
                let has_length = iter.peek().is_some_and(|next| next.parse::<usize>().is_ok());
                let length = if has_length {
                    parse_value(arg, iter.next())?
                } else {
                    DEFAULT_RANDOM_LENGTH
                };
                config.random = Some(length);
            }
            "--write-ratio" => config.write_ratio = parse_value(arg, iter.next())?,
            "--seed" => config.seed = Some(parse_value(arg, iter.next())?),
            "-t" | "--table" => config.show_tables = true,
            "-o" | "--output" => config.output_file = Some(parse_value(arg, iter.next())?),
            "-v" | "--verbose" => config.verbosity += 1,
            "-vv" => config.verbosity += 2,
            _ if arg.starts_with('-') => {
                return Err(SimError::InvalidConfig(format!(
                    "Unknown option: {}\nUse --help for usage information.",
                    arg
                )));
            }
            _ => positional.push(arg),
        }
    }

    match (positional.len(), config.random) {
        (0, Some(_)) => {}
        (1, None) => config.trace_file = Some(positional[0].clone()),
        (0, None) => {
            return Err(SimError::InvalidConfig(
                "Expected a trace file or --random <N>".to_string(),
            ));
        }
        _ => {
            return Err(SimError::InvalidConfig(format!(
                "Expected one trace file or --random, got {} arguments",
                positional.len()
            )));
        }
    }

    Ok(config)
}

fn load_trace(config: &Config, total_pages: usize) -> Result<Vec<Access>, SimError> {
    match (&config.trace_file, config.random) {
        (_, Some(length)) => generate_trace(length, total_pages, config.write_ratio, config.seed),
        (Some(path), None) => {
            if config.seed.is_some() {
                warn!("--seed has no effect without --random");
            }
            Ok(TraceData::from_file(path)?.accesses())
        }
        (None, None) => Err(SimError::InvalidConfig("no trace source".to_string())),
    }
}

/// Main logic separated from main() for cleaner error handling
fn run(config: &Config) -> Result<(), SimError> {
    let process = Process::new(DEFAULT_PID, config.frame_list.clone(), config.logic_size, config.page_size)?
        .with_window(config.window);
    let trace = load_trace(config, process.total_pages())?;

    if config.verbosity > 0 {
        eprintln!("{}", process);
        eprintln!("Trace length: {}", trace.len());
        eprintln!();
    }

    let runs = compare(&process, &trace, &config.algorithms)?;

    if config.show_tables {
        for run in &runs {
            println!("--------------- {} ---------------", run.summary.policy);
            println!("{}", frame_table(&process, run));
            println!("{}", page_table(&process, &run.page_table));
        }
    }

    let summaries: Vec<_> = runs.iter().map(|r| &r.summary).collect();
    let table = summary_table(&summaries);
    println!("{}", table);

    if let Some(path) = &config.output_file {
        write_report(path, &table)?;
        if config.verbosity > 0 {
            eprintln!("Summary written to: {}", path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_defaults() {
        let config = parse_config("prog", &args(&["trace.txt"])).unwrap();
        assert_eq!(config.trace_file.as_deref(), Some("trace.txt"));
        assert_eq!(config.algorithms, PolicyKind::ALL.to_vec());
        assert_eq!(config.frame_list, DEFAULT_FRAME_LIST.to_vec());
        assert_eq!(config.verbosity, 0);
    }

    #[test]
    fn test_parse_options() {
        let config = parse_config(
            "prog",
            &args(&["-a", "lru", "-f", "1, 4,9", "-w", "3", "-r", "40", "--seed", "5", "-v", "-t"]),
        )
        .unwrap();
        assert_eq!(config.algorithms, vec![PolicyKind::Lru]);
        assert_eq!(config.frame_list, vec![1, 4, 9]);
        assert_eq!(config.window, Some(3));
        assert_eq!(config.random, Some(40));
        assert_eq!(config.seed, Some(5));
        assert!(config.show_tables);
        assert_eq!(config.verbosity, 1);
        assert!(config.trace_file.is_none());
    }

    #[test]
    fn test_parse_bare_random_uses_default_length() {
        let config = parse_config("prog", &args(&["-r", "--seed", "2"])).unwrap();
        assert_eq!(config.random, Some(DEFAULT_RANDOM_LENGTH));
        assert_eq!(config.seed, Some(2));

        let config = parse_config("prog", &args(&["-n", "3", "--random"])).unwrap();
        assert_eq!(config.random, Some(DEFAULT_RANDOM_LENGTH));
        assert_eq!(config.frame_list, vec![0, 1, 2]);
    }

    #[test]
    fn test_log_level_for_verbosity() {
        assert_eq!(log_level(0), LevelFilter::Warn);
        assert_eq!(log_level(1), LevelFilter::Info);
        // -vv counts as two
        let config = parse_config("prog", &args(&["-vv", "t.txt"])).unwrap();
        assert_eq!(log_level(config.verbosity), LevelFilter::Trace);
        assert_eq!(log_level(5), LevelFilter::Trace);
    }

    #[test]
    fn test_parse_frame_count() {
        let config = parse_config("prog", &args(&["-n", "3", "t.txt"])).unwrap();
        assert_eq!(config.frame_list, vec![0, 1, 2]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_config("prog", &args(&[])).is_err());
        assert!(parse_config("prog", &args(&["a", "b"])).is_err());
        assert!(parse_config("prog", &args(&["--bogus", "a"])).is_err());
        assert!(parse_config("prog", &args(&["-a", "mru", "a"])).is_err());
        assert!(parse_config("prog", &args(&["-n"])).is_err());
        assert!(parse_config("prog", &args(&["-f", "1,x", "a"])).is_err());
    }

    #[test]
    fn test_load_random_trace_within_address_space() {
        let config = parse_config("prog", &args(&["-r", "100", "--seed", "9"])).unwrap();
        let trace = load_trace(&config, 10).unwrap();
        assert_eq!(trace.len(), 100);
        assert!(trace.iter().all(|a| a.page < 10));
    }

    #[test]
    fn test_run_random_trace() {
        let config = parse_config("prog", &args(&["-r", "50", "--seed", "3", "-n", "3"])).unwrap();
        assert!(run(&config).is_ok());
    }
}
