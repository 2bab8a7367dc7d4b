use std::{error::Error, path::PathBuf, process::ExitCode};

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use engine::{
    MoneyCents, PricingError, Ruleset, compute_price, filter_valid, parse_ruleset_file,
    scan_directory, select_ruleset,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lagerkasse_admin")]
#[command(about = "Admin utilities for Lagerkasse rulesets and pricing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(subcommand)]
    Ruleset(RulesetCommand),
    #[command(subcommand)]
    Price(PriceCommand),
}

#[derive(Subcommand, Debug)]
enum RulesetCommand {
    /// Scan a directory for ruleset YAML files and report each one.
    Scan(ScanArgs),
    /// Validate a single ruleset file, listing every violation.
    Check(CheckArgs),
    /// Print an example ruleset to start a new file from.
    Example,
}

#[derive(Args, Debug)]
struct ScanArgs {
    directory: PathBuf,
    /// Do not descend into subdirectories.
    #[arg(long)]
    flat: bool,
    /// Only list files that parse and validate.
    #[arg(long)]
    valid_only: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum PriceCommand {
    /// Compute a participant price from a ruleset file.
    Compute(ComputeArgs),
}

#[derive(Args, Debug)]
struct ComputeArgs {
    /// Ruleset YAML file to price against.
    #[arg(long)]
    ruleset: PathBuf,
    /// Participant age in whole years at event start.
    #[arg(long)]
    age: u32,
    /// Participant role (e.g. "teilnehmer", "betreuer").
    #[arg(long, default_value = "teilnehmer")]
    role: String,
    /// Event date; when given, the ruleset's window and active flag are
    /// checked. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
    /// 1-based position within the family (oldest sibling = 1).
    #[arg(long)]
    ordinal: Option<u32>,
    /// Operator-supplied final price, e.g. "99.50".
    #[arg(long, value_name = "AMOUNT", value_parser = parse_amount)]
    r#override: Option<MoneyCents>,
    /// Print the breakdown as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn parse_amount(raw: &str) -> Result<MoneyCents, String> {
    raw.parse::<MoneyCents>().map_err(|err| err.to_string())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Ruleset(RulesetCommand::Scan(args)) => scan(args),
        Command::Ruleset(RulesetCommand::Check(args)) => check(args),
        Command::Ruleset(RulesetCommand::Example) => {
            print!("{}", Ruleset::example().to_yaml()?);
            Ok(())
        }
        Command::Price(PriceCommand::Compute(args)) => compute(args),
    }
}

fn scan(args: ScanArgs) -> Result<(), Box<dyn Error>> {
    let mut report = scan_directory(&args.directory, !args.flat);
    if args.valid_only {
        report = filter_valid(report);
    }
    if report.is_empty() {
        println!("no ruleset files found in {}", args.directory.display());
        return Ok(());
    }

    for entry in &report {
        let status = if entry.is_valid { "ok     " } else { "INVALID" };
        let window = match (entry.valid_from, entry.valid_until) {
            (Some(from), Some(until)) => format!("{from} .. {until}"),
            _ => "-".to_string(),
        };
        println!(
            "{status}  {}  [{}]  {window}  {}",
            entry.name,
            entry.kind,
            entry.relative_path.display()
        );
        if let Some(error) = &entry.error {
            println!("         {error}");
        }
    }
    Ok(())
}

fn check(args: CheckArgs) -> Result<(), Box<dyn Error>> {
    match parse_ruleset_file(&args.file) {
        Ok(ruleset) => {
            println!(
                "{} is valid: {} [{}], {} .. {}, {} age group(s)",
                args.file.display(),
                ruleset.name,
                ruleset.kind,
                ruleset.valid_from,
                ruleset.valid_until,
                ruleset.age_groups.len()
            );
            Ok(())
        }
        Err(PricingError::InvalidRuleset(errors)) => {
            eprintln!("{} has {} problem(s):", args.file.display(), errors.len());
            for violation in errors.iter() {
                eprintln!("  {violation}");
            }
            Err("ruleset is invalid".into())
        }
        Err(err) => Err(err.into()),
    }
}

fn compute(args: ComputeArgs) -> Result<(), Box<dyn Error>> {
    let ruleset = parse_ruleset_file(&args.ruleset)?;
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    // Going through the selector checks the window and the active flag.
    let rulesets = std::slice::from_ref(&ruleset);
    let selected = select_ruleset(rulesets, date)?;

    let breakdown = compute_price(args.age, &args.role, selected, args.ordinal, args.r#override);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
        return Ok(());
    }

    println!("ruleset:         {} [{}]", selected.name, selected.kind);
    println!("base price:      {}", breakdown.base_price);
    println!("role discount:   -{}", breakdown.role_discount);
    println!("family discount: -{}", breakdown.family_discount);
    if let Some(ordinal) = breakdown.family_ordinal {
        println!("family ordinal:  {ordinal}");
    }
    if let Some(amount) = breakdown.manual_override {
        println!("override:        {amount}");
    }
    println!("final price:     {}", breakdown.final_price);
    if breakdown.final_price.is_negative() {
        println!("warning: combined discounts exceed the base price");
    }
    Ok(())
}
