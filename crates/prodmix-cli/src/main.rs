use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;

use prodmix_model::{
    DEFAULT_SAMPLES, FeasibleRegionCurves, LpModel, MIN_SAMPLES, PlotSink, ProductionInputs, ProductionSolution,
    Report,
};
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "prodmix")]
#[command(about = "Profit-maximizing production mix for two products and two resources", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve for the optimal production quantities
    Solve {
        #[command(flatten)]
        inputs: InputArgs,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = SolveFormat::Pretty)]
        format: SolveFormat,
        /// Currency symbol used when printing profit
        #[arg(long, default_value = "Rp")]
        currency: String,
    },
    /// Print the boundary curves of the feasible region
    Region {
        #[command(flatten)]
        inputs: InputArgs,
        /// Right end of the product A axis (defaults to the material capacity)
        #[arg(long, value_parser = parse_x_max)]
        x_max: Option<f64>,
        /// Number of samples along the product A axis (at least 2)
        #[arg(long, default_value_t = DEFAULT_SAMPLES, value_parser = parse_samples)]
        samples: usize,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = RegionFormat::Csv)]
        format: RegionFormat,
    },
    /// Print the full report as JSON
    Report {
        #[command(flatten)]
        inputs: InputArgs,
        /// Right end of the product A axis (defaults to the material capacity)
        #[arg(long, value_parser = parse_x_max)]
        x_max: Option<f64>,
        /// Number of samples along the product A axis (at least 2)
        #[arg(long, default_value_t = DEFAULT_SAMPLES, value_parser = parse_samples)]
        samples: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SolveFormat {
    Pretty,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum RegionFormat {
    /// One row per sample: x, material, time, envelope
    Csv,
    /// One block per plotted series
    Series,
    Json,
}

/// Production inputs. Flags override values from `--inputs`, which override the defaults.
#[derive(Args)]
struct InputArgs {
    /// JSON file with any of the input fields
    #[arg(long = "inputs", value_name = "FILE")]
    file: Option<PathBuf>,
    /// Profit per unit of product A
    #[arg(long, allow_negative_numbers = true)]
    profit_a: Option<f64>,
    /// Profit per unit of product B
    #[arg(long, allow_negative_numbers = true)]
    profit_b: Option<f64>,
    /// Raw material per unit of product A
    #[arg(long, allow_negative_numbers = true)]
    consume_a_material: Option<f64>,
    /// Raw material per unit of product B
    #[arg(long, allow_negative_numbers = true)]
    consume_b_material: Option<f64>,
    /// Production hours per unit of product A
    #[arg(long, allow_negative_numbers = true)]
    consume_a_time: Option<f64>,
    /// Production hours per unit of product B
    #[arg(long, allow_negative_numbers = true)]
    consume_b_time: Option<f64>,
    /// Total raw material available
    #[arg(long, allow_negative_numbers = true)]
    material_capacity: Option<f64>,
    /// Total production hours available
    #[arg(long, allow_negative_numbers = true)]
    time_capacity: Option<f64>,
}

impl InputArgs {
    fn resolve(&self) -> ProductionInputs {
        let mut inputs = match &self.file {
            Some(path) => {
                let source = match std::fs::read_to_string(path) {
                    Ok(s) => s,
                    Err(e) => {
                        eprintln!("Error reading {}: {}", path.display(), e);
                        std::process::exit(1);
                    }
                };
                match ProductionInputs::from_json(&source) {
                    Ok(inputs) => inputs,
                    Err(e) => {
                        eprintln!("Error in {}: {}", path.display(), e);
                        std::process::exit(1);
                    }
                }
            }
            None => ProductionInputs::default(),
        };

        let overrides = [
            (self.profit_a, &mut inputs.profit_a),
            (self.profit_b, &mut inputs.profit_b),
            (self.consume_a_material, &mut inputs.consume_a_material),
            (self.consume_b_material, &mut inputs.consume_b_material),
            (self.consume_a_time, &mut inputs.consume_a_time),
            (self.consume_b_time, &mut inputs.consume_b_time),
            (self.material_capacity, &mut inputs.material_capacity),
            (self.time_capacity, &mut inputs.time_capacity),
        ];
        for (flag, field) in overrides {
            if let Some(value) = flag {
                *field = value;
            }
        }

        debug!(?inputs, "resolved inputs");
        inputs
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Solve {
            inputs,
            format,
            currency,
        } => {
            let inputs = inputs.resolve();
            let model = build_or_exit(&inputs);
            let solution = prodmix_model::solve(&model);

            match format {
                SolveFormat::Json => print_json(&solution),
                SolveFormat::Pretty => print_solution(&solution, &currency),
            }

            let code = exit_code(&solution);
            if code != 0 {
                std::process::exit(code);
            }
        }
        Commands::Region {
            inputs,
            x_max,
            samples,
            format,
        } => {
            let report = compute_or_exit(&inputs.resolve(), x_max, samples);

            match format {
                RegionFormat::Json => print_json(&serde_json::json!({
                    "curves": report.curves,
                    "optimum": report.solution.optimal_point(),
                })),
                RegionFormat::Csv => print_region_csv(&report.curves),
                RegionFormat::Series => {
                    let stdout = io::stdout();
                    let mut sink = SeriesWriter { out: stdout.lock() };
                    if let Err(e) = report.render(&mut sink) {
                        eprintln!("Error writing output: {}", e);
                        std::process::exit(1);
                    }
                }
            }
        }
        Commands::Report {
            inputs,
            x_max,
            samples,
        } => {
            let report = compute_or_exit(&inputs.resolve(), x_max, samples);
            print_json(&report);
        }
    }
}

/// Only an optimal plan counts as success
fn exit_code(solution: &ProductionSolution) -> i32 {
    match solution {
        ProductionSolution::Optimal { .. } => 0,
        ProductionSolution::Infeasible | ProductionSolution::Unbounded | ProductionSolution::NumericalFailure => 1,
    }
}

fn parse_samples(s: &str) -> Result<usize, String> {
    let samples: usize = s.parse().map_err(|e| format!("{}", e))?;
    if samples < MIN_SAMPLES {
        return Err(format!("at least {} samples are needed", MIN_SAMPLES));
    }
    Ok(samples)
}

fn parse_x_max(s: &str) -> Result<f64, String> {
    let x_max: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if !x_max.is_finite() || x_max < 0.0 {
        return Err("must be a finite number >= 0".to_string());
    }
    Ok(x_max)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }
}

fn build_or_exit(inputs: &ProductionInputs) -> LpModel {
    match LpModel::build(inputs) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Model error: {}", e);
            std::process::exit(1);
        }
    }
}

fn compute_or_exit(inputs: &ProductionInputs, x_max: Option<f64>, samples: usize) -> Report {
    match Report::compute_with(inputs, x_max, samples) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Model error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_solution(solution: &ProductionSolution, currency: &str) {
    println!("Status: {}", solution.status_label());
    match *solution {
        ProductionSolution::Optimal {
            quantity_a,
            quantity_b,
            total_profit,
        } => {
            println!("Product A: {:.2} units", quantity_a);
            println!("Product B: {:.2} units", quantity_b);
            println!("Maximum profit: {}", format_currency(total_profit, currency));
        }
        ProductionSolution::Infeasible => {
            println!("No production plan satisfies the resource limits. Check the capacities.");
        }
        ProductionSolution::Unbounded => {
            println!("Profit can grow without limit. Check the per-unit consumption values.");
        }
        ProductionSolution::NumericalFailure => {
            println!("The solver did not reach a verified optimum.");
        }
    }
}

fn print_region_csv(curves: &FeasibleRegionCurves) {
    println!("x,material,time,envelope");
    for ((m, t), e) in curves.material.points.iter().zip(&curves.time.points).zip(&curves.envelope) {
        println!("{},{},{},{}", m[0], format_y(m[1]), format_y(t[1]), format_y(e[1]));
    }
}

/// Unbounded samples are written as `inf`
fn format_y(y: f64) -> String {
    if y.is_infinite() { "inf".to_string() } else { y.to_string() }
}

/// `1234567.891` with symbol `Rp` becomes `Rp 1,234,567.89`
fn format_currency(value: f64, symbol: &str) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((&fixed, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    if symbol.is_empty() {
        format!("{}{}.{}", sign, grouped, frac)
    } else {
        format!("{}{} {}.{}", sign, symbol, grouped, frac)
    }
}

/// Writes each plotted series as a labelled block of `x,y` rows
struct SeriesWriter<W: Write> {
    out: W,
}

impl<W: Write> PlotSink for SeriesWriter<W> {
    type Error = io::Error;

    fn axes(&mut self, x_label: &str, y_label: &str) -> io::Result<()> {
        writeln!(self.out, "# x: {}", x_label)?;
        writeln!(self.out, "# y: {}", y_label)
    }

    fn line(&mut self, label: &str, points: &[[f64; 2]]) -> io::Result<()> {
        self.block("line", label, points)
    }

    fn fill_under(&mut self, label: &str, points: &[[f64; 2]]) -> io::Result<()> {
        self.block("fill", label, points)
    }

    fn marker(&mut self, label: &str, point: [f64; 2]) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "# marker: {} ({:.1}, {:.1})", label, point[0], point[1])?;
        writeln!(self.out, "{},{}", point[0], point[1])
    }
}

impl<W: Write> SeriesWriter<W> {
    fn block(&mut self, kind: &str, label: &str, points: &[[f64; 2]]) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "# {}: {}", kind, label)?;
        for p in points {
            writeln!(self.out, "{},{}", p[0], format_y(p[1]))?;
        }
        Ok(())
    }
}
