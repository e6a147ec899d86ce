use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io::{self, Write};
use std::time::Instant;
use tc_batch::{
    BatchError, BatchEvaluator, BatchOptions, BatchOutput, BatchProgressEvent, BatchStage,
    ClimateSeries, ComfortCriteria,
};
use tc_comfort::{
    Acceptability, Activity, ComfortInput, ComfortRange, ComfortResult, EnvelopeConditions,
    EnvelopeConfig, EnvelopeResult, ModelError, Psychrometrics, comfort_range,
    evaluate_comfort, parse_metabolic_rate, psychrometrics, solve_envelope_with,
};
use tc_core::constants::STANDARD_PRESSURE_PA;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Batch(#[from] BatchError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "tc-cli")]
#[command(about = "ThermoComfort CLI - PMV, SET and comfort envelope calculator", long_about = None)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

/// Everything about the occupant and the air except temperature.
#[derive(Args)]
struct Occupant {
    /// Relative humidity (%)
    #[arg(long)]
    rh: f64,
    /// Metabolic rate in met, or an activity name (e.g. "Typing")
    #[arg(long, value_parser = parse_met)]
    met: f64,
    /// Clothing level (clo)
    #[arg(long)]
    clo: f64,
    /// Air speed (m/s)
    #[arg(long, default_value_t = 0.05)]
    vel: f64,
    /// External work (met)
    #[arg(long, default_value_t = 0.0)]
    wme: f64,
}

impl Occupant {
    fn conditions(&self) -> EnvelopeConditions {
        EnvelopeConditions::new(self.rh, self.met, self.clo)
            .with_air_speed(self.vel)
            .with_external_work(self.wme)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// PMV, PPD and SET at one set of conditions
    Pmv {
        /// Air temperature (°C)
        #[arg(long)]
        ta: f64,
        /// Mean radiant temperature (°C), defaults to air temperature
        #[arg(long)]
        tr: Option<f64>,
        #[command(flatten)]
        occupant: Occupant,
    },
    /// Balance temperature and comfort range
    Envelope {
        #[command(flatten)]
        occupant: Occupant,
        /// Hold radiant temperature here while searching the range (°C)
        #[arg(long)]
        radiant: Option<f64>,
        /// Use the 90 % acceptability range (PMV within ±0.5)
        #[arg(long)]
        ninety: bool,
    },
    /// Evaluate comfort over a range of air temperatures
    Sweep {
        /// First air temperature (°C)
        #[arg(long)]
        from: f64,
        /// Last air temperature (°C)
        #[arg(long)]
        to: f64,
        /// Temperature step (°C)
        #[arg(long, default_value_t = 1.0)]
        step: f64,
        /// Mean radiant temperature (°C), defaults to air temperature
        #[arg(long)]
        tr: Option<f64>,
        #[command(flatten)]
        occupant: Occupant,
        /// Judge comfort by PPD below this percentage instead of |PMV| < 1
        #[arg(long)]
        ppd: Option<f64>,
        /// Also compute the balance temperature at every step
        #[arg(long)]
        balance: bool,
        /// Evaluate on the calling thread only
        #[arg(long)]
        sequential: bool,
    },
    /// List named activities and their metabolic rates
    Activities,
}

fn parse_met(s: &str) -> Result<f64, String> {
    parse_metabolic_rate(s).map_err(|e| e.to_string())
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    match cli.command {
        Commands::Pmv { ta, tr, occupant } => cmd_pmv(ta, tr, &occupant, json),
        Commands::Envelope {
            occupant,
            radiant,
            ninety,
        } => cmd_envelope(&occupant, radiant, ninety, json),
        Commands::Sweep {
            from,
            to,
            step,
            tr,
            occupant,
            ppd,
            balance,
            sequential,
        } => {
            let temps = sweep_temperatures(from, to, step)?;
            let options = BatchOptions {
                criteria: ppd.map_or_else(ComfortCriteria::default, ComfortCriteria::ppd_below),
                parallel: !sequential,
                compute_balance_temperature: balance,
                ..BatchOptions::default()
            };
            cmd_sweep(temps, tr, &occupant, options, json)
        }
        Commands::Activities => cmd_activities(json),
    }
}

#[derive(Serialize)]
struct PointReport {
    input: ComfortInput,
    result: ComfortResult,
    psychrometrics: Psychrometrics,
}

fn cmd_pmv(ta: f64, tr: Option<f64>, occupant: &Occupant, json: bool) -> CliResult<()> {
    let input = occupant.conditions().at(ta, tr.unwrap_or(ta)).validated()?;
    let result = evaluate_comfort(&input)?;
    let report = PointReport {
        input,
        result,
        psychrometrics: psychrometrics(input.air_temp, input.relative_humidity, STANDARD_PRESSURE_PA),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Conditions: ta={:.1} °C  tr={:.1} °C  vel={:.2} m/s  rh={:.0} %  met={:.2}  clo={:.2}",
        input.air_temp,
        input.radiant_temp,
        input.air_speed,
        input.relative_humidity,
        input.metabolic_rate,
        input.clothing_level
    );
    println!("  PMV: {:+.2}", result.pmv);
    println!("  PPD: {:.1} %", result.ppd);
    println!("  SET: {:.2} °C", result.set);
    if result.cooling_effect > 0.0 {
        println!(
            "  Cooling effect: {:.2} K (PMV evaluated at {:.2} °C)",
            result.cooling_effect, result.adjusted_air_temp
        );
    }
    println!(
        "  Humidity ratio: {:.5} kg/kg  Enthalpy: {:.2} kJ/kg",
        report.psychrometrics.humidity_ratio, report.psychrometrics.enthalpy
    );
    let verdict = if result.within_pmv(1.0) { "comfortable" } else { "uncomfortable" };
    println!("✓ {}", verdict);
    Ok(())
}

#[derive(Serialize)]
struct EnvelopeReport {
    conditions: EnvelopeConditions,
    acceptability: Acceptability,
    envelope: EnvelopeResult,
    fixed_radiant: Option<(f64, ComfortRange)>,
}

fn cmd_envelope(occupant: &Occupant, radiant: Option<f64>, ninety: bool, json: bool) -> CliResult<()> {
    let conditions = occupant.conditions();
    conditions.at(PROBE_TEMP, PROBE_TEMP).validated()?;

    let config = EnvelopeConfig {
        acceptability: if ninety {
            Acceptability::Ninety
        } else {
            Acceptability::Eighty
        },
        ..EnvelopeConfig::default()
    };
    let envelope = solve_envelope_with(&conditions, &config)?;
    let fixed_radiant = match radiant {
        Some(tr) => Some((tr, comfort_range(Some(tr), &conditions, &config)?)),
        None => None,
    };
    let report = EnvelopeReport {
        conditions,
        acceptability: config.acceptability,
        envelope,
        fixed_radiant,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let limit = config.acceptability.pmv_limit();
    println!("Comfort envelope (PMV within ±{limit}):");
    println!("  Balance temperature: {:.2} °C", envelope.balance_temp);
    println!(
        "  Comfort range:       {:.2} - {:.2} °C",
        envelope.lower_comfort_temp, envelope.upper_comfort_temp
    );
    if let Some((tr, range)) = fixed_radiant {
        println!(
            "  Range at tr={:.1} °C:  {:.2} - {:.2} °C",
            tr, range.lower, range.upper
        );
    }
    Ok(())
}

/// Any temperature works for checking the non-temperature fields.
const PROBE_TEMP: f64 = 25.0;

fn sweep_temperatures(from: f64, to: f64, step: f64) -> CliResult<Vec<f64>> {
    if !(step.is_finite() && step > 0.0) {
        return Err(CliError::InvalidArg {
            what: "sweep step must be positive",
        });
    }
    if !(from.is_finite() && to.is_finite() && to >= from) {
        return Err(CliError::InvalidArg {
            what: "sweep range must satisfy from <= to",
        });
    }
    let count = ((to - from) / step + 1e-9).floor() as usize + 1;
    Ok((0..count).map(|i| from + step * i as f64).collect())
}

#[derive(Serialize)]
struct SweepReport {
    air_temps: Vec<f64>,
    output: BatchOutput,
}

fn cmd_sweep(
    temps: Vec<f64>,
    tr: Option<f64>,
    occupant: &Occupant,
    options: BatchOptions,
    json: bool,
) -> CliResult<()> {
    let mut series = ClimateSeries::new(temps.clone(), vec![occupant.rh])
        .with_air_speed(vec![occupant.vel])
        .with_metabolic_rate(vec![occupant.met])
        .with_clothing_level(vec![occupant.clo])
        .with_external_work(vec![occupant.wme]);
    if let Some(tr) = tr {
        series = series.with_radiant_temp(vec![tr]);
    }

    info!(steps = temps.len(), parallel = options.parallel, "air temperature sweep");
    let evaluator = BatchEvaluator::new(options);
    let output = if json {
        evaluator.evaluate(&series)?
    } else {
        let mut last_emit = Instant::now();
        let output = evaluator.evaluate_with_progress(
            &series,
            Some(&mut |event| {
                let emit_now = event.stage != BatchStage::Evaluating
                    || last_emit.elapsed().as_millis() >= 100;
                if emit_now {
                    render_cli_progress(&event);
                    last_emit = Instant::now();
                }
            }),
        )?;
        clear_progress_line();
        output
    };

    if json {
        let report = SweepReport {
            air_temps: temps,
            output,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{:>8} {:>7} {:>7} {:>8} {:>8}  comfortable", "ta", "pmv", "ppd", "set", "adj ta");
    for (slot, &hour) in output.hours.iter().enumerate() {
        let ta = temps[hour];
        match (&output.results[slot], output.comfortable[slot]) {
            (Some(r), Some(ok)) => {
                let mut line = format!(
                    "{:>8.2} {:>+7.2} {:>7.1} {:>8.2} {:>8.2}  {}",
                    ta,
                    r.pmv,
                    r.ppd,
                    r.set,
                    r.adjusted_air_temp,
                    if ok { "yes" } else { "no" }
                );
                if let Some(Some(t)) = output
                    .balance_temperatures
                    .as_ref()
                    .map(|b| b[slot])
                {
                    line.push_str(&format!("  balance={:.2}", t));
                }
                println!("{}", line);
            }
            _ => println!("{:>8.2} {:>7}", ta, "failed"),
        }
    }

    match output.percent_of_time_comfortable {
        Some(p) => println!(
            "✓ {:.1} % comfortable ({} evaluated, {} failed)",
            p, output.num_successful, output.num_failed
        ),
        None => println!("✗ No step could be evaluated"),
    }
    Ok(())
}

fn cmd_activities(json: bool) -> CliResult<()> {
    if json {
        let table: Vec<(&str, f64)> = Activity::ALL
            .iter()
            .map(|a| (a.name(), a.metabolic_rate()))
            .collect();
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }
    println!("Activities:");
    for activity in Activity::ALL {
        println!("  {:<16} {:.1} met", activity.name(), activity.metabolic_rate());
    }
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &BatchProgressEvent) {
    let width = 28usize;
    let fraction = event.fraction_complete();
    let filled = ((fraction * width as f64).round() as usize).min(width);
    let bar = format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(width.saturating_sub(filled))
    );
    let mut line = format!(
        "\r[{}] {:>6.2}%  {:?}  {}/{}  elapsed={:.2}s",
        bar,
        fraction * 100.0,
        event.stage,
        event.completed,
        event.total,
        event.elapsed_wall_s
    );
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }
    print!("{}", line);
    let _ = io::stdout().flush();
}
