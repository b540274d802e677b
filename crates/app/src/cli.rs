//! Cruise-sim CLI - run the cruise-control loop from a scenario file and/or flags.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use cruise::{
    simulate, RunComparison, Scenario, SetpointSchedule, SimulationTrace, SlopeResistance,
    SlopeSchedule,
};
use log::info;
use simcore::{AdaptiveDopri5, IntegratorKind, RungeKutta4};

use crate::output::write_trace;

#[derive(Parser, Debug)]
#[command(name = "cruise-sim")]
#[command(about = "PI cruise-control loop simulator")]
#[command(version)]
pub struct Args {
    /// JSON scenario with `config`, `set_points` and `slopes`
    #[arg(short, long)]
    pub scenario: Option<PathBuf>,

    // ── Run parameters (override the scenario) ─────────────────
    /// Horizon (s)
    #[arg(long, allow_negative_numbers = true)]
    pub tf: Option<f64>,

    /// Load (kg)
    #[arg(long, allow_negative_numbers = true)]
    pub load: Option<f64>,

    /// Initial speed (m/s)
    #[arg(long, allow_negative_numbers = true)]
    pub v0: Option<f64>,

    /// Actuator bias (%)
    #[arg(long, allow_negative_numbers = true)]
    pub ubias: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub kc: Option<f64>,

    #[arg(long)]
    pub tau_i: Option<f64>,

    /// Setpoint before the first scheduled change (m/s)
    #[arg(long, allow_negative_numbers = true)]
    pub initial_setpoint: Option<f64>,

    // ── Schedules ──────────────────────────────────────────────
    /// Setpoint change as TICK=SPEED, repeatable
    #[arg(long = "setpoint", value_parser = parse_breakpoint)]
    pub setpoints: Vec<(usize, f64)>,

    /// Road angle breakpoint as TICK=DEGREES, repeatable
    #[arg(long = "slope", value_parser = parse_breakpoint)]
    pub slopes: Vec<(usize, f64)>,

    /// Start from the dashboard's speed schedule (50:0, 100:15, 150:20, 200:10)
    #[arg(long)]
    pub reference_setpoints: bool,

    // ── Model options ──────────────────────────────────────────
    #[arg(long, value_enum)]
    pub integrator: Option<IntegratorChoice>,

    /// RK4 sub-steps per tick
    #[arg(long, default_value_t = 20)]
    pub substeps: usize,

    /// Dopri5 relative tolerance
    #[arg(long)]
    pub rtol: Option<f64>,

    /// Dopri5 absolute tolerance
    #[arg(long)]
    pub atol: Option<f64>,

    #[arg(long, value_enum)]
    pub slope_resistance: Option<SlopeChoice>,

    // ── Output ─────────────────────────────────────────────────
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: OutputFormat,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Previous trace (JSON) to compare the new run against
    #[arg(long)]
    pub compare: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IntegratorChoice {
    Dopri5,
    Rk4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SlopeChoice {
    DragModulated,
    Gravity,
}

fn parse_breakpoint(s: &str) -> Result<(usize, f64), String> {
    let (tick, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected TICK=VALUE, got `{s}`"))?;
    let tick = tick
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("bad tick `{tick}`: {e}"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad value `{value}`: {e}"))?;
    Ok((tick, value))
}

/// Merges the scenario file (if any) with the command-line overrides.
pub fn build_scenario(args: &Args) -> Result<Scenario> {
    let mut scenario = match &args.scenario {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading scenario {}", path.display()))?;
            Scenario::from_json_str(&json)
                .with_context(|| format!("parsing scenario {}", path.display()))?
        }
        None => Scenario::default(),
    };

    let cfg = &mut scenario.config;
    if let Some(tf) = args.tf {
        cfg.tf = tf;
    }
    if let Some(load) = args.load {
        cfg.load = load;
    }
    if let Some(v0) = args.v0 {
        cfg.v0 = v0;
    }
    if let Some(ubias) = args.ubias {
        cfg.ubias = ubias;
    }
    if let Some(kc) = args.kc {
        cfg.kc = kc;
    }
    if let Some(tau_i) = args.tau_i {
        cfg.tau_i = tau_i;
    }
    if let Some(sp) = args.initial_setpoint {
        cfg.initial_setpoint = sp;
    }
    match args.integrator {
        Some(IntegratorChoice::Dopri5) => {
            let defaults = AdaptiveDopri5::default();
            cfg.integrator = IntegratorKind::Dopri5(AdaptiveDopri5::with_tolerances(
                args.rtol.unwrap_or(defaults.rtol),
                args.atol.unwrap_or(defaults.atol),
            ));
        }
        Some(IntegratorChoice::Rk4) => cfg.integrator = IntegratorKind::Rk4(RungeKutta4::new(args.substeps)),
        None => {}
    }
    match args.slope_resistance {
        Some(SlopeChoice::DragModulated) => cfg.slope_resistance = SlopeResistance::DragModulated,
        Some(SlopeChoice::Gravity) => cfg.slope_resistance = SlopeResistance::Gravity,
        None => {}
    }

    if args.reference_setpoints {
        scenario.set_points = Some(SetpointSchedule::reference());
    }
    if !args.setpoints.is_empty() {
        let schedule = scenario.set_points.get_or_insert_with(SetpointSchedule::new);
        for &(tick, sp) in &args.setpoints {
            schedule.insert(tick, sp);
        }
    }
    if !args.slopes.is_empty() {
        let schedule = scenario.slopes.get_or_insert_with(SlopeSchedule::new);
        for &(tick, angle) in &args.slopes {
            schedule.insert(tick, angle);
        }
    }

    Ok(scenario)
}

pub fn run(args: &Args) -> Result<()> {
    let scenario = build_scenario(args)?;
    let trace = simulate(&scenario.config, scenario.set_points.as_ref(), scenario.slopes.as_ref())
        .map_err(|e| anyhow!(e))
        .context("simulation failed")?;

    let summary = trace.summary();
    info!(
        "{} samples | final speed {:.2} m/s | peak {:.2} m/s | {} saturated ticks",
        trace.len(),
        summary.final_speed,
        summary.peak_speed,
        summary.saturated_ticks
    );

    if let Some(path) = &args.compare {
        report_comparison(&trace, path)?;
    }

    write_trace(&trace, args.format, args.output.as_deref())
}

fn report_comparison(trace: &SimulationTrace, path: &Path) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading previous trace {}", path.display()))?;
    let previous = SimulationTrace::from_json_str(&json)
        .map_err(|e| anyhow!(e))
        .with_context(|| format!("parsing previous trace {}", path.display()))?;

    let comparison = RunComparison::new(trace.clone(), Some(previous));
    match comparison.deltas() {
        Some(d) => eprintln!(
            "vs previous: v {:+.3} (max {:.3}) | step {:+.3} (max {:.3}) | error {:+.3} (max {:.3}) | slope max {:.3}",
            d.v.final_delta,
            d.v.max_abs_delta,
            d.step.final_delta,
            d.step.max_abs_delta,
            d.error.final_delta,
            d.error.max_abs_delta,
            d.slope.max_abs_delta
        ),
        None => eprintln!("previous trace has a different horizon; nothing to compare"),
    }
    Ok(())
}
