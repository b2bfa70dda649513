use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use std::fmt::{self, Write as _};
use std::time::Duration;
use stratus_forecast::cache::PersistentCache;
use stratus_forecast::cli::Cli;
use stratus_forecast::{
    CachedSource, ForecastBoard, ManualInputs, MetarClient, ObservationSource, RefreshOutcome,
    RefreshService, SolarTimeCalculator, StratusConfig, StratusError, telemetry,
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        match err.downcast_ref::<StratusError>() {
            Some(stratus) => eprintln!("{}", stratus.user_message()),
            None => eprintln!("Error: {err:#}"),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = StratusConfig::load_from_path(cli.config.clone())?;
    telemetry::init_logging(&config.logging, cli.verbose);

    let client = MetarClient::new(&config.metar)?;
    if config.cache.enabled {
        let cache = PersistentCache::open(&config.cache.location).map_err(|e| {
            StratusError::cache(format!("Failed to open cache at {}: {e:#}", config.cache.location))
        })?;
        let ttl = config.cache.ttl();
        serve(CachedSource::new(client, cache, ttl), config, &cli).await
    } else {
        serve(client, config, &cli).await
    }
}

async fn serve<S: ObservationSource>(source: S, config: StratusConfig, cli: &Cli) -> Result<()> {
    let interval = Duration::from_secs(u64::from(config.refresh.interval_minutes) * 60);
    let service = RefreshService::new(source, config)?;
    let board = ForecastBoard::new();
    let manual = cli.manual_inputs();

    if !cli.watch {
        refresh_and_print(&service, &board, &manual, cli.json).await?;
        let produced = board.latest().await.is_some_and(|latest| latest.outcome.forecast.is_some());
        if !produced {
            return Err(StratusError::no_data("required forecast inputs are missing").into());
        }
        return Ok(());
    }

    info!(interval_minutes = interval.as_secs() / 60, "Watching for new observations");
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        if let Err(err) = refresh_and_print(&service, &board, &manual, cli.json).await {
            error!("Refresh failed: {err:#}");
        }
    }
}

async fn refresh_and_print<S: ObservationSource>(
    service: &RefreshService<S>,
    board: &ForecastBoard,
    manual: &ManualInputs,
    json: bool,
) -> Result<()> {
    let cycle = board.begin_cycle();
    let outcome = service.refresh(manual, Utc::now()).await;
    board.publish(cycle, outcome).await;

    let Some(latest) = board.latest().await else {
        return Ok(());
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&latest.outcome)?);
    } else {
        print!("{}", render(&latest.outcome, service.solar())?);
    }
    Ok(())
}

fn render(outcome: &RefreshOutcome, solar: &SolarTimeCalculator) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "Stratus forecast generated {}", outcome.generated_at.format("%Y-%m-%d %H:%MZ"))?;

    if let Some(temperature) = &outcome.temperature {
        writeln!(out, "  Temperature source: {}", temperature.data_source)?;
    }
    if let Some(gradients) = &outcome.gradients {
        writeln!(
            out,
            "  Gradients: onshore {:+.1} mb, offshore {:+.1} mb",
            gradients.onshore_gradient_mb, gradients.offshore_gradient_mb
        )?;
    }

    match &outcome.forecast {
        Some(forecast) => {
            writeln!(
                out,
                "  Probability: {:.0}% ({} confidence), stratus index {:.0}",
                forecast.probability_pct, forecast.confidence, forecast.stratus_index
            )?;
            match (&forecast.onset_window, &forecast.end_window) {
                (Some(onset), Some(end)) => {
                    writeln!(out, "  Onset: {onset}")?;
                    writeln!(out, "  Clearing: {end}")?;
                }
                _ => writeln!(out, "  No stratus expected")?,
            }
            if let Some(burn_off) = outcome.burn_off_at {
                writeln!(
                    out,
                    "  Burn-off: {} local ({:.1} h after sunrise)",
                    solar.to_local(burn_off).format("%H:%M"),
                    forecast.burn_off_hours
                )?;
            }
            for effect in &forecast.pattern_effects {
                writeln!(out, "  Pattern: {effect}")?;
            }
            for warning in &forecast.warnings {
                writeln!(out, "  Warning: {warning}")?;
            }
            writeln!(out, "  {}", forecast.reasoning)?;
        }
        None => {
            writeln!(out, "  Forecast unavailable")?;
            for reason in &outcome.missing_inputs {
                writeln!(out, "    {reason}")?;
            }
        }
    }

    for caveat in &outcome.caveats {
        writeln!(out, "  Caveat: {caveat}")?;
    }
    Ok(out)
}
