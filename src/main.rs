// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::Context;
use futures::stream::{self, StreamExt};
use std::env;
use std::sync::Arc;
use std::time::Instant;
use strategy_pipeline::backends::local::ChangeTextCaseProcessor;
use strategy_pipeline::config::{load_and_validate_config, RuntimeBuilder, StrategyConfig};
use strategy_pipeline::engine::PipelineContext;
use strategy_pipeline::observability::profiling::{ProfilingEventKind, RecordingProfilingService};
use strategy_pipeline::traits::{PerEventProcessor, ProfilingService};
use tracing_subscriber::EnvFilter;

const PROCESSOR_LOCATION: &str = "demo/processors/0";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <config.yaml> <event> [event ...]", args[0]);
        eprintln!("Example: {} configs/pipeline-demo.yaml \"hello world\" \"the quick brown fox\"", args[0]);
        std::process::exit(1);
    }

    let config_file = &args[1];
    let events = args[2..].to_vec();

    println!("🚀 Processing Strategy Pipeline Demo");
    println!("═══════════════════════════════════");
    println!("Config file: {}", config_file);
    println!("Events: {:?}", events);
    println!();

    run(config_file, events).await
}

async fn run(config_file: &str, events: Vec<String>) -> anyhow::Result<()> {
    let start_time = Instant::now();

    let config = load_and_validate_config(config_file)
        .with_context(|| format!("loading {}", config_file))?;
    print_config(&config);

    let recorder = RecordingProfilingService::for_kinds(&config.profiling.enabled_kinds());
    let profiling = if config.profiling.enabled {
        Some(Arc::new(recorder.clone()) as Arc<dyn ProfilingService>)
    } else {
        None
    };

    let processor = PerEventProcessor::new(ChangeTextCaseProcessor::upper(PROCESSOR_LOCATION));
    let (mut pools, builder) =
        RuntimeBuilder::from_config_with_profiling::<String, _>(&config, processor, profiling)?;
    let pipeline = builder.build()?;

    let input = stream::iter(events.into_iter().map(Ok)).boxed();
    let execution_start = Instant::now();
    let results: Vec<_> = pipeline.apply(input, &PipelineContext::new()).collect().await;
    let execution_time = execution_start.elapsed();

    println!("\n📊 Results:");
    println!("⏱️  Execution Time: {:?}", execution_time);
    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(event) => println!("  {}. \"{}\"", i + 1, event),
            Err(e) => println!("  {}. ❌ {}", i + 1, e),
        }
    }

    if config.profiling.enabled {
        println!("\n🔎 Profiling:");
        for kind in ProfilingEventKind::ALL {
            println!("   • {}: {}", kind.event_type_name(), recorder.count(kind));
        }
    }

    pools.shutdown();
    println!("\n⏱️  Total Time (including config load): {:?}", start_time.elapsed());
    Ok(())
}

fn print_config(config: &StrategyConfig) {
    println!("📋 Artifact: {} ({})", config.artifact_id, config.artifact_type);
    println!("⚙️  Parallelism: {}", config.parallelism);
    println!("🛡️  Failure Strategy: {:?}", config.failure_strategy);
    println!(
        "🔀 Schedulers: context={}, dispatch={}, callback={}",
        config.context_scheduler,
        config.dispatch_scheduler.as_deref().unwrap_or("<current>"),
        config.callback_scheduler.as_deref().unwrap_or("<current>")
    );
}
