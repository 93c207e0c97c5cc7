use std::env;
use std::net::SocketAddr;

use industria_api::{serve, Engine};
use industria_core::SimWorld;
use industria_proto::SimConfig;
use tracing_subscriber::EnvFilter;

fn print_usage() {
    println!("industria <command>");
    println!("commands:");
    println!("  serve [addr]");
    println!("    default addr: 127.0.0.1:28100");
    println!("  step [n] [seed]");
    println!("  recipes");
}

fn parse_socket_addr(value: Option<&String>) -> Result<SocketAddr, String> {
    let raw = value.map(String::as_str).unwrap_or("127.0.0.1:28100");
    raw.parse::<SocketAddr>()
        .map_err(|_| format!("invalid addr: {raw}"))
}

fn config_from_args(seed: Option<&String>) -> Result<SimConfig, String> {
    let mut config = SimConfig::default();
    if let Some(raw) = seed {
        config.seed = raw
            .parse::<u64>()
            .map_err(|_| format!("invalid seed: {raw}"))?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    match command {
        Some("serve") => match parse_socket_addr(args.get(2)) {
            Ok(addr) => {
                let engine = match Engine::from_config(SimConfig::default()) {
                    Ok(engine) => engine,
                    Err(err) => {
                        eprintln!("failed to load catalogs: {err}");
                        std::process::exit(1);
                    }
                };
                println!("serving simulation on http://{addr}");
                tokio::select! {
                    result = serve(addr, engine.clone()) => {
                        if let Err(err) = result {
                            eprintln!("server error: {err}");
                            std::process::exit(1);
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        engine.stop().await;
                        println!("\nreceived ctrl-c, shutting down");
                    }
                }
            }
            Err(err) => {
                eprintln!("error: {err}");
                print_usage();
                std::process::exit(2);
            }
        },
        Some("step") => {
            let steps = args.get(2).and_then(|v| v.parse::<u64>().ok()).unwrap_or(1);
            let config = match config_from_args(args.get(3)) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("error: {err}");
                    print_usage();
                    std::process::exit(2);
                }
            };
            let mut world = match SimWorld::new(config) {
                Ok(world) => world,
                Err(err) => {
                    eprintln!("failed to load catalogs: {err}");
                    std::process::exit(1);
                }
            };
            for _ in 0..steps {
                world.tick();
            }
            let snapshot = world.snapshot(false);
            println!(
                "tick={} resources={} factories={} sinks={} transports={} market_products={}",
                snapshot.tick,
                snapshot.resources.len(),
                snapshot.factories.len(),
                snapshot.sinks.len(),
                snapshot.transports.len(),
                world.market().len(),
            );
        }
        Some("recipes") => {
            let world = match SimWorld::new(SimConfig::default()) {
                Ok(world) => world,
                Err(err) => {
                    eprintln!("failed to load catalogs: {err}");
                    std::process::exit(1);
                }
            };
            for recipe in world.recipes() {
                let marker = if recipe.active { "x" } else { " " };
                println!("[{marker}] {}", recipe.name);
            }
        }
        _ => {
            print_usage();
        }
    }
}
