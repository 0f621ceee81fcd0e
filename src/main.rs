use irori::{net, Config, State, StateConfig};
use std::net::SocketAddr;
use std::{env, io, process};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("irori=info")).init();

    let config = match Config::from_args(env::args()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            eprintln!("Usage: irori <port> <password>");
            process::exit(1);
        }
    };

    if let Err(err) = run(config) {
        log::error!("{}", err);
        process::exit(1);
    }
}

fn run(config: Config) -> io::Result<()> {
    let mut runtime = tokio::runtime::Builder::new()
        .basic_scheduler()
        .enable_io()
        .build()?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = State::new(StateConfig {
        password: config.password,
        ..StateConfig::default()
    });

    runtime.block_on(async move {
        let listener = net::bind(addr)?;
        log::info!("Listening on {}", addr);
        tokio::spawn(net::accept_loop(listener, state));
        wait_shutdown().await;
        log::info!("Shutting down");
        Ok(())
    })
}

/// Resolves on SIGINT or SIGTERM.
async fn wait_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
