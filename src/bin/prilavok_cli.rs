use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use prilavok::backend::{CacheFactory, CacheStore, CachedBackend, LruStore};
use prilavok::{Agent, AgentConfig, HttpBackend, ProductBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = AgentConfig::from_env();
    let http = HttpBackend::new(&config.backend_url, config.timeout_secs)?;

    let backend: Arc<dyn ProductBackend> = if config.cache_enabled {
        let capacity = config.cache_capacity;
        let ttl = Duration::from_secs(config.cache_ttl_secs);
        let factory: CacheFactory =
            Box::new(move || Ok(Arc::new(LruStore::new(capacity)) as Arc<dyn CacheStore>));
        Arc::new(CachedBackend::new(http, factory, ttl))
    } else {
        Arc::new(http)
    };

    let agent = Agent::new(backend);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query == "exit" || query == "quit" {
            break;
        }

        let response = agent.run(query).await;
        writeln!(stdout, "{}\n", response.answer)?;
    }

    Ok(())
}
