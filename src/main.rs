use std::rc::Rc;

use tokio::task::LocalSet;

use wicket::app::Echo;
use wicket::config::Config;
use wicket::server;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let local = LocalSet::new();

    local
        .run_until(async {
            tokio::select! {
                res = server::listener::run(&cfg, Rc::new(Echo)) => {
                    res?;
                }

                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received");
                }
            }
            Ok::<(), anyhow::Error>(())
        })
        .await
}
