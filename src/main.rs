use std::sync::Arc;

use adam::config::Config;
use adam::router::Router;
use adam::server::listener;

fn build_api(router: &mut Router) {
    router.add_get("/text", |ctx| async move {
        ctx.send_text("Here is some text");
    });

    router.add_get("/json", |ctx| async move {
        ctx.send_json("[{key: 'k1', value: 'v1'}, {key: 'k2', value: 'v2'}]");
    });

    router.add_get("/file", |ctx| async move {
        ctx.send_file("./index.html").await;
    });
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let mut router = Router::new();
    build_api(&mut router);
    let router = Arc::new(router);

    // Fixed-size reactor pool: all sessions and the listener share it
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(cfg.threads)
        .enable_all()
        .build()?;

    runtime.block_on(async {
        tokio::select! {
            res = listener::run(&cfg, router) => {
                res?;
            }

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
            }
        }

        Ok(())
    })
}
