use anyhow::{Context, Result};
use tokio::time::{sleep, Duration};

use runview::api::http::HttpBackend;
use runview::api::retry::{retry_fetch, RetryConfig};
use runview::api::{Backend, FetchError};
use runview::flatten::flatten;
use runview::logging::{json_log, obj, set_log_file, v_num, v_str};
use runview::state::{ActiveData, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    if let Ok(path) = std::env::var("LOG_PATH") {
        set_log_file(std::path::Path::new(&path)).context("cannot open LOG_PATH")?;
    }

    let backend = HttpBackend::new(&cfg)?;
    let retry_cfg = RetryConfig::default();

    let Some(run_id) = cfg.run_id.clone() else {
        // No RUN_ID: list top-level runs once and exit.
        let page = retry_fetch(&retry_cfg, "list_runs", || {
            backend.list_runs(cfg.page_limit, 0)
        })
        .await?;
        println!("{} runs total", page.count);
        for run in &page.results {
            println!("  {}  [{}]  {}", run.uuid, run.status.as_str(), run.name);
        }
        return Ok(());
    };

    let active = ActiveData::new();
    loop {
        let started = std::time::Instant::now();
        match active.set_active_run(&backend, &run_id).await {
            Ok(()) => {}
            Err(FetchError::NotFound { .. }) => {
                // Fatal for this view: the root itself is gone.
                anyhow::bail!("run {} does not exist on {}", run_id, cfg.api_base);
            }
            Err(e) => {
                json_log(
                    "poll",
                    obj(&[("run_id", v_str(&run_id)), ("error", v_str(&e.to_string()))]),
                );
                if cfg.poll_secs == 0 {
                    return Err(e.into());
                }
                sleep(Duration::from_secs(cfg.poll_secs)).await;
                continue;
            }
        }

        let snapshot = active.snapshot();
        let Some(tree) = snapshot.run.as_ref() else {
            continue;
        };
        print_tree(&run_id, tree);
        json_log(
            "poll",
            obj(&[
                ("run_id", v_str(&run_id)),
                ("status", v_str(tree.run.status.as_str())),
                ("failed_children", v_num(tree.failure_count() as f64)),
                ("elapsed_ms", v_num(started.elapsed().as_millis() as f64)),
            ]),
        );

        if cfg.poll_secs == 0 || tree.run.status.is_terminal() {
            return Ok(());
        }
        sleep(Duration::from_secs(cfg.poll_secs)).await;
    }
}

fn print_tree(run_id: &str, tree: &runview::model::RunNode) {
    let label = if tree.run.name.is_empty() {
        run_id
    } else {
        tree.run.name.as_str()
    };
    println!("{}  [{}]", label, tree.run.status.as_str());
    for row in flatten(tree) {
        let indent = "  ".repeat(row.level);
        match row.error() {
            Some(err) => println!(
                "{}{} {} [failed to load: {}]",
                indent,
                row.kind.as_str(),
                row.label(),
                err
            ),
            None => println!(
                "{}{} {} [{}]",
                indent,
                row.kind.as_str(),
                row.label(),
                row.status_str()
            ),
        }
    }
    let failures = tree.failure_count();
    if failures > 0 {
        println!("({} branches failed to load)", failures);
    }
}
