use clap::Parser;
use kube::{Client, CustomResourceExt};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::Duration;

use kubeconfig_operator::controller::{self, Context, StatusesReceiver};
use kubeconfig_operator::credential::eks::EksTokenMinter;
use kubeconfig_operator::crd::Cluster;
use kubeconfig_operator::probe::KubeProbe;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Only watch clusters in this namespace
    #[arg(short = 'n', long, env = "WATCH_NAMESPACE")]
    namespace: Option<String>,
    /// Kubeconfig read when a cluster does not set kubeConfigPath
    #[arg(long, env = "KUBECONFIG_PATH", default_value = "/etc/kubeconfig/config")]
    kubeconfig_path: PathBuf,
    #[arg(long)]
    no_api: bool,
    #[arg(long, default_value = "127.0.0.1:2287")]
    api: std::net::SocketAddr,
    /// Seconds before retrying a failed reconcile
    #[arg(long, default_value_t = 5)]
    retry_delay: u64,
    /// Seconds allowed to reach a published cluster
    #[arg(long, default_value_t = 5)]
    probe_timeout: u64,
    /// Print the Cluster CRD and exit
    #[arg(long)]
    print_crd: bool,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    if cli.print_crd {
        print!("{}", serde_yaml::to_string(&Cluster::crd())?);
        return Ok(());
    }

    env_logger::Builder::from_env(env_logger::Env::new().filter_or("RUST_LOG", "info"))
        .format_timestamp_millis()
        .init();

    if let Some(ns) = &cli.namespace {
        info!("starting for namespace {ns}");
    } else {
        info!("starting for all namespaces");
    };

    let client: Client = kube::Config::infer().await?.try_into()?;

    let ctx = Arc::new(Context::new(
        client,
        KubeProbe::new(Duration::from_secs(cli.probe_timeout)),
        EksTokenMinter::from_env(),
        cli.kubeconfig_path,
        Duration::from_secs(cli.retry_delay),
    ));

    if !cli.no_api {
        tokio::spawn(api_server(cli.api, ctx.subscribe()));
    }

    controller::run(ctx, cli.namespace).await;

    info!("shutting down");
    Ok(())
}

async fn api_server(bind: impl Into<std::net::SocketAddr>, statuses: StatusesReceiver) {
    use warp::Filter;

    let server = warp::get()
        .map(move || statuses.clone())
        .map(|rx: StatusesReceiver| {
            let statuses = rx.borrow().clone();
            warp::reply::json(statuses.as_ref())
        });

    warp::serve(server).try_bind(bind).await;
}
