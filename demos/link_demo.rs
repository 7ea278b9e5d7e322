//! Interactive link endpoint.
//!
//! Lines typed on stdin are sent over the link; data received is printed.
//!
//! ```text
//! cargo run --example link_demo -- http://10.0.0.2 10
//! RUST_LOG=ait_link_client=debug cargo run --example link_demo
//! ```

use std::time::Duration;

use ait_link_client::{LinkClient, LinkStatus, PollRate, PollScheduler, SchedulerConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .compact()
        .init();

    let mut args = std::env::args().skip(1);
    let endpoint = args.next().unwrap_or_else(|| "http://127.0.0.1".to_string());
    let rate = args
        .next()
        .map(|s| PollRate::parse(&s))
        .unwrap_or_default();

    let client = LinkClient::builder().endpoint(&endpoint).build()?;
    let config = SchedulerConfig::default().with_rate(rate);
    let mut scheduler = PollScheduler::new(client.clone(), config);
    scheduler.start();
    info!(%endpoint, %rate, "link demo running, type lines to send");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut display = tokio::time::interval(Duration::from_millis(100));
    let mut status = LinkStatus::Unknown;

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(mut line) => {
                    line.push('\n');
                    let units = client.enqueue_chunked(line.as_bytes())?;
                    info!(units, queued = client.outbound_len(), "message queued");
                }
                None => break,
            },
            _ = display.tick() => {
                let received = client.drain_inbound();
                if !received.is_empty() {
                    print!("{}", String::from_utf8_lossy(&received));
                }
                let current = client.current_status();
                if current != status {
                    status = current;
                    info!(link = %status, host = ?client.host(), seq = client.current_sequence(), "status");
                }
            }
        }
    }

    scheduler.stop();
    info!(stats = ?scheduler.stats(), "link demo finished");
    Ok(())
}
