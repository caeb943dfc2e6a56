use std::future::ready;
use std::time::Duration;

use repeat_until::{repeat, RepeatArgs};
use tokio::time::Instant;

/// Simulated flaky signal: up from the start, drops out briefly around the
/// half-second mark, then stays up for good.
fn signal_is_up(origin: Instant) -> bool {
    let up_for = origin.elapsed();
    up_for < Duration::from_millis(500) || up_for >= Duration::from_millis(700)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let origin = Instant::now();

    // require a full second of continuous truth, so the early readings
    // before the dropout never count
    let settled = repeat(
        move || ready(signal_is_up(origin)),
        RepeatArgs {
            threshold: Some(Duration::from_secs(1)),
            timeout: Some(Duration::from_secs(10)),
            message: Some("signal never stabilized".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    println!("signal stable after {:?}: {settled:?}", origin.elapsed());
}
