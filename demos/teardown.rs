//! Spawns a few never-ending polls, then cancels them all at once through
//! the process-wide manager, the way a test-runner cleans up between runs.

use std::time::Duration;

use repeat_until::{repeat, LoopResult, RepeatArgs, RepeatManager};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let mut tasks = Vec::new();
    for name in ["menu-closed", "dialog-gone", "panel-loaded"] {
        tasks.push(tokio::spawn(repeat(
            // checks something that never becomes true
            || async { LoopResult::<()>::undone().with_delay(Duration::from_millis(50)) },
            RepeatArgs {
                id: Some(name.to_owned()),
                ..Default::default()
            },
        )));
    }

    // let the polls run for a moment
    tokio::time::sleep(Duration::from_millis(200)).await;
    println!("in flight: {}", RepeatManager::global().len());

    RepeatManager::global().abort_all();
    for task in tasks {
        let settled = task.await.unwrap();
        println!("settled: {settled:?}");
    }
    println!("in flight after teardown: {}", RepeatManager::global().len());
}
