// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dynamic layer reload example.
//!
//! This example demonstrates:
//! - Binding a layer to a YAML file on disk
//! - Automatically re-applying the file when it changes
//! - Reacting to the resulting changes through a subscription
//! - Invalid edits being logged and ignored
//!
//! To run this example:
//! ```bash
//! cargo run --example dynamic_reload --features reload
//! ```

mod shared;

use layerbroker::prelude::*;
use shared::ServiceConfig;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    println!("=== Layer Broker: Dynamic Reload Example ===\n");

    let temp_dir = tempfile::TempDir::new()?;
    let config_path = temp_dir.path().join("service.yaml");
    std::fs::write(&config_path, "name: initial\nport: 8080\n")?;
    println!("Created overlay file at: {}", config_path.display());

    let broker = Arc::new(LayerBroker::new(["file", "env"], ServiceConfig::default())?);
    let watcher = FileWatcher::bind(
        Arc::clone(&broker),
        "file",
        &config_path,
        Some(Duration::from_millis(200)),
    )?;
    println!("Initial value: {:?}\n", broker.get());

    let name = broker.subscribe("Name")?;
    let listener = thread::spawn(move || {
        for change in name {
            println!("  [listener] name is now '{}'", change.value.name);
        }
    });

    let edits = [
        "name: first-edit\nport: 8080\n",
        "name: second-edit\nport: 8081\n",
        "name: [this, is, not, a, string]\n",
        "name: third-edit\nport: 8082\n",
    ];
    for edit in edits {
        println!("Writing:\n{}", edit);
        std::fs::write(&config_path, edit)?;
        thread::sleep(Duration::from_millis(600));
        let value = broker.get();
        println!("Effective: name = {}, port = {}\n", value.name, value.port);
    }

    drop(watcher);
    broker.close();
    let _ = listener.join();

    println!("=== Example Complete ===");
    Ok(())
}
