// SPDX-License-Identifier: MIT OR Apache-2.0

//! Path subscription example.
//!
//! This example demonstrates:
//! - Subscribing to individual field paths and whole subtrees
//! - Receiving notifications on a background thread
//! - Change-only delivery (unchanged or shadowed fields stay quiet)
//! - Unsubscribing and closing the broker
//!
//! To run this example:
//! ```bash
//! cargo run --example subscriptions
//! ```

mod shared;

use layerbroker::prelude::*;
use shared::{DatabaseConfigPartial, ServiceConfig, ServiceConfigPartial};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    println!("=== Layer Broker: Subscriptions ===\n");

    let broker = Arc::new(LayerBroker::new(["file", "env"], ServiceConfig::default())?);
    println!("Subscribable paths:");
    for path in broker.paths() {
        println!("  {}", path);
    }

    // A listener thread for the whole database subtree
    let database = broker.subscribe("Database")?;
    let listener = thread::spawn(move || {
        for change in database {
            println!(
                "  [listener] {} changed -> {}:{}",
                change.path, change.value.database.host, change.value.database.port
            );
        }
        println!("  [listener] subscription closed");
    });

    let port = broker.subscribe("Port")?;

    println!("\n--- Example 1: Only changed paths are notified ---");
    broker.set_layer(
        "file",
        ServiceConfigPartial {
            database: Some(DatabaseConfigPartial {
                host: Some("db.file".to_string()),
                port: None,
            }),
            ..Default::default()
        },
    )?;
    println!("Port notifications pending: {}", port.pending());

    println!("\n--- Example 2: Shadowed changes are silent ---");
    broker.set_layer(
        "env",
        ServiceConfigPartial {
            port: Some(7000),
            ..Default::default()
        },
    )?;
    if let Some(change) = port.recv_timeout(Duration::from_secs(1)) {
        println!("Port changed to {}", change.value.port);
    }
    broker.set_layer(
        "file",
        ServiceConfigPartial {
            port: Some(9000),
            ..Default::default()
        },
    )?;
    println!(
        "file sets port 9000 under env's 7000 -> pending: {}",
        port.pending()
    );

    println!("\n--- Example 3: Unsubscribing ---");
    println!("Live subscriptions: {}", broker.subscriber_count());
    port.unsubscribe();
    println!("After unsubscribe: {}", broker.subscriber_count());

    // Give the listener a moment to print before shutting down
    thread::sleep(Duration::from_millis(100));

    println!("\n--- Example 4: Closing the broker ---");
    broker.close();
    let _ = listener.join();
    println!("Broker closed: {}", broker.is_closed());

    println!("\n=== Example Complete ===");
    Ok(())
}
