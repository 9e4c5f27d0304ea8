// SPDX-License-Identifier: MIT OR Apache-2.0

//! Basic usage example for the layered configuration broker.
//!
//! This example demonstrates:
//! - Creating a broker with named layers
//! - Setting and clearing layer overlays
//! - Precedence between layers
//! - Editing a layer with a transaction
//!
//! To run this example:
//! ```bash
//! cargo run --example basic_usage
//! ```

mod shared;

use layerbroker::prelude::*;
use shared::{DatabaseConfigPartial, ServiceConfig, ServiceConfigPartial};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    println!("=== Layer Broker: Basic Usage ===\n");

    let broker = LayerBroker::new(["defaults", "file", "env", "cli"], ServiceConfig::default())?;
    println!("Layers (lowest first): {:?}", broker.layer_names());
    println!("Base value: {:?}\n", broker.get());

    println!("--- Example 1: Setting layers ---");
    broker.set_layer(
        "file",
        ServiceConfigPartial {
            port: Some(9090),
            ..Default::default()
        },
    )?;
    broker.set_layer(
        "env",
        ServiceConfigPartial {
            name: Some("from-env".to_string()),
            ..Default::default()
        },
    )?;
    let value = broker.get();
    println!("name = {}, port = {}", value.name, value.port);

    println!("\n--- Example 2: Precedence ---");
    broker.set_layer(
        "cli",
        ServiceConfigPartial {
            port: Some(3000),
            ..Default::default()
        },
    )?;
    println!("cli sets port 3000 -> port = {}", broker.get().port);
    broker.set_layer(
        "file",
        ServiceConfigPartial {
            port: Some(9999),
            ..Default::default()
        },
    )?;
    println!("file sets port 9999 -> port = {} (cli still wins)", broker.get().port);

    println!("\n--- Example 3: Clearing layers ---");
    broker.clear_layer("cli")?;
    println!("cli cleared -> port = {}", broker.get().port);
    broker.clear_layer("env")?;
    println!("env cleared -> name = {}", broker.get().name);

    println!("\n--- Example 4: Transactions ---");
    broker.transaction("env", |overlay: &mut ServiceConfigPartial| {
        overlay.debug = Some(true);
        overlay.database = Some(DatabaseConfigPartial {
            host: Some("db.internal".to_string()),
            port: Some(6432),
        });
        Ok::<_, BoxError>(())
    })?;
    let value = broker.get();
    println!(
        "debug = {}, database = {}:{}",
        value.debug, value.database.host, value.database.port
    );

    let aborted = broker.transaction("env", |overlay: &mut ServiceConfigPartial| {
        overlay.port = Some(0);
        Err("port 0 is not allowed")
    });
    match aborted {
        Err(e) => println!("✗ {} (port still {})", e, broker.get().port),
        Ok(()) => println!("✓ transaction applied"),
    }

    println!("\n--- Example 5: Error handling ---");
    match broker.set_layer("remote", ServiceConfigPartial::default()) {
        Err(e) => println!("✗ {}", e),
        Ok(()) => println!("✓ unexpected success"),
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
