// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-source layer example.
//!
//! This example demonstrates:
//! - Loading one layer from a YAML file and another from environment variables
//! - How higher layers override lower ones field by field
//! - Inspecting the overlay held by each layer
//!
//! To run this example:
//! ```bash
//! # Set some environment variables (these override the YAML file)
//! export DEMO_NAME="from-env"
//! export DEMO_DATABASE__HOST="db.example.com"
//!
//! cargo run --example multi_source --features yaml,env
//! ```

mod shared;

use layerbroker::prelude::*;
use shared::ServiceConfig;
use std::env;

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    println!("=== Layer Broker: Multi-Source Example ===\n");

    let yaml_content = r#"
name: from-yaml
port: 8443
database:
  host: localhost
  port: 6432
"#;

    let temp_dir = env::temp_dir();
    let config_path = temp_dir.join("layerbroker_multi_source.yaml");
    std::fs::write(&config_path, yaml_content)?;
    println!("Created YAML overlay at: {}\n", config_path.display());

    let broker = LayerBroker::new(["file", "env"], ServiceConfig::default())?;

    println!("--- Layer 1: YAML file ---");
    let yaml = YamlFileAdapter::from_file(&config_path)?;
    broker.load_layer("file", &yaml)?;
    println!("{:?}", broker.layer("file")?);

    println!("\n--- Layer 2: Environment (prefix DEMO_) ---");
    let env_adapter = EnvVarAdapter::with_prefix("DEMO_");
    broker.load_layer("env", &env_adapter)?;
    println!("{:?}", broker.layer("env")?);

    println!("\n--- Effective value ---");
    let value = broker.get();
    println!("name     = {}", value.name);
    println!("port     = {}", value.port);
    println!("debug    = {}", value.debug);
    println!("database = {}:{}", value.database.host, value.database.port);

    println!("\n--- Dropping the environment layer ---");
    broker.clear_layer("env")?;
    println!("name     = {}", broker.get().name);

    std::fs::remove_file(&config_path)?;
    println!("\n=== Example Complete ===");
    Ok(())
}
