//! Basic treelog usage example
//!
//! Demonstrates namespaces, severity views, inherited fields and printf-style
//! messages, printed through a console sink.
//!
//! Run with: cargo run --example basic_usage

use serde_json::json;
use treelog::prelude::*;

fn main() -> Result<()> {
    println!("=== treelog - Basic Usage Example ===\n");

    // Everything logged anywhere in the tree reaches the root
    let root = treelog::root();
    root.attach_sink(ConsoleSink::new());
    root.add_field("service", "demo");

    println!("1. Logging through a namespace:");
    let db = treelog::logger("app:db");
    db.info(("connected to %s in %dms", "primary", 12));
    db.debug(("query", json!({"table": "users", "rows": 3})));

    println!("\n2. Child loggers inherit fields:");
    let api = treelog::logger("app").child("api");
    api.add_field("region", "eu");
    api.info("listening");

    println!("\n3. A severity view only sees warn and above:");
    let warnings = MemorySink::new();
    treelog::logger("app").severity(LogLevel::Warn).attach_sink(warnings.clone());
    api.info("not captured");
    api.warn(("slow request: %dms", 1200));
    api.error(ErrorInfo::new("TimeoutError", "upstream timed out").with_code("ETIMEDOUT"));
    println!("   captured {} records under app:", warnings.len());
    for line in warnings.lines() {
        println!("   {}", line);
    }

    treelog::reset();
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
