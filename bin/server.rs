// Fishing Poles Dashboard - Web Server
// REST API with Axum over the shared SQLite store.

use std::env;
use std::path::PathBuf;

use fishing_poles::api::{router, AppState};
use fishing_poles::store::open_database;

#[tokio::main]
async fn main() {
    println!("🎣 Fishing Poles Dashboard - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let db_path: PathBuf = env::var("POLES_DB")
        .unwrap_or_else(|_| "poles.db".to_string())
        .into();

    let conn = match open_database(&db_path) {
        Ok(conn) => conn,
        Err(e) => {
            eprintln!("❌ Failed to open database at {:?}: {:#}", db_path, e);
            std::process::exit(1);
        }
    };
    println!("✓ Database opened: {:?}", db_path);

    let app = router(AppState::new(conn));

    let addr = env::var("POLES_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://{}", addr);
    println!("   Health:    http://{}/api/", addr);
    println!("   Dashboard: http://{}/api/dashboard?holding_account_id=...&month=YYYY-MM", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
