use frontedit::config::Config;
use frontedit::error::Result;
use frontedit::server::FrontEditServer;

pub async fn serve(mut config: Config, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind_address = bind;
    }
    let bind_address = config.server.bind_address.clone();

    let server = FrontEditServer::new(config)?;

    println!("{}", server.info().display());
    println!();
    println!("API Endpoints:");
    println!("  GET  /api/health                        - Health check");
    println!("  GET  /metrics                           - Prometheus metrics endpoint");
    println!("  GET  /api/settings?lang=                - All settings for a language");
    println!("  GET  /api/settings/{{key}}                - One setting");
    println!("  PUT  /api/settings/{{key}}                - Save a setting");
    println!("  GET  /api/records/{{table}}/{{id}}/{{field}}  - Read a record field");
    println!("  PUT  /api/records/{{table}}/{{id}}/{{field}}  - Save a record field");
    println!("  PUT  /api/records/{{table}}/{{id}}/image    - Save a record image");
    println!("  POST /api/uploads?file_name=            - Upload an image");
    println!("  GET  /api/edit-mode                     - Edit mode state");
    println!("  POST /api/edit-mode                     - Toggle edit mode");
    println!("  POST /api/translate                     - Translate text");
    println!();
    println!("frontedit listening on http://{bind_address}");
    println!("Press Ctrl+C to stop.\n");

    server
        .start_with_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Shutdown signal received");
                }
                Err(e) => {
                    tracing::error!("Failed to wait for Ctrl+C: {}", e);
                }
            }
        })
        .await?;

    println!("frontedit server stopped.");
    Ok(())
}
