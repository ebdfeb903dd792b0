use dataforge::{api::Server, config::Config};
use tracing::info;

/// The main entry point for the data-integration helper service.
///
/// This function initializes logging, loads the application configuration,
/// and starts the API server.
#[tokio::main] // Marks the async main function to be run by the Tokio runtime.
async fn main() -> anyhow::Result<()> {
    // Initialize logging using tracing_subscriber.
    // This sets up a default formatter that prints logs to stdout.
    tracing_subscriber::fmt::init();

    // Load the application configuration from the specified TOML file.
    // The `?` operator propagates any errors that occur during loading.
    let config = Config::load("config/default.toml")?;
    // Log the loaded configuration for debugging and informational purposes.
    info!("Service starting with config: {:?}", config);

    // Create a new API server instance with the loaded configuration.
    let server = Server::new(config);
    // Start the API server. This will bind to the configured port and begin
    // listening for incoming requests. The `?` operator propagates any
    // errors that occur during server startup.
    server.start().await?;

    // Return `Ok(())` to indicate successful execution of the main function.
    Ok(())
}
