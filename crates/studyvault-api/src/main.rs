use studyvault_core::Config;

// mimalloc behaves better than the musl allocator inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    // Database, storage, services, routes
    let (_state, router) = studyvault_api::setup::initialize_app(config.clone()).await?;

    studyvault_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
