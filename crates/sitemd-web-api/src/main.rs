#[cfg(feature = "use_mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use sitemd_web_api::{
    Config,
    server::{ServerError, init_tracing, start_server},
};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config = Config::from_env();
    init_tracing(&config);
    start_server(config).await
}
