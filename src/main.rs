use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use socket2::{Domain, Protocol, Socket, Type};
use std::sync::Arc;
use tokio::net::TcpListener;

mod api;
mod config;
mod handler;
mod http;
mod logger;
mod session;

/// Default config file name; extension resolved by the loader
const CONFIG_FILE: &str = "file_server_config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load_or_default(CONFIG_FILE);

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(serve(cfg))
}

async fn serve(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let listener = create_reusable_listener(addr)?;

    let sessions = Arc::new(session::SessionManager::new(cfg.session.clone()));

    let mut app = handler::AppServer::new(&cfg);
    app.register_handler(Arc::new(api::AuthHandler::new(
        &cfg.api_base,
        Arc::clone(&sessions),
    )))?;
    app.register_handler(Arc::new(api::HikeHandler::new(&cfg.api_base)))?;
    // Registration is complete before serving starts; the app server is
    // read-only from here on.
    let app = Arc::new(app);

    logger::log_server_start(&addr, &cfg);

    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                if cfg.logging.access_log {
                    logger::log_connection_accepted(&peer_addr);
                }
                let app = Arc::clone(&app);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);
                    let service = service_fn(move |req| {
                        let app = Arc::clone(&app);
                        async move { app.handle_request(req).await }
                    });
                    if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                        logger::log_connection_error(&e);
                    }
                });
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}

/// Create a `TcpListener` with `SO_REUSEADDR` enabled, so restarts can
/// rebind a port still in TIME_WAIT state.
fn create_reusable_listener(addr: std::net::SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;

    // Non-blocking mode for async compatibility
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;
    socket.listen(128)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
