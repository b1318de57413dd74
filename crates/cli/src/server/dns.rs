use autoptr6_domain::Config;
use autoptr6_infrastructure::dns::DnsServer;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;
use tracing::info;

/// Binds the listeners enabled at startup and spawns their accept loops.
/// A reload can stop a bound transport from taking queries; enabling one that
/// was never bound needs a restart.
pub fn start_dns_server(config: &Config, server: DnsServer) -> anyhow::Result<Vec<JoinHandle<()>>> {
    let ip: IpAddr = config.server.bind_address.parse()?;
    let socket_addr = SocketAddr::new(ip, config.server.port);
    let domain = if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let mut handles = Vec::new();

    if config.server.enable_udp {
        let socket = Arc::new(create_udp_socket(domain, socket_addr)?);
        let udp_server = server.clone();
        handles.push(tokio::spawn(async move { udp_server.serve_udp(socket).await }));
    }

    if config.server.enable_tcp {
        let listener = create_tcp_listener(domain, socket_addr)?;
        let idle_timeout = Duration::from_secs(config.server.tcp_idle_timeout_secs);
        let max_connections = config.server.max_tcp_connections;
        handles.push(tokio::spawn(async move {
            server.serve_tcp(listener, idle_timeout, max_connections).await
        }));
    }

    info!(
        bind_address = %socket_addr,
        udp = config.server.enable_udp,
        tcp = config.server.enable_tcp,
        "DNS server ready"
    );

    Ok(handles)
}

fn create_udp_socket(domain: Domain, socket_addr: SocketAddr) -> anyhow::Result<UdpSocket> {
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.set_recv_buffer_size(512 * 1024)?;
    socket.set_send_buffer_size(512 * 1024)?;
    socket.bind(&socket_addr.into())?;
    socket.set_nonblocking(true)?;
    let std_socket: std::net::UdpSocket = socket.into();
    Ok(UdpSocket::from_std(std_socket)?)
}

fn create_tcp_listener(domain: Domain, socket_addr: SocketAddr) -> anyhow::Result<TcpListener> {
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;
    socket.set_nonblocking(true)?;
    let std_listener: std::net::TcpListener = socket.into();
    Ok(TcpListener::from_std(std_listener)?)
}
