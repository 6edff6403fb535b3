// Listener module
// Builds the TCP listener the accept loop runs on.

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

/// Create a `TcpListener` bound to `addr` with `SO_REUSEADDR` and
/// `SO_REUSEPORT` set, so a quickly restarted server can rebind a port
/// still in `TIME_WAIT`.
pub fn bind_listener(addr: std::net::SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_port(true)?;
    socket.set_reuse_address(true)?;

    // Non-blocking is required before handing the socket to tokio.
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;
    socket.listen(128)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
