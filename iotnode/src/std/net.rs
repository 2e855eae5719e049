use ::std::io;
use ::std::net::{self as std_net, UdpSocket};

use crate::config::Config;
use crate::net::{Addrd, Socket};

pub(crate) fn io_to_nb(err: io::Error) -> nb::Error<io::Error> {
  match err.kind() {
    | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => nb::Error::WouldBlock,
    | _ => nb::Error::Other(err),
  }
}

pub(crate) fn ip_from_std(ip: std_net::IpAddr) -> no_std_net::IpAddr {
  match ip {
    | std_net::IpAddr::V4(v4) => {
      let [a, b, c, d] = v4.octets();
      no_std_net::IpAddr::V4(no_std_net::Ipv4Addr::new(a, b, c, d))
    },
    | std_net::IpAddr::V6(v6) => {
      let [a, b, c, d, e, f, g, h] = v6.segments();
      no_std_net::IpAddr::V6(no_std_net::Ipv6Addr::new(a, b, c, d, e, f, g, h))
    },
  }
}

pub(crate) fn ip_to_std(ip: no_std_net::IpAddr) -> std_net::IpAddr {
  match ip {
    | no_std_net::IpAddr::V4(v4) => std_net::IpAddr::V4(v4.octets().into()),
    | no_std_net::IpAddr::V6(v6) => std_net::IpAddr::V6(v6.segments().into()),
  }
}

pub(crate) fn addr_from_std(addr: std_net::SocketAddr) -> no_std_net::SocketAddr {
  no_std_net::SocketAddr::new(ip_from_std(addr.ip()), addr.port())
}

pub(crate) fn addr_to_std(addr: no_std_net::SocketAddr) -> std_net::SocketAddr {
  std_net::SocketAddr::new(ip_to_std(addr.ip()), addr.port())
}

/// Bind a UDP socket for serving `config`.
///
/// The socket blocks for at most [`Config::recv_timeout`] per read and
/// is joined to [`Config::multicast`].
pub fn bind(config: &Config) -> io::Result<UdpSocket> {
  if config.secure && config.credentials().is_none() {
    log::warn!("serving on the DTLS port {} without credentials", config.dtls_port);
  }

  let sock = UdpSocket::bind(("0.0.0.0", config.serve_port()))?;
  let timeout = ::std::time::Duration::from_millis(config.recv_timeout.0.max(1));
  sock.set_read_timeout(Some(timeout))?;

  if let Err(e) = sock.join_multicast(no_std_net::IpAddr::V4(config.multicast)) {
    log::warn!("could not join {}: {}", config.multicast, e);
  }

  Ok(sock)
}

impl Socket for UdpSocket {
  type Error = io::Error;

  fn local_addr(&self) -> no_std_net::SocketAddr {
    UdpSocket::local_addr(self).map(addr_from_std)
                               .unwrap_or_else(|_| {
                                 no_std_net::SocketAddr::new(no_std_net::Ipv4Addr::UNSPECIFIED.into(), 0)
                               })
  }

  fn send(&self, msg: Addrd<&[u8]>) -> nb::Result<(), io::Error> {
    self.send_to(msg.data(), addr_to_std(msg.addr()))
        .map(|_| ())
        .map_err(io_to_nb)
  }

  fn recv(&self, buffer: &mut [u8]) -> nb::Result<Addrd<usize>, io::Error> {
    self.recv_from(buffer)
        .map(|(n, addr)| Addrd(n, addr_from_std(addr)))
        .map_err(io_to_nb)
  }

  fn join_multicast(&self, addr: no_std_net::IpAddr) -> Result<(), io::Error> {
    match ip_to_std(addr) {
      | std_net::IpAddr::V4(group) => {
        self.join_multicast_v4(&group, &std_net::Ipv4Addr::UNSPECIFIED)
      },
      | std_net::IpAddr::V6(group) => self.join_multicast_v6(&group, 0),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn addr_conversions_invert() {
    let v4: std_net::SocketAddr = "10.1.2.3:5683".parse().unwrap();
    let v6: std_net::SocketAddr = "[fe80::1]:5684".parse().unwrap();

    assert_eq!(addr_to_std(addr_from_std(v4)), v4);
    assert_eq!(addr_to_std(addr_from_std(v6)), v6);
  }

  #[test]
  fn timeouts_would_block() {
    assert!(matches!(io_to_nb(io::Error::from(io::ErrorKind::TimedOut)),
                     nb::Error::WouldBlock));
    assert!(matches!(io_to_nb(io::Error::from(io::ErrorKind::PermissionDenied)),
                     nb::Error::Other(_)));
  }

  #[test]
  fn loopback_round_trip() {
    let a = UdpSocket::bind("127.0.0.1:0").unwrap();
    let b = UdpSocket::bind("127.0.0.1:0").unwrap();
    b.set_read_timeout(Some(::std::time::Duration::from_secs(1)))
     .unwrap();

    Socket::send(&a, Addrd(&b"ping"[..], Socket::local_addr(&b))).unwrap();

    let mut buf = [0u8; 16];
    let Addrd(n, from) = Socket::recv(&b, &mut buf).unwrap();
    assert_eq!(&buf[..n], b"ping");
    assert_eq!(from, Socket::local_addr(&a));
  }
}
