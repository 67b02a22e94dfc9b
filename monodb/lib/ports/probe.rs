use std::{io::ErrorKind, net::TcpListener};

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// Tells whether a port is currently bound on the host.
pub trait PortProbe: Send + Sync {
    /// Returns `true` if `port` cannot be used.
    fn is_bound(&self, port: u16) -> bool;
}

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Probes ports by trying to bind them on the loopback interface.
#[derive(Debug, Clone, Default)]
pub struct HostPortProbe;

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl PortProbe for HostPortProbe {
    fn is_bound(&self, port: u16) -> bool {
        match TcpListener::bind(("127.0.0.1", port)) {
            Ok(_) => false,
            Err(e) if e.kind() == ErrorKind::AddrInUse => true,
            Err(e) => {
                // Privileged or otherwise unusable ports count as taken.
                tracing::debug!("port {} unusable: {}", port, e);
                true
            }
        }
    }
}

impl<F> PortProbe for F
where
    F: Fn(u16) -> bool + Send + Sync,
{
    fn is_bound(&self, port: u16) -> bool {
        self(port)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_probe_detects_listener() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!(HostPortProbe.is_bound(port));

        drop(listener);
        assert!(!HostPortProbe.is_bound(port));
    }

    #[test]
    fn test_closure_probe() {
        let probe = |port: u16| port == 8080;
        assert!(probe.is_bound(8080));
        assert!(!probe.is_bound(8081));
    }
}
