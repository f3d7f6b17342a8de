//! Echo server example for Sockwatch.
//!
//! This example runs a single-threaded TCP echo server driven by the
//! readiness selector, with a few clients talking to it from other threads.

use anyhow::{Context, Result};
use socket2::{Domain, Protocol, Socket, Type};
use sockwatch_core::{Handle, ReadinessSelector, INVALID_HANDLE};
use std::collections::HashMap;
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::os::unix::io::AsRawFd;
use std::thread;
use std::time::{Duration, Instant};

const CLIENT_COUNT: usize = 3;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let listener = bind_listener("127.0.0.1:0".parse()?)?;
    let addr = listener.local_addr()?;
    println!("Echo server listening on {}", addr);

    let clients: Vec<_> = (0..CLIENT_COUNT)
        .map(|id| thread::spawn(move || run_client(addr, id)))
        .collect();

    run_server(listener, Duration::from_secs(3))?;

    for client in clients {
        match client.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => eprintln!("Client failed: {:#}", e),
            Err(_) => eprintln!("Client thread panicked"),
        }
    }

    println!("Echo server example completed successfully!");
    Ok(())
}

/// Creates a listening socket with `SO_REUSEADDR` set.
fn bind_listener(addr: SocketAddr) -> Result<TcpListener> {
    let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))
        .context("Failed to create listening socket")?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into()).context("Failed to bind listener")?;
    socket.listen(128).context("Failed to listen")?;
    Ok(socket.into())
}

/// Serves connections until `run_for` has elapsed.
fn run_server(listener: TcpListener, run_for: Duration) -> Result<()> {
    let mut selector = ReadinessSelector::new();
    let listener_handle = listener.as_raw_fd();
    selector.try_add(listener_handle)?;

    let mut connections: HashMap<Handle, TcpStream> = HashMap::new();
    let deadline = Instant::now() + run_for;

    while Instant::now() < deadline {
        let ready = selector.wait(0.25);

        for index in 0..ready {
            let handle = selector.get_ready_socket(index);
            debug_assert_ne!(handle, INVALID_HANDLE);

            if handle == listener_handle {
                let (stream, peer) = listener.accept().context("Failed to accept")?;
                println!("Accepted connection from {}", peer);
                let stream_handle = stream.as_raw_fd();
                selector.try_add(stream_handle)?;
                connections.insert(stream_handle, stream);
                continue;
            }

            let Some(stream) = connections.get_mut(&handle) else {
                continue;
            };

            let mut buffer = [0u8; 1024];
            match stream.read(&mut buffer) {
                Ok(0) => {
                    // Remove before the stream is dropped and its descriptor closed
                    selector.remove(handle);
                    connections.remove(&handle);
                    println!("Connection {} closed", handle);
                }
                Ok(n) => {
                    stream.write_all(&buffer[..n])?;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    eprintln!("Read from {} failed: {}", handle, e);
                    selector.remove(handle);
                    connections.remove(&handle);
                }
            }
        }
    }

    selector.clear();
    Ok(())
}

fn run_client(addr: SocketAddr, id: usize) -> Result<()> {
    let mut stream = TcpStream::connect(addr).context("Failed to connect")?;
    stream.set_read_timeout(Some(Duration::from_secs(2)))?;

    let message = format!("Hello from client {}", id);
    stream.write_all(message.as_bytes())?;

    let mut echoed = vec![0u8; message.len()];
    stream.read_exact(&mut echoed)?;
    anyhow::ensure!(echoed == message.as_bytes(), "echo mismatch");

    println!("Client {} received: {}", id, String::from_utf8_lossy(&echoed));
    Ok(())
}
