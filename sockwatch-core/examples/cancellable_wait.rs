//! Cancellable wait example for Sockwatch.
//!
//! A wait can only end early through its timeout, so cancellation is done
//! by waiting in short slices and checking a flag between them. The wait
//! loop runs on a blocking task so the async side stays responsive.

use sockwatch_core::{SelectorConfig, SocketSelector};
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let (mut writer, reader) = UnixStream::pair()?;
    let cancelled = Arc::new(AtomicBool::new(false));

    let flag = cancelled.clone();
    let waiter = tokio::task::spawn_blocking(move || -> anyhow::Result<usize> {
        let mut selector = SocketSelector::with_config(SelectorConfig {
            retry_on_interrupt: true,
            ..SelectorConfig::default()
        });
        selector.add(reader)?;

        let mut received = 0;
        while !flag.load(Ordering::Acquire) {
            if selector.wait(0.1) == 0 {
                continue;
            }

            if let Some(stream) = selector.get_ready_mut(0) {
                let mut buffer = [0u8; 64];
                let n = stream.read(&mut buffer)?;
                received += n;
                println!("Received {:?}", String::from_utf8_lossy(&buffer[..n]));
            }
        }

        println!("Wait loop cancelled");
        Ok(received)
    });

    for i in 0..3 {
        writer.write_all(format!("message {}", i).as_bytes())?;
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    cancelled.store(true, Ordering::Release);
    let received = waiter.await??;
    println!("Received {} bytes before cancellation", received);

    Ok(())
}
