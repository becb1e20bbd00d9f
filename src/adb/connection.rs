use crate::core::types::DeviceId;
use crate::error::{NetlogError, Result};
use log::*;
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

const BUFFER_SIZE: usize = 4096;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// A TCP connection to the ADB server's smart socket
pub struct AdbConnection {
    stream: TcpStream,
}

impl AdbConnection {
    /// Create a new connection to the ADB server
    pub fn new(host: &str, port: u16) -> Result<Self> {
        debug!("=== Creating new ADB connection ===");

        let stream = Self::establish_connection(host, port)?;

        Ok(Self { stream })
    }

    /// Connect to ADB server with automatic server startup
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        use crate::adb::server::AdbServer;

        if !AdbServer::is_running(host, port).await {
            AdbServer::start(port).await?;

            if !AdbServer::is_running(host, port).await {
                return Err(NetlogError::Server("Failed to start ADB server".into()));
            }
        }

        Self::new(host, port)
    }

    fn establish_connection(host: &str, port: u16) -> Result<TcpStream> {
        let server_address = format!(
            "{}:{}",
            if host == "localhost" { "127.0.0.1" } else { host },
            port
        );
        debug!("Connecting to address: {}", server_address);

        let address = server_address.to_socket_addrs()?.next().ok_or_else(|| {
            NetlogError::AdbConnection(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not resolve address",
            ))
        })?;
        debug!("Resolved address: {:?}", address);

        let stream = TcpStream::connect(address)?;
        stream.set_read_timeout(Some(DEFAULT_TIMEOUT))?;
        stream.set_write_timeout(Some(DEFAULT_TIMEOUT))?;
        debug!("Connection established");

        Ok(stream)
    }

    /// Route the rest of this connection to one device
    pub fn select_device(&mut self, device_id: &DeviceId) -> Result<()> {
        let command = format!("host:transport:{}", device_id.as_str());
        self.send_command(&command)?;
        self.read_okay()
    }

    /// Send a length-prefixed service request
    pub fn send_command(&mut self, command: &str) -> Result<()> {
        debug!("Sending command: {}", command);
        let request = format!("{:04x}{}", command.len(), command);
        self.write_all(request.as_bytes())
    }

    /// Read and verify OKAY, turning FAIL into an error carrying the server message
    pub fn read_okay(&mut self) -> Result<()> {
        let mut status = [0u8; 4];
        self.stream.read_exact(&mut status)?;

        match &status {
            b"OKAY" => Ok(()),
            b"FAIL" => {
                let message = self.read_length_prefixed()?;
                Err(NetlogError::AdbProtocol(format!("Command failed: {}", message)))
            }
            _ => Err(NetlogError::AdbProtocol(format!(
                "Expected OKAY response. Got {:?}",
                String::from_utf8_lossy(&status)
            ))),
        }
    }

    /// Read a payload prefixed with four ASCII hex digits
    pub fn read_length_prefixed(&mut self) -> Result<String> {
        let mut len_bytes = [0u8; 4];
        self.stream.read_exact(&mut len_bytes)?;
        let len = usize::from_str_radix(std::str::from_utf8(&len_bytes)?, 16)
            .map_err(|e| NetlogError::AdbProtocol(format!("Invalid length prefix: {}", e)))?;

        let mut payload = vec![0u8; len];
        self.stream.read_exact(&mut payload)?;
        Ok(String::from_utf8_lossy(&payload).to_string())
    }

    /// Read until the server closes the stream
    pub fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut buffer = [0u8; BUFFER_SIZE];
        let mut response = Vec::new();

        loop {
            match self.stream.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => response.extend_from_slice(&buffer[..n]),
                Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!("Error reading from socket: {}", e);
                    return Err(NetlogError::AdbConnection(e));
                }
            }
        }

        debug!("Read {} bytes before close", response.len());
        Ok(response)
    }

    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.stream.set_read_timeout(timeout)?;
        Ok(())
    }

    pub fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.stream.write_all(buf)?;
        Ok(())
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.stream.read_exact(buf)?;
        Ok(())
    }
}
