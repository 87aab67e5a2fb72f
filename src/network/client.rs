//! Blocking TCP client

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use crate::engine::EngineStats;
use crate::error::{Result, StrataError};
use crate::protocol::{read_response, write_command, Command, Response, Status};

/// A single connection to a StrataKV server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| StrataError::Network(format!("failed to connect: {}", e)))?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Send one command and wait for its response
    pub fn call(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }

    /// Get a value; `None` when the server reports NOT_FOUND
    pub fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let response = self.call(&Command::Get { key: key.to_vec() })?;
        match response.status {
            Status::Ok => Ok(Some(response.payload.unwrap_or_default())),
            Status::NotFound => Ok(None),
            Status::Error => Err(server_error(&response)),
        }
    }

    /// Set a key-value pair
    pub fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let response = self.call(&Command::Set {
            key: key.to_vec(),
            value: value.to_vec(),
        })?;
        expect_ok(&response)
    }

    /// Fetch engine stats
    pub fn stats(&mut self) -> Result<EngineStats> {
        let response = self.call(&Command::Stats)?;
        expect_ok(&response)?;
        response.decode_stats()
    }

    /// Health check
    pub fn ping(&mut self) -> Result<()> {
        let response = self.call(&Command::Ping)?;
        expect_ok(&response)
    }
}

fn expect_ok(response: &Response) -> Result<()> {
    match response.status {
        Status::Ok => Ok(()),
        Status::NotFound => Err(StrataError::Protocol(
            "unexpected NOT_FOUND response".to_string(),
        )),
        Status::Error => Err(server_error(response)),
    }
}

fn server_error(response: &Response) -> StrataError {
    StrataError::Network(format!(
        "server error: {}",
        response.error_message().unwrap_or_default()
    ))
}
