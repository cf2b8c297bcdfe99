//! Client side of the cloud-storage protocol.
//!
//! One [`RemoteClient`] wraps one persistent TCP session. Every operation is
//! a synchronous request/response exchange; a failed operation reports and
//! aborts that operation only; the session is invalidated solely by an
//! explicit disconnect.

use crate::protocol::{
    self, CMD_DELETE, CMD_DOWNLOAD, CMD_LIST, CMD_UPLOAD, RESP_DATA, Response, SEP,
};
use anyhow::{Context, Result, bail};
use std::fs;
use std::io::BufReader;
use std::net::TcpStream;
use std::path::Path;

/// A live session with a storage server.
pub struct RemoteClient {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl RemoteClient {
    /// Open a TCP session to `host:port`.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let writer = TcpStream::connect((host, port))
            .with_context(|| format!("cannot connect to {}:{}", host, port))?;
        let reader = BufReader::new(writer.try_clone().context("cannot clone connection")?);
        Ok(Self { reader, writer })
    }

    fn request(&mut self, line: &str) -> Result<String> {
        protocol::send_line(&mut self.writer, line).context("failed to send request")?;
        self.response_line()
    }

    fn response_line(&mut self) -> Result<String> {
        match protocol::read_line(&mut self.reader).context("failed to read response")? {
            Some(line) => Ok(line),
            None => bail!("no response from server"),
        }
    }

    /// `LIST`: fetch the names of all files stored on the server.
    pub fn list(&mut self) -> Result<Vec<String>> {
        let status = self.request(CMD_LIST)?;
        let resp = Response::parse(&status);
        if !resp.ok {
            bail!("server error: {}", resp.message);
        }
        let mut names = Vec::new();
        loop {
            match protocol::read_line(&mut self.reader).context("failed to read file list")? {
                Some(name) if !name.is_empty() => names.push(name),
                // The list ends at the first empty line; EOF here means the
                // server went away mid-listing, nothing more to collect.
                _ => break,
            }
        }
        Ok(names)
    }

    /// `UPLOAD`: store the contents of `local` under `remote_name`.
    /// Returns the server's success message.
    pub fn upload(&mut self, local: &Path, remote_name: &str) -> Result<String> {
        let data =
            fs::read(local).with_context(|| format!("cannot open file {}", local.display()))?;
        let header = format!("{}{SEP}{}{SEP}{}", CMD_UPLOAD, remote_name, data.len());
        protocol::send_line(&mut self.writer, &header).context("failed to send UPLOAD header")?;
        std::io::Write::write_all(&mut self.writer, &data).context("failed to send file data")?;
        let resp = Response::parse(&self.response_line()?);
        if !resp.ok {
            bail!("server error: {}", resp.message);
        }
        Ok(resp.message)
    }

    /// `DOWNLOAD`: fetch `remote_name` into the file at `local`.
    /// Returns the number of bytes received.
    pub fn download(&mut self, remote_name: &str, local: &Path) -> Result<u64> {
        let status = self.request(&format!("{}{SEP}{}", CMD_DOWNLOAD, remote_name))?;
        let mut fields = status.split(SEP);
        let (ok, data, len) = (fields.next(), fields.next(), fields.next());
        if ok != Some(protocol::RESP_OK) || data != Some(RESP_DATA) {
            bail!("server error: {}", status);
        }
        let len: usize = len
            .and_then(|s| s.parse().ok())
            .with_context(|| format!("malformed DATA response: {}", status))?;
        let bytes = protocol::read_exact(&mut self.reader, len)
            .context("failed to receive file data")?;
        fs::write(local, &bytes)
            .with_context(|| format!("cannot open file {} for writing", local.display()))?;
        Ok(len as u64)
    }

    /// `DELETE`: remove `remote_name` from the server.
    /// Returns the server's success message.
    pub fn delete(&mut self, remote_name: &str) -> Result<String> {
        let status = self.request(&format!("{}{SEP}{}", CMD_DELETE, remote_name))?;
        let resp = Response::parse(&status);
        if !resp.ok {
            bail!("server error: {}", resp.message);
        }
        Ok(resp.message)
    }
}
