//! The cloud storage server: one thread per client, a flat directory of
//! regular files, and a single coarse lock around each file operation.

use crate::protocol::{
    self, CMD_DELETE, CMD_DOWNLOAD, CMD_LIST, CMD_UPLOAD, RESP_DATA, RESP_ERROR, RESP_OK, SEP,
};
use anyhow::{Context, Result};
use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::{info, warn};

/// Flat-directory file store shared by all client threads.
pub struct Storage {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl Storage {
    /// Open (and create if needed) the storage directory.
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create storage directory {}", dir.display()))?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    /// The directory is flat by contract: a stored name never names a path.
    fn path_for(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() || name == "." || name == ".." || name.contains('/') {
            return None;
        }
        Some(self.dir.join(name))
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn list(&self) -> io::Result<Vec<String>> {
        let _guard = self.guard();
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }

    fn store(&self, name: &str, data: &[u8]) -> Option<io::Result<()>> {
        let path = self.path_for(name)?;
        let _guard = self.guard();
        Some(fs::write(path, data))
    }

    fn load(&self, name: &str) -> Option<io::Result<Vec<u8>>> {
        let path = self.path_for(name)?;
        let _guard = self.guard();
        // The lock is released before the bytes go out on the wire.
        Some(fs::read(path))
    }

    fn remove(&self, name: &str) -> Option<io::Result<()>> {
        let path = self.path_for(name)?;
        let _guard = self.guard();
        Some(fs::remove_file(path))
    }
}

/// Bind and serve forever.
pub fn run(port: u16, dir: PathBuf) -> Result<()> {
    let storage = Arc::new(Storage::new(dir.clone())?);
    let listener = TcpListener::bind(("0.0.0.0", port))
        .with_context(|| format!("cannot listen on port {}", port))?;
    info!(port, dir = %dir.display(), "cloud storage server listening");
    serve(listener, storage)
}

/// Accept loop: one thread per client, matching the original design.
pub fn serve(listener: TcpListener, storage: Arc<Storage>) -> Result<()> {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let storage = Arc::clone(&storage);
                thread::spawn(move || {
                    if let Err(e) = handle_client(stream, storage) {
                        warn!("client handler failed: {:#}", e);
                    }
                });
            }
            Err(e) => warn!("accept failed: {}", e),
        }
    }
    Ok(())
}

fn handle_client(stream: TcpStream, storage: Arc<Storage>) -> Result<()> {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    info!(%peer, "client connected");

    let mut writer = stream.try_clone().context("cannot clone client stream")?;
    let mut reader = BufReader::new(stream);

    while let Some(request) = protocol::read_line(&mut reader)? {
        if request.is_empty() {
            continue;
        }
        info!(%peer, %request, "request");

        let mut fields = request.split(SEP);
        match fields.next().unwrap_or("") {
            CMD_LIST => handle_list(&mut writer, &storage)?,
            CMD_UPLOAD => {
                let name = fields.next();
                let size = fields.next().and_then(|s| s.parse::<usize>().ok());
                match (name, size) {
                    (Some(name), Some(size)) => {
                        handle_upload(&mut reader, &mut writer, &storage, name, size)?
                    }
                    _ => send_error(&mut writer, "Invalid UPLOAD command")?,
                }
            }
            CMD_DOWNLOAD => match fields.next() {
                Some(name) => handle_download(&mut writer, &storage, name)?,
                None => send_error(&mut writer, "Invalid DOWNLOAD command")?,
            },
            CMD_DELETE => match fields.next() {
                Some(name) => handle_delete(&mut writer, &storage, name)?,
                None => send_error(&mut writer, "Invalid DELETE command")?,
            },
            _ => send_error(&mut writer, "Unknown command")?,
        }
    }

    info!(%peer, "client disconnected");
    Ok(())
}

fn send_error<W: Write>(writer: &mut W, message: &str) -> io::Result<()> {
    protocol::send_line(writer, &format!("{RESP_ERROR}{SEP}{message}"))
}

fn send_ok<W: Write>(writer: &mut W, message: &str) -> io::Result<()> {
    protocol::send_line(writer, &format!("{RESP_OK}{SEP}{message}"))
}

fn handle_list<W: Write>(writer: &mut W, storage: &Storage) -> io::Result<()> {
    let names = match storage.list() {
        Ok(names) => names,
        Err(_) => return send_error(writer, "Failed to open directory"),
    };
    send_ok(writer, "File list")?;
    for name in names {
        protocol::send_line(writer, &name)?;
    }
    // An empty line ends the listing.
    protocol::send_line(writer, "")
}

fn handle_upload<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    storage: &Storage,
    name: &str,
    size: usize,
) -> io::Result<()> {
    // The payload is consumed before the lock is taken, so a slow client
    // cannot stall every other connection.
    let data = match protocol::read_exact(reader, size) {
        Ok(data) => data,
        Err(_) => return send_error(writer, "Failed to receive file data"),
    };
    match storage.store(name, &data) {
        Some(Ok(())) => {
            info!(name, size, "uploaded");
            send_ok(writer, "File uploaded successfully")
        }
        Some(Err(_)) => send_error(writer, "Failed to create file"),
        None => send_error(writer, "Invalid file name"),
    }
}

fn handle_download<W: Write>(writer: &mut W, storage: &Storage, name: &str) -> io::Result<()> {
    let data = match storage.load(name) {
        Some(Ok(data)) => data,
        Some(Err(e)) if e.kind() == io::ErrorKind::NotFound => {
            return send_error(writer, "File not found");
        }
        Some(Err(_)) => return send_error(writer, "Failed to read file"),
        None => return send_error(writer, "Invalid file name"),
    };
    protocol::send_line(writer, &format!("{RESP_OK}{SEP}{RESP_DATA}{SEP}{}", data.len()))?;
    writer.write_all(&data)?;
    writer.flush()?;
    info!(name, size = data.len(), "downloaded");
    Ok(())
}

fn handle_delete<W: Write>(writer: &mut W, storage: &Storage, name: &str) -> io::Result<()> {
    match storage.remove(name) {
        Some(Ok(())) => {
            info!(name, "deleted");
            send_ok(writer, "File deleted successfully")
        }
        Some(Err(_)) => send_error(writer, "Failed to delete file"),
        None => send_error(writer, "Invalid file name"),
    }
}
