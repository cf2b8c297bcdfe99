//! Builtin commands: verbs executed synchronously in the interpreter's own
//! process, never forked.
//!
//! Routing is an explicit enum lookup over the full verb string. Argument
//! shapes are declared with [`argh`] (`FromArgs`), so a wrong argument count
//! produces the generated usage text and no side effects.

use crate::command::{Command, ExitCode};
use crate::env::Environment;
use crate::remote::RemoteClient;
use anyhow::{Context, Result, bail};
use argh::{EarlyExit, FromArgs};
use std::env as stdenv;
use std::fs;
use std::path::{Path, PathBuf};

/// The set of reserved command names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `quit`: end the session (short-circuited by the executor).
    Quit,
    /// `cd`: change the interpreter's working directory.
    Cd,
    /// `ccon`: connect to a storage server.
    Connect,
    /// `cdisc`: drop the storage session.
    Disconnect,
    /// `cls`: list remote files.
    List,
    /// `cput`: upload a local file.
    Put,
    /// `cget`: download a remote file.
    Get,
    /// `crm`: delete a remote file.
    Remove,
}

impl Builtin {
    /// Look a verb up by its full name.
    pub fn lookup(verb: &str) -> Option<Builtin> {
        match verb {
            "quit" => Some(Builtin::Quit),
            "cd" => Some(Builtin::Cd),
            "ccon" => Some(Builtin::Connect),
            "cdisc" => Some(Builtin::Disconnect),
            "cls" => Some(Builtin::List),
            "cput" => Some(Builtin::Put),
            "cget" => Some(Builtin::Get),
            "crm" => Some(Builtin::Remove),
            _ => None,
        }
    }
}

/// Execute a builtin against the interpreter context.
///
/// Usage errors and "not connected" checks happen before any side effect;
/// remote verbs block until the exchange completes or fails.
pub fn dispatch(
    builtin: Builtin,
    cmd: &Command,
    env: &mut Environment,
    remote: &mut Option<RemoteClient>,
) -> Result<ExitCode> {
    match builtin {
        Builtin::Quit => {
            env.should_exit = true;
            Ok(0)
        }
        Builtin::Cd => cd(cmd, env),
        Builtin::Connect => ccon(cmd, remote),
        Builtin::Disconnect => cdisc(cmd, remote),
        Builtin::List => cls(cmd, remote),
        Builtin::Put => cput(cmd, remote),
        Builtin::Get => cget(cmd, remote),
        Builtin::Remove => crm(cmd, remote),
    }
}

/// Parse a builtin's arguments, reporting usage text on mismatch.
fn parse<T: FromArgs>(verb: &str, cmd: &Command) -> Result<T, ExitCode> {
    let args: Vec<&str> = cmd.args().iter().map(String::as_str).collect();
    T::from_args(&[verb], &args).map_err(|EarlyExit { output, status }| match status {
        Ok(()) => {
            print!("{}", output);
            0
        }
        Err(()) => {
            eprint!("{}", output);
            1
        }
    })
}

fn session<'a>(remote: &'a mut Option<RemoteClient>) -> Result<&'a mut RemoteClient> {
    remote.as_mut().context("not connected to any server")
}

#[derive(FromArgs)]
/// Change the current working directory.
/// With no target (or `~`), changes to the directory named by HOME.
struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory
    target: Option<String>,
}

fn cd(cmd: &Command, env: &mut Environment) -> Result<ExitCode> {
    let args = match parse::<Cd>("cd", cmd) {
        Ok(a) => a,
        Err(code) => return Ok(code),
    };

    let target = match args.target.as_deref() {
        Some(t) if !t.is_empty() && t != "~" => PathBuf::from(t),
        _ => {
            let home = env.get_var("HOME").context("cd: HOME not set")?;
            PathBuf::from(home)
        }
    };

    let new_dir = if target.is_absolute() {
        target
    } else {
        env.current_dir.join(target)
    };

    let canonical = fs::canonicalize(&new_dir)
        .with_context(|| format!("cd: can't canonicalize {}", new_dir.display()))?;

    stdenv::set_current_dir(&canonical)
        .with_context(|| format!("cd: can't chdir to {}", canonical.display()))?;
    env.current_dir = canonical;
    Ok(0)
}

#[derive(FromArgs)]
/// Connect to a cloud storage server.
struct Ccon {
    #[argh(positional)]
    /// server host name or IP address
    host: String,

    #[argh(positional)]
    /// server TCP port
    port: u16,
}

fn ccon(cmd: &Command, remote: &mut Option<RemoteClient>) -> Result<ExitCode> {
    let args = match parse::<Ccon>("ccon", cmd) {
        Ok(a) => a,
        Err(code) => return Ok(code),
    };
    if remote.is_some() {
        bail!("already connected to a server; disconnect first");
    }
    let client = RemoteClient::connect(&args.host, args.port)?;
    *remote = Some(client);
    println!("Connected to server {} on port {}", args.host, args.port);
    Ok(0)
}

#[derive(FromArgs)]
/// Disconnect from the cloud storage server.
struct Cdisc {}

fn cdisc(cmd: &Command, remote: &mut Option<RemoteClient>) -> Result<ExitCode> {
    if let Err(code) = parse::<Cdisc>("cdisc", cmd) {
        return Ok(code);
    }
    if remote.take().is_none() {
        bail!("not connected to any server");
    }
    println!("Disconnected from server.");
    Ok(0)
}

#[derive(FromArgs)]
/// List the files stored on the cloud storage server.
struct Cls {}

fn cls(cmd: &Command, remote: &mut Option<RemoteClient>) -> Result<ExitCode> {
    if let Err(code) = parse::<Cls>("cls", cmd) {
        return Ok(code);
    }
    let client = session(remote)?;
    let names = client.list()?;
    println!("Files on server:");
    for name in names {
        println!(" - {}", name);
    }
    Ok(0)
}

#[derive(FromArgs)]
/// Upload a local file to the cloud storage server.
struct Cput {
    #[argh(positional)]
    /// path of the local file to upload
    local_file: String,

    #[argh(positional)]
    /// name to store the file under on the server
    remote_file: String,
}

fn cput(cmd: &Command, remote: &mut Option<RemoteClient>) -> Result<ExitCode> {
    let args = match parse::<Cput>("cput", cmd) {
        Ok(a) => a,
        Err(code) => return Ok(code),
    };
    let client = session(remote)?;
    let message = client.upload(Path::new(&args.local_file), &args.remote_file)?;
    println!("{}", message);
    Ok(0)
}

#[derive(FromArgs)]
/// Download a file from the cloud storage server.
struct Cget {
    #[argh(positional)]
    /// name of the file on the server
    remote_file: String,

    #[argh(positional)]
    /// local path to write the file to
    local_file: String,
}

fn cget(cmd: &Command, remote: &mut Option<RemoteClient>) -> Result<ExitCode> {
    let args = match parse::<Cget>("cget", cmd) {
        Ok(a) => a,
        Err(code) => return Ok(code),
    };
    let client = session(remote)?;
    let bytes = client.download(&args.remote_file, Path::new(&args.local_file))?;
    println!("File {} downloaded successfully ({} bytes)", args.local_file, bytes);
    Ok(0)
}

#[derive(FromArgs)]
/// Delete a file from the cloud storage server.
struct Crm {
    #[argh(positional)]
    /// name of the file on the server
    remote_file: String,
}

fn crm(cmd: &Command, remote: &mut Option<RemoteClient>) -> Result<ExitCode> {
    let args = match parse::<Crm>("crm", cmd) {
        Ok(a) => a,
        Err(code) => return Ok(code),
    };
    let client = session(remote)?;
    let message = client.delete(&args.remote_file)?;
    println!("{}", message);
    Ok(0)
}
