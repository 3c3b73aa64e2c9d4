use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use ztds_core::ObjectName;
use ztds_node::{parse_nwid, Node, NodeConfig};
use ztds_store::fs_backend::FileSystemBackend;
use ztds_store::{ListenerBridge, StoreConfig};

#[derive(Parser)]
#[command(name = "ztds", about = "Inspect and edit a node's state object store")]
struct Cli {
    /// Data store root directory.
    #[arg(long, default_value = "./ztds-home")] home: PathBuf,
    /// Buffer size handed to the get listener per call.
    #[arg(long, default_value_t = 4096)] chunk: usize,
    #[arg(long, default_value_t = 1 << 20)] max_object_size: u64,
    #[command(subcommand)] cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Load or create the node identity and print it.
    Identity {
        #[arg(long)] secret: bool,
    },
    /// Read an object and write it to stdout or a file.
    Get {
        name: String,
        #[arg(long)] out: Option<PathBuf>,
    },
    /// Store the contents of a file under a name.
    Put {
        name: String,
        file: PathBuf,
        #[arg(long)] secure: bool,
    },
    Delete { name: String },
    /// Join a network, optionally installing its configuration.
    Join {
        nwid: String,
        #[arg(long)] config: Option<PathBuf>,
    },
    /// Leave a network and remove its stored configuration.
    Leave { nwid: String },
    /// List joined networks.
    Networks,
}

fn open_node(cli: &Cli) -> anyhow::Result<Node> {
    let backend = FileSystemBackend::new(&cli.home)
        .with_context(|| format!("cannot open data store at {}", cli.home.display()))?;
    let config = NodeConfig {
        store: StoreConfig { read_chunk: cli.chunk, max_object_size: cli.max_object_size },
    };
    let node = Node::new(Box::new(ListenerBridge::new(backend)), &mut rand::thread_rng(), config)?;
    debug!("node {} ready on {}", node.address(), cli.home.display());
    Ok(node)
}

fn object_name(name: &str) -> anyhow::Result<ObjectName> {
    ObjectName::new(name).with_context(|| format!("refusing object name {:?}", name))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    if cli.chunk == 0 {
        bail!("--chunk must be at least 1");
    }

    match &cli.cmd {
        Cmd::Identity { secret } => {
            let node = open_node(&cli)?;
            info!("Identity: {}", node.address());
            println!("{}", node.identity().to_identity_string(*secret));
        }
        Cmd::Get { name, out } => {
            let name = object_name(name)?;
            let node = open_node(&cli)?;
            let data = node.store().get(&name).with_context(|| format!("get {}", name))?;
            match out {
                Some(path) => {
                    fs::write(path, &data)?;
                    eprintln!("{} {} ({} bytes) -> {}", "[OK]".green(), name, data.len(), path.display());
                }
                None => std::io::stdout().write_all(&data)?,
            }
        }
        Cmd::Put { name, file, secure } => {
            let name = object_name(name)?;
            let data = fs::read(file).with_context(|| format!("cannot read {}", file.display()))?;
            let node = open_node(&cli)?;
            node.store().put(&name, &data, *secure).with_context(|| format!("put {}", name))?;
            eprintln!("{} stored {} ({} bytes)", "[OK]".green(), name, data.len());
        }
        Cmd::Delete { name } => {
            let name = object_name(name)?;
            let node = open_node(&cli)?;
            node.store().delete(&name).with_context(|| format!("delete {}", name))?;
            eprintln!("{} deleted {}", "[OK]".green(), name);
        }
        Cmd::Join { nwid, config } => {
            let id = parse_nwid(nwid).with_context(|| format!("bad network id {:?}", nwid))?;
            let mut node = open_node(&cli)?;
            node.join(id)?;
            if let Some(path) = config {
                let data = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
                node.set_network_config(id, &data)?;
            }
            let state = match node.network(id).and_then(|n| n.config.as_ref()) {
                Some(c) => format!("config {} bytes", c.len()),
                None => "no config".yellow().to_string(),
            };
            eprintln!("{} joined {:016x} ({})", "[OK]".green(), id, state);
        }
        Cmd::Leave { nwid } => {
            let id = parse_nwid(nwid).with_context(|| format!("bad network id {:?}", nwid))?;
            let mut node = open_node(&cli)?;
            if node.network(id).is_none() {
                eprintln!("{} not a member of {:016x}", "[--]".yellow(), id);
                return Ok(());
            }
            node.leave(id)?;
            eprintln!("{} left {:016x}", "[OK]".green(), id);
        }
        Cmd::Networks => {
            let node = open_node(&cli)?;
            for id in node.networks() {
                let state = match node.network(id).and_then(|n| n.config.as_ref()) {
                    Some(c) => format!("{} bytes", c.len()),
                    None => "no config".to_string(),
                };
                println!("{:016x} {}", id, state);
            }
        }
    }
    Ok(())
}
