//! # PDS Command Line
//!
//! Purpose: Issue a single probabilistic-structure command against a store
//! and print the decoded reply as JSON.
//!
//! ## Usage
//!
//! ```text
//! pds-cli [--config FILE | --addr HOST:PORT] <command> <key> [args...]
//! ```

use std::env;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, error};
use tracing_subscriber::{fmt, EnvFilter};

use pds_client::{
    BloomCommands, ClientConfig, CmsCommands, CuckooCommands, PdsClient, TopKCommands,
};

const USAGE: &str = "usage: pds-cli [--config FILE | --addr HOST:PORT] <command> <key> [args...]
commands: bf.add bf.exists bf.card bf.info cf.add cf.exists cf.info
          cms.query cms.info topk.add topk.info topk.list";

struct CliArgs {
    config: ClientConfig,
    command: String,
    key: String,
    rest: Vec<String>,
}

impl CliArgs {
    fn from_args() -> Result<Self> {
        let mut args = env::args().skip(1);
        let mut config = None;
        let mut addr = None;

        let command = loop {
            let arg = args.next().ok_or_else(|| anyhow!("missing command"))?;
            match arg.as_str() {
                "--config" => {
                    let path = args.next().ok_or_else(|| anyhow!("--config needs a file"))?;
                    let loaded = ClientConfig::from_file(&path)
                        .with_context(|| format!("loading config {}", path))?;
                    config = Some(loaded);
                }
                "--addr" => {
                    addr = Some(args.next().ok_or_else(|| anyhow!("--addr needs HOST:PORT"))?);
                }
                "-h" | "--help" => bail!("{}", USAGE),
                _ => break arg.to_ascii_lowercase(),
            }
        };
        let key = args.next().ok_or_else(|| anyhow!("missing key"))?;

        let mut config = config.unwrap_or_default();
        if let Some(addr) = addr {
            config.addr = addr;
        }

        Ok(CliArgs {
            config,
            command,
            key,
            rest: args.collect(),
        })
    }

    fn single_item(&self) -> Result<&str> {
        match self.rest.as_slice() {
            [item] => Ok(item.as_str()),
            _ => bail!("{} takes exactly one item", self.command),
        }
    }

    fn items(&self) -> Result<&[String]> {
        if self.rest.is_empty() {
            bail!("{} needs at least one item", self.command);
        }
        Ok(&self.rest)
    }
}

fn run(cli: &CliArgs) -> Result<String> {
    let client = PdsClient::with_config(cli.config.clone())
        .with_context(|| format!("connecting to {}", cli.config.addr))?;
    let key = cli.key.as_str();

    let cmd = match cli.command.as_str() {
        "bf.add" => client.bf_add(key, cli.single_item()?),
        "bf.exists" => client.bf_exists(key, cli.single_item()?),
        "bf.card" => client.bf_card(key),
        "bf.info" => client.bf_info(key),
        "cf.add" => client.cf_add(key, cli.single_item()?),
        "cf.exists" => client.cf_exists(key, cli.single_item()?),
        "cf.info" => client.cf_info(key),
        "cms.query" => client.cms_query(key, cli.items()?),
        "cms.info" => client.cms_info(key),
        "topk.add" => client.topk_add(key, cli.items()?),
        "topk.info" => client.topk_info(key),
        "topk.list" => client.topk_list(key),
        other => bail!("unsupported command {}\n{}", other, USAGE),
    };
    debug!(%cmd, "completed");

    let reply = cmd.into_result()?;
    Ok(serde_json::to_string_pretty(&reply)?)
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let outcome = CliArgs::from_args().and_then(|cli| run(&cli));
    match outcome {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
