//! CLI for the dfget download client.

mod rate;

use anyhow::Result;
use clap::Parser;
use dfget_core::config;
use dfget_core::context::{assert_context, RunContext};
use dfget_core::logging::{self, LogOptions};

use rate::parse_rate;

/// Top-level CLI for dfget.
#[derive(Debug, Parser)]
#[command(name = "dfget")]
#[command(about = "dfget: peer-assisted file download client", long_about = None)]
pub struct Cli {
    /// HTTP/HTTPS URL of the file to download.
    #[arg(short = 'u', long, default_value = "")]
    pub url: String,

    /// Destination path; defaults to the URL's file name in the current directory.
    #[arg(short = 'o', long, default_value = "")]
    pub output: String,

    /// Download rate limit, e.g. 20M or 512K.
    #[arg(short = 's', long = "locallimit", value_parser = parse_rate)]
    pub local_limit: Option<u64>,

    /// Rate limit shared by all downloads on this machine.
    #[arg(long = "totallimit", value_parser = parse_rate)]
    pub total_limit: Option<u64>,

    /// Download timeout in seconds.
    #[arg(short = 'e', long)]
    pub timeout: Option<u64>,

    /// Expected MD5 of the downloaded file.
    #[arg(short = 'm', long, default_value = "")]
    pub md5: String,

    /// Identifier used to share cached content between URLs.
    #[arg(short = 'i', long, default_value = "")]
    pub identifier: String,

    /// Name of the system invoking dfget.
    #[arg(long = "callsystem", default_value = "")]
    pub call_system: String,

    /// Download pattern: p2p or cdn.
    #[arg(short = 'p', long)]
    pub pattern: Option<String>,

    /// Print version and exit.
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Extra request header `key:value`; may be repeated.
    #[arg(long)]
    pub header: Vec<String>,

    /// Supernode addresses, comma separated.
    #[arg(short = 'n', long, value_delimiter = ',')]
    pub node: Vec<String>,

    /// Do not fall back to the source when no supernode is available.
    #[arg(long)]
    pub notbs: bool,

    /// Show a progress bar.
    #[arg(short = 'b', long = "showbar")]
    pub show_bar: bool,

    /// Also print the client log to the console.
    #[arg(long)]
    pub console: bool,

    /// Log at debug level.
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    /// Copies command-line values over `ctx`; unset options keep the
    /// config-file or built-in defaults.
    pub fn apply(self, ctx: &mut RunContext) {
        ctx.url = self.url;
        ctx.output = self.output;
        if let Some(limit) = self.local_limit {
            ctx.local_limit = limit;
        }
        if let Some(limit) = self.total_limit {
            ctx.total_limit = limit;
        }
        if let Some(timeout) = self.timeout {
            ctx.timeout = timeout;
        }
        if let Some(pattern) = self.pattern {
            ctx.pattern = pattern;
        }
        if !self.node.is_empty() {
            ctx.node = self.node;
        }
        ctx.md5 = self.md5;
        ctx.identifier = self.identifier;
        ctx.call_system = self.call_system;
        ctx.version = self.version;
        ctx.header = self.header;
        ctx.notbs = self.notbs;
        ctx.show_bar = self.show_bar;
        ctx.console = self.console;
        ctx.verbose = self.verbose;
    }

    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let mut ctx = RunContext::new();
        cfg.apply(&mut ctx);
        cli.apply(&mut ctx);

        if ctx.version {
            println!("dfget {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }

        let opts = LogOptions {
            verbose: ctx.verbose,
            console: ctx.console,
        };
        ctx.client_logger = Some(logging::client_log(&ctx.work_home, opts));
        ctx.server_logger = Some(logging::server_log(&ctx.work_home, opts));

        assert_context(&mut ctx)?;

        if let Some(client) = &ctx.client_logger {
            client.in_scope(|| tracing::info!("context: {}", ctx));
        }
        println!("{}", ctx);
        Ok(())
    }
}
