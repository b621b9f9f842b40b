use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use iclip::commands::dispatch::Dispatcher;
use iclip::commands::output::emit;
use iclip::config::settings::{Config, Overrides, RunOptions};
use iclip::util::logging;

#[derive(Parser)]
#[command(name = "iclip", version)]
#[command(
    about = "Upload a file to Interclip",
    long_about = r#"
        iclip talks to Interclip. Give it one argument:
        • a file path: the file is uploaded and a clip is created for it
        • a URL: a clip is created for it
        • a 5 character clip code: the clip is resolved to its URL
    "#
)]
struct Cli {
    /// File path, URL or clip code
    input: OsString,

    /// verbose output
    #[arg(long = "verbose", short = 'v')]
    verbose: bool,

    /// only upload the file, don't create a clip
    #[arg(long = "upload-only", short = 'u')]
    upload_only: bool,

    /// copy the result to clipboard
    #[arg(long = "copy-on-create", short = 'c')]
    copy_on_create: bool,

    /// base URL of the clip API
    #[arg(long = "endpoint", short = 'e', value_name = "URL")]
    endpoint: Option<String>,

    /// base URL of the upload API
    #[arg(long = "upload-endpoint", value_name = "URL")]
    upload_endpoint: Option<String>,

    /// base URL uploaded files are served from
    #[arg(long = "files-endpoint", value_name = "URL")]
    files_endpoint: Option<String>,

    /// configuration file [default: ~/.iclip/config.toml]
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Cli {
    fn options(&self) -> RunOptions {
        RunOptions {
            verbose: self.verbose,
            upload_only: self.upload_only,
            copy_on_create: self.copy_on_create,
        }
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            api_url: self.endpoint.clone(),
            upload_url: self.upload_endpoint.clone(),
            files_url: self.files_endpoint.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let options = cli.options();
    if let Err(e) = logging::init(options.verbose) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = match Config::from_file(&config_path).and_then(|c| c.apply(cli.overrides())) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let dispatcher = match Dispatcher::from_config(&config, options) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to create HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to build tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    // every handle opened during dispatch is dropped by the time this returns
    let outcome = rt.block_on(dispatcher.run(&cli.input));

    let code = match outcome {
        Ok(result) => {
            let mut stdout = std::io::stdout().lock();
            match emit(&mut stdout, &result, options.copy_on_create) {
                Ok(()) => 0,
                Err(e) => {
                    eprintln!("Failed to write result: {}", e);
                    1
                }
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            1
        }
    };

    std::process::exit(code);
}
