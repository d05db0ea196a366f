use authsmith::cli::args::Cli;
use authsmith::core::context::Context;
use authsmith::core::engine::Engine;
use anyhow::Context as _;
use clap::Parser;
use std::fs::File;
use std::process::ExitCode;
use std::sync::Mutex;

const BANNER: &str = r#"
 ╔════════════════════════════════════════════════════════════════════╗
 ║                                                                    ║
 ║     █████╗ ██╗   ██╗████████╗██╗  ██╗                              ║
 ║    ██╔══██╗██║   ██║╚══██╔══╝██║  ██║                              ║
 ║    ███████║██║   ██║   ██║   ███████║                              ║
 ║    ██╔══██║██║   ██║   ██║   ██╔══██║                              ║
 ║    ██║  ██║╚██████╔╝   ██║   ██║  ██║  SMITH                       ║
 ║    ╚═╝  ╚═╝ ╚═════╝    ╚═╝   ╚═╝  ╚═╝                              ║
 ║                                                                    ║
 ║    Login surface discovery and credential testing                  ║
 ║                                                                    ║
 ║    For authorized security assessments only.                       ║
 ║                                                                    ║
 ╚════════════════════════════════════════════════════════════════════╝
"#;

fn print_banner() {
    println!("\x1b[36m{}\x1b[0m", BANNER); // Cyan color
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = cli.effective_log_level();

    match cli.log_file {
        Some(ref path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    init_logging(&cli)?;

    let ctx = Context::from_cli(cli)?;
    let engine = Engine::new(ctx)?;
    let report = engine.run().await?;
    engine.emit(&report)?;

    Ok(report.is_success())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if !cli.no_banner && !cli.quiet {
        print_banner();
    }

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
