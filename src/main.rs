use anyhow::Result;
use clap::Parser;
use deploykf_cli::cli::Cli;
use deploykf_cli::core::user_friendly_error;
use deploykf_cli::version::BuildInfo;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.build_config();

    // SAFETY: no other thread exists before the runtime is built.
    unsafe { config.apply_to_env() };
    config.init_logging();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let build_info = BuildInfo::current();
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    match runtime.block_on(cli.execute(&build_info)) {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
