pub mod cli;
pub mod errors;
pub mod loader;

use std::path::Path;

use errors::FrontendError;
use tracing::info;
use vdraw_config::AppConfig;

pub use cli::CliOptions;

/// 以命令行模式处理一份图纸。
pub fn run_cli(
    input: &Path,
    options: &CliOptions,
    config: &AppConfig,
) -> Result<(), FrontendError> {
    info!(input = %input.display(), "启动 CLI 前端");
    cli::run(input, options, config)
}
