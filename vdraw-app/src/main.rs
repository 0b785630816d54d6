use std::path::{Path, PathBuf};

use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use vdraw_config::{AppConfig, ConfigError, OutputFormat};
use vdraw_frontend::CliOptions;

const USAGE: &str = "用法: vdraw [--config <path>] [--json | --summary] [--pick x,y] [--within x,y,w,h] <input>";

fn main() {
    let mut args = std::env::args().skip(1);
    let mut options = CliOptions::default();
    let mut config_override: Option<PathBuf> = None;
    let mut input: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => options.output = Some(OutputFormat::Json),
            "--summary" => options.output = Some(OutputFormat::Summary),
            "--config" => {
                let Some(path) = args.next() else {
                    exit_with("`--config` 需要提供配置文件路径");
                };
                config_override = Some(PathBuf::from(path));
            }
            "--pick" => {
                let values = coordinates(args.next(), "--pick", 2);
                options.pick = Some((values[0], values[1]));
            }
            "--within" => {
                let values = coordinates(args.next(), "--within", 4);
                options.within = Some([values[0], values[1], values[2], values[3]]);
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                return;
            }
            other if other.starts_with("--") => exit_with(&format!("未知参数：{other}")),
            other => {
                if input.replace(PathBuf::from(other)).is_some() {
                    exit_with("只能指定一个输入文件");
                }
            }
        }
    }

    let Some(input) = input else {
        exit_with(USAGE);
    };

    let loaded = load_configuration(config_override.as_deref());
    let config = loaded.as_ref().cloned().unwrap_or_default();
    init_logging(&config);
    if let Err(err) = &loaded {
        warn!(error = %err, "加载配置失败，使用内建默认值");
    }
    info!("启动 vdraw");

    if let Err(err) = vdraw_frontend::run_cli(&input, &options, &config) {
        error!(error = %err, "处理图纸失败");
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn exit_with(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

/// 解析 `x,y[,...]` 形式的坐标参数，数量不符时直接退出。
fn coordinates(raw: Option<String>, flag: &str, count: usize) -> Vec<f64> {
    let Some(raw) = raw else {
        exit_with(&format!("`{flag}` 需要 {count} 个以逗号分隔的数值"));
    };
    let values: Result<Vec<f64>, _> = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect();
    match values {
        Ok(values) if values.len() == count => values,
        _ => exit_with(&format!("`{flag}` 需要 {count} 个以逗号分隔的数值，实际为 {raw}")),
    }
}

/// 读取配置但不记录日志：此时日志尚未初始化，失败由调用方在 `init_logging` 之后报告。
fn load_configuration(override_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match override_path {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::discover(),
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}
