use anyhow::Result;
use quiz_client::config::Config;
use quiz_client::logger;
use quiz_client::App;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置：QUIZ_CONFIG 指向 TOML 文件时以它为基础，环境变量优先
    let config = match std::env::var("QUIZ_CONFIG") {
        Ok(path) => Config::from_env_with(Config::from_toml_file(Path::new(&path))?)?,
        Err(_) => Config::from_env()?,
    };

    // 初始化日志
    logger::init_with_verbose(config.verbose_logging);

    let args: Vec<String> = std::env::args().skip(1).collect();

    // 初始化并运行应用
    App::initialize(config).await?.run(&args).await?;

    Ok(())
}
