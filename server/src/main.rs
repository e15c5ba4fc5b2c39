use taptab_server::{Config, Server, print_banner, utils};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv + 日志)
    dotenv::dotenv().ok();
    utils::logger::init_logger();

    // 打印横幅
    print_banner();

    tracing::info!("TapTab POS Server starting...");

    // 2. 加载配置
    let config = Config::from_env();

    // 3. 启动 HTTP 服务器 (Server::run 初始化状态并挂载 Socket.IO)
    let server = Server::new(config);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e);
    }

    Ok(())
}
