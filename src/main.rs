use std::process;
use std::sync::Arc;
use tracing::{error, info};

use path_proxy::{
    logging::init_logging,
    proxy::ProxyConfig,
    server::{self, RequestHandler, ServerListener},
    settings::Settings,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "서버 실행 실패");
        eprintln!("{}", e);
        process::exit(1);
    }
}

async fn run() -> server::Result<()> {
    let settings = Settings::load().await?;

    // 파일 출력일 때 guard가 drop되면 남은 로그가 버려지므로 끝까지 유지
    let _log_guard = init_logging(&settings.logging)?;
    info!(
        http_port = settings.server.http_port,
        port_map = %settings.registry.port_map_path.display(),
        "설정 로드 완료"
    );

    let (registry, fallback) = settings.registry.load();
    info!(
        service = %fallback.service,
        port = fallback.port,
        "fallback 대상 설정"
    );

    let handler = Arc::new(RequestHandler::new(
        Arc::new(registry),
        fallback,
        ProxyConfig::from_settings(&settings.upstream),
    ));

    let listener = ServerListener::new(&settings.server).await?;
    listener
        .run_until(handler, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "종료 신호 대기 실패");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!("서버 종료");
    Ok(())
}
