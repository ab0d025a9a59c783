use std::fs::OpenOptions;
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, error, info, span, warn, Level};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::routing::ProxyTarget;
use crate::settings::{LogFormat, LogOutput, LogSettings};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 전역 subscriber를 설치합니다.
///
/// `RUST_LOG`가 있으면 설정된 레벨보다 우선합니다. 파일 출력일 때 반환되는 guard는
/// 프로세스가 끝날 때까지 유지해야 버퍼가 비워집니다.
pub fn init_logging(settings: &LogSettings) -> Result<Option<WorkerGuard>, BoxError> {
    match &settings.output {
        LogOutput::Stdout => {
            install(settings, std::io::stdout, true)?;
            Ok(None)
        }
        LogOutput::File(path) => {
            let path = Path::new(path);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            install(settings, writer, false)?;
            Ok(Some(guard))
        }
    }
}

fn install<W>(settings: &LogSettings, writer: W, ansi: bool) -> Result<(), BoxError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(settings.level).into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::new(Rfc3339))
        .with_ansi(ansi)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(writer);

    match settings.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    }
}

#[derive(Debug)]
pub struct RequestLog {
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub backend: Option<String>,
    pub target_url: Option<String>,
    pub fallback: bool,
    pub status_code: u16,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl RequestLog {
    pub fn new() -> Self {
        let request_id = Uuid::new_v4().to_string();
        debug!(request_id = %request_id, "Creating new request log");
        Self {
            request_id,
            method: String::new(),
            path: String::new(),
            backend: None,
            target_url: None,
            fallback: false,
            status_code: 0,
            duration_ms: 0,
            error: None,
        }
    }

    pub fn with_request<B>(&mut self, req: &hyper::Request<B>) {
        self.method = req.method().to_string();
        self.path = req.uri().path().to_string();

        debug!(
            request_id = %self.request_id,
            method = %self.method,
            path = %self.path,
            "Received request"
        );
    }

    pub fn with_target(&mut self, target: &ProxyTarget) {
        self.backend = Some(format!("{}:{}", target.host, target.port));
        self.target_url = Some(target.url());
        self.fallback = target.is_fallback;
    }

    pub fn with_response(&mut self, status: hyper::StatusCode) {
        self.status_code = status.as_u16();
    }

    pub fn with_error(&mut self, error: impl std::fmt::Display) {
        let error_msg = error.to_string();
        error!(
            request_id = %self.request_id,
            error = %error_msg,
            "Request error occurred"
        );
        self.error = Some(error_msg);
    }
}

impl Default for RequestLog {
    fn default() -> Self {
        Self::new()
    }
}

/// 요청 하나에 대한 요약 로그. 결과에 따라 레벨이 달라집니다.
pub fn log_request(log: &RequestLog) {
    let level = if log.error.is_some() {
        Level::ERROR
    } else if log.status_code >= 400 {
        Level::WARN
    } else {
        Level::INFO
    };

    let span = span!(
        Level::INFO,
        "request",
        request_id = %log.request_id,
        method = %log.method,
        path = %log.path,
        status = %log.status_code,
        duration_ms = %log.duration_ms
    );
    let _enter = span.enter();

    match level {
        Level::ERROR => error!(
            backend = ?log.backend,
            target_url = ?log.target_url,
            error = ?log.error,
            "Request failed"
        ),
        Level::WARN => warn!(
            backend = ?log.backend,
            target_url = ?log.target_url,
            fallback = log.fallback,
            "Request completed with warning"
        ),
        _ => info!(
            backend = ?log.backend,
            target_url = ?log.target_url,
            fallback = log.fallback,
            "Request completed successfully"
        ),
    }
}
