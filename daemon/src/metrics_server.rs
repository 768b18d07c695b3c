//! Prometheus 메트릭 HTTP 서버.
//!
//! `metrics-exporter-prometheus`의 내장 HTTP 리스너로 스크레이프 엔드포인트를
//! 노출한다.

use std::net::SocketAddr;

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;
use sylogd_core::config::MetricsConfig;

/// 전역 메트릭 레코더를 설치하고 HTTP 리스너를 시작한다.
///
/// 프로세스당 한 번만 호출해야 한다. 이후 모든 `metrics::counter!()`,
/// `metrics::gauge!()`, `metrics::histogram!()` 매크로가 Prometheus
/// 포맷으로 기록된다.
pub fn install_metrics_recorder(config: &MetricsConfig) -> Result<()> {
    if config.endpoint != "/metrics" {
        return Err(anyhow::anyhow!(
            "unsupported metrics endpoint '{}': only '/metrics' is currently supported",
            config.endpoint
        ));
    }

    let addr: SocketAddr = format!("{}:{}", config.bind_ip, config.bind_port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid metrics listen address: {}", e))?;

    if addr.ip().is_unspecified() {
        tracing::warn!(
            listen_addr = %addr,
            "metrics endpoint is exposed on all interfaces; restrict bind_ip in untrusted networks"
        );
    }

    tracing::info!(listen_addr = %addr, "installing Prometheus metrics recorder");

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("failed to install metrics recorder: {}", e))?;

    sylogd_core::metrics::describe_all();

    tracing::info!(listen_addr = %addr, "Prometheus metrics endpoint active");

    Ok(())
}
