use std::time::Duration;

/// 创建上游 HTTP 客户端 (连接池复用)
pub fn create_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(20)
        .build()
}
