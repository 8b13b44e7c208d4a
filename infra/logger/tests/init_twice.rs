use sfetch_logger::{LevelFilter, Logger, LoggerError};
use tracing::Level;

#[test]
fn second_init_keeps_the_first_filter() {
    let _logger = Logger::builder()
        .name("sfetch-server")
        .level(LevelFilter::WARN)
        .debug(true)
        .init()
        .expect("first init should succeed");

    let err = Logger::builder()
        .name("sfetch-cli")
        .level(LevelFilter::TRACE)
        .init()
        .expect_err("second init should fail");

    assert!(
        matches!(err, LoggerError::Subscriber { .. }),
        "expected subscriber error for second init"
    );
    assert!(tracing::enabled!(target: "sfetch_client", Level::DEBUG));
    assert!(!tracing::enabled!(target: "reqwest", Level::INFO));
}
