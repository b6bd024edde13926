use flow_gl::{
    Renderer, node,
    logging::{LoggingConfig, init_logging},
};

use crate::common::test_utils::RecordingContext;

mod common;

#[test]
fn should_initialize_logging_only_once() {
    init_logging(LoggingConfig {
        env_filter: Some("flow_gl=trace".to_string()),
        ..Default::default()
    });
    init_logging(LoggingConfig::default());

    // Warnings raised while rendering go through the installed logger.
    let mut renderer = Renderer::new(RecordingContext::new());
    let report = renderer.render(&node().count(3).build());
    assert_eq!(report.skipped, 1);
}
