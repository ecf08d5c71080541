// ==========================================
// 日志文件输出测试
// ==========================================
// 全局订阅者每个测试进程只能安装一次,本文件仅含一个测试
// ==========================================

use tempfile::TempDir;
use vendor_stock_upload::logging;

#[test]
fn test_init_with_file_appends_events() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("VendorStockUpload.log");
    std::fs::write(&log_path, "previous run\n").unwrap();

    logging::init_with_file(&log_path).unwrap();
    tracing::warn!("[Stock Upload] Error: Row 7: sample event");

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert!(content.starts_with("previous run\n"));
    assert!(content.contains("[Stock Upload] Error: Row 7: sample event"));
}
