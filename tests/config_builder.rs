use anyhow::Result;

use VShadow::consts::{BLOCK_SIZE, DEFAULT_MAX_OVERLAY_DEPTH};
use VShadow::{BlockConfig, IndexBuilder, IndexOrder, TeardownOrder};

#[test]
fn defaults_and_setters() {
    let cfg = BlockConfig::default();
    assert_eq!(cfg.block_size, BLOCK_SIZE);
    assert_eq!(cfg.max_overlay_depth, DEFAULT_MAX_OVERLAY_DEPTH);
    assert_eq!(cfg.teardown_order, TeardownOrder::Forward);

    let cfg = BlockConfig::default()
        .with_block_size(0x1000)
        .with_max_overlay_depth(8)
        .with_teardown_order(TeardownOrder::Reverse)
        .build();
    assert_eq!(cfg.block_size, 0x1000);
    assert_eq!(cfg.max_overlay_depth, 8);
    assert_eq!(cfg.teardown_order, TeardownOrder::Reverse);
    let s = cfg.to_string();
    assert!(s.contains("block_size: 0x1000"), "{s}");
    assert!(s.contains("reverse"), "{s}");
}

// Единственный тест, трогающий VS_* переменные окружения.
#[test]
fn from_env_reads_and_ignores_invalid() -> Result<()> {
    std::env::set_var("VS_BLOCK_SIZE", "0x2000");
    std::env::set_var("VS_MAX_OVERLAY_DEPTH", "not-a-number");
    std::env::set_var("VS_TEARDOWN_ORDER", "reverse");

    let cfg = BlockConfig::from_env();
    assert_eq!(cfg.block_size, 0x2000);
    assert_eq!(cfg.max_overlay_depth, DEFAULT_MAX_OVERLAY_DEPTH);
    assert_eq!(cfg.teardown_order, TeardownOrder::Reverse);

    let idx = IndexBuilder::new().order(IndexOrder::Relative).build();
    assert_eq!(idx.order(), IndexOrder::Relative);
    assert_eq!(idx.config().block_size, 0x2000);

    std::env::remove_var("VS_BLOCK_SIZE");
    std::env::remove_var("VS_MAX_OVERLAY_DEPTH");
    std::env::remove_var("VS_TEARDOWN_ORDER");
    Ok(())
}
