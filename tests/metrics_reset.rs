use anyhow::Result;

use VShadow::block::block_record_read;
use VShadow::metrics;

// Отдельный тестовый бинарь: reset обнуляет глобальные счётчики всего процесса.
#[test]
fn reset_zeroes_counters() -> Result<()> {
    let mut rec = [0u8; 32];
    let _ = block_record_read(&rec, 0)?;
    rec[8] = 1;
    let _ = block_record_read(&rec, 0)?;
    assert!(metrics::snapshot().records_total() >= 2);

    metrics::reset();
    let m = metrics::snapshot();
    assert_eq!(m.records_total(), 0);
    assert_eq!(m.descriptors_cloned, 0);
    assert_eq!(m.descriptors_released, 0);
    assert_eq!(m.index_inserts, 0);
    assert_eq!(m.index_supersedes, 0);
    assert_eq!(m.empty_ratio(), 0.0);

    // после reset счёт идёт с нуля
    let _ = block_record_read(&rec, 0)?;
    let m = metrics::snapshot();
    assert_eq!(m.records_populated, 1);
    assert_eq!(m.records_empty, 0);
    Ok(())
}
