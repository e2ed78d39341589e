use anyhow::{Context, Result};
use std::path::PathBuf;

use VShadow::block::IndexOrder;
use VShadow::consts::BLOCK_DESCRIPTOR_SIZE;
use VShadow::metrics;
use VShadow::IndexBuilder;

use super::util::{flags_text, read_all};

pub fn exec(
    file: PathBuf,
    offset: usize,
    count: Option<usize>,
    order: String,
    block_size: Option<u64>,
    json: bool,
) -> Result<()> {
    let data = read_all(&file)?;
    let order: IndexOrder = order.parse()?;

    let mut builder = IndexBuilder::new().order(order);
    if let Some(bs) = block_size {
        builder = builder.block_size(bs);
    }
    let mut index = builder.build();

    let count = count.unwrap_or_else(|| data.len().saturating_sub(offset) / BLOCK_DESCRIPTOR_SIZE);
    let stats = index
        .load_records(&data, offset, count)
        .with_context(|| format!("scan {} at offset {}", file.display(), offset))?;

    if json {
        let descriptors: Vec<_> = index.iter().map(|d| d.summary()).collect();
        let v = serde_json::json!({
            "file": file.display().to_string(),
            "order": order.as_str(),
            "config": index.config().to_string(),
            "stats": stats,
            "descriptors": descriptors,
        });
        println!("{}", serde_json::to_string_pretty(&v)?);
    } else {
        println!("{}", index.config());
        println!(
            "records={} empty={} inserted={} superseded={} forwarders={}",
            stats.records, stats.empty, stats.inserted, stats.superseded, stats.forwarders
        );
        println!("{:>18} {:>18} {:>18} {:>6} flags", "original", "relative", "bitmap", "depth");
        for d in index.iter() {
            println!(
                "{:>#18x} {:>#18x} {:>#18x} {:>6} {}",
                d.original_offset,
                d.relative_offset,
                d.bitmap_offset,
                d.chain_len() - 1,
                flags_text(d.flags.bits())
            );
        }
        let m = metrics::snapshot();
        println!(
            "metrics: populated={} empty={} malformed={} supersedes={}",
            m.records_populated, m.records_empty, m.records_malformed, m.index_supersedes
        );
    }

    index.clear()?;
    Ok(())
}
