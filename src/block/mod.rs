//! block — store block descriptor: запись 32 байта, descriptor, overlay-цепочки, компараторы.
//!
//! Разделение по подмодулям:
//! - descriptor.rs — BlockDescriptor, BlockFlags, initialize/set_overlay/iter_chain.
//! - record.rs     — декодер/энкодер записи (Size/Empty/Malformed/Populated).
//! - chain.rs      — destroy (forward/reverse), deep clone с бюджетом.
//! - compare.rs    — компараторы по original/relative offset и range-компараторы.

pub mod descriptor;
pub mod record;
pub mod chain;
pub mod compare;

// ---------------- re-exports (внешний API модуля block) ----------------

pub use descriptor::{BlockDescriptor, BlockFlags, ChainIter, DescriptorSummary};

pub use record::{
    block_record_read, block_record_write,
    BlockRecord, RecordSlot, ReadOutcome,
};

pub use chain::{
    destroy, destroy_reverse, destroy_with,
    clone_chain, clone_chain_with_limit,
    TeardownOrder,
};

pub use compare::{
    // infallible (sort/search callbacks)
    cmp_by_original_offset, cmp_by_relative_offset, cmp_reverse,
    cmp_range_by_original_offset_value, cmp_range_by_relative_offset_value,
    // checked (absent operand -> Argument)
    compare_by_original_offset, compare_by_relative_offset, compare_reverse,
    compare_range_by_original_offset_value, compare_range_by_relative_offset_value,
    IndexOrder,
};
