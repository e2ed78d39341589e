#![allow(non_snake_case)]

// Базовые модули
pub mod consts;
pub mod error;
pub mod metrics;
pub mod config;

// Store block descriptors (src/block/{mod,descriptor,record,chain,compare}.rs)
pub mod block;

// Отсортированный индекс descriptor'ов (коллекция для lookup по смещению)
pub mod index;

// Удобные реэкспорты
pub use block::{
    BlockDescriptor, BlockFlags, BlockRecord, IndexOrder, ReadOutcome, RecordSlot,
    TeardownOrder,
};
pub use config::{BlockConfig, IndexBuilder};
pub use error::{BlockError, ErrorKind, Result};
pub use index::{BlockIndex, InsertOutcome, InsertRejected, ScanStats};
