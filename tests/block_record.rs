use anyhow::Result;

use VShadow::block::{block_record_read, block_record_write, BlockRecord, RecordSlot};
use VShadow::{BlockDescriptor, BlockFlags, ErrorKind, ReadOutcome};

// Эталонная запись: OVERLAY, FORWARDER снят, reserved=0x0000ff00.
const RECORD: [u8; 32] = [
    0x00, 0x80, 0xfc, 0xb7, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x80, 0x2c, 0x7e, 0x03, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0xff, 0x00, 0x00,
];

const EMPTY: [u8; 32] = [0u8; 32];

#[test]
fn decode_reference_record() -> Result<()> {
    let mut d = BlockDescriptor::new();
    let outcome = d.read_data(&RECORD, 0)?;
    assert_eq!(outcome, ReadOutcome::Populated);
    assert_eq!(d.original_offset, 0xb7fc8000);
    assert_eq!(d.relative_offset, 0x00048000);
    assert_eq!(d.bitmap_offset, 0x3_7e2c_8000);
    assert_eq!(d.flags, BlockFlags::OVERLAY);
    assert!(d.is_overlay());
    assert!(!d.is_forwarder());
    assert_eq!(d.reserved, 0x0000ff00);
    assert!(d.overlay().is_none());
    Ok(())
}

#[test]
fn forwarder_with_reserved_is_malformed() -> Result<()> {
    let mut bad = RECORD;
    bad[24] = 0x03;

    let mut d = BlockDescriptor::new();
    let err = d.read_data(&bad, 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedRecord);
    // descriptor не тронут
    assert_eq!(d.original_offset, 0);
    assert_eq!(d.relative_offset, 0);
    assert!(d.flags.is_empty());
    Ok(())
}

#[test]
fn forwarder_with_zero_reserved_decodes() -> Result<()> {
    let mut fwd = RECORD;
    fwd[24] = 0x01;
    fwd[28..32].copy_from_slice(&[0, 0, 0, 0]);
    match block_record_read(&fwd, 0)? {
        RecordSlot::Block(r) => {
            assert!(r.is_forwarder());
            assert_eq!(r.bitmap_offset, 0x3_7e2c_8000);
        }
        RecordSlot::Empty => panic!("forwarder record must not be empty"),
    }
    Ok(())
}

#[test]
fn all_zero_record_is_empty() -> Result<()> {
    let mut d = BlockDescriptor::new();
    d.original_offset = 0x1234;
    assert_eq!(d.read_data(&EMPTY, 0)?, ReadOutcome::Empty);
    assert_eq!(d.original_offset, 0x1234, "empty slot must not modify target");
    assert_eq!(block_record_read(&EMPTY, 0)?, RecordSlot::Empty);
    Ok(())
}

#[test]
fn empty_wins_over_forwarder_check() -> Result<()> {
    // нулевые offsets + FORWARDER + reserved != 0 → всё равно Empty
    let mut rec = EMPTY;
    rec[16] = 0x55;
    rec[24] = 0x03;
    rec[28] = 0x01;
    assert_eq!(block_record_read(&rec, 0)?, RecordSlot::Empty);
    Ok(())
}

#[test]
fn short_buffer_is_size_error() {
    for len in 0..32 {
        let err = block_record_read(&RECORD[..len], 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Size, "len={len}");
    }
    let mut buf = vec![0u8; 40];
    buf[..32].copy_from_slice(&RECORD);
    assert_eq!(block_record_read(&buf, 9).unwrap_err().kind(), ErrorKind::Size);
    assert!(block_record_read(&buf, 8).is_ok());
}

// Рандомизированная проверка правил валидации.
#[test]
fn randomized_validation_rules() -> Result<()> {
    let mut rng = oorandom::Rand64::new(0x5eed_b10c);
    for _ in 0..5000 {
        let r = BlockRecord {
            original_offset: if rng.rand_range(0..4) == 0 { 0 } else { rng.rand_u64() as i64 },
            relative_offset: if rng.rand_range(0..4) == 0 { 0 } else { rng.rand_u64() as i64 },
            bitmap_offset: rng.rand_u64() as i64,
            flags: rng.rand_u64() as u32,
            reserved: if rng.rand_range(0..2) == 0 { 0 } else { rng.rand_u64() as u32 },
        };
        let mut buf = [0u8; 32];
        block_record_write(&mut buf, 0, &r)?;

        let got = block_record_read(&buf, 0);
        if r.original_offset == 0 && r.relative_offset == 0 {
            assert_eq!(got?, RecordSlot::Empty);
        } else if r.flags & 0x01 != 0 && r.reserved != 0 {
            assert_eq!(got.unwrap_err().kind(), ErrorKind::MalformedRecord);
        } else {
            assert_eq!(got?, RecordSlot::Block(r));
        }
    }
    Ok(())
}

#[test]
fn descriptor_record_conversion() -> Result<()> {
    let r = match block_record_read(&RECORD, 0)? {
        RecordSlot::Block(r) => r,
        RecordSlot::Empty => panic!("expected block"),
    };
    let d = BlockDescriptor::from_record(&r);
    assert_eq!(d.to_record(), r);
    Ok(())
}
