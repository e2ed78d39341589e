use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Инспектор store block descriptor'ов (32-байтовые записи VSS store)
#[derive(Parser, Debug)]
#[command(name = "vshadow-blocks", version, about = "VShadow block descriptor inspector")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Decode a single 32-byte record (from hex or from a file at --offset)
    Decode {
        /// Records as hex (spaces and ':' allowed); --offset indexes into the decoded bytes
        #[arg(long, conflicts_with = "file")]
        hex: Option<String>,
        /// Read the record from a file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Byte offset of the record inside the file or the --hex bytes
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Scan consecutive records into an index and print it
    Scan {
        #[arg(long)]
        file: PathBuf,
        /// Byte offset of the first record
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Number of records; default — all whole records after --offset
        #[arg(long)]
        count: Option<usize>,
        /// Index axis: original | relative
        #[arg(long, default_value = "original")]
        order: String,
        /// Store block size override (default from VS_BLOCK_SIZE or 0x4000)
        #[arg(long)]
        block_size: Option<u64>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_hex_and_file_conflict() {
        let r = Cli::try_parse_from(["vshadow-blocks", "decode", "--hex", "00", "--file", "x.bin"]);
        assert!(r.is_err());
    }

    #[test]
    fn decode_hex_keeps_offset() {
        let cli = Cli::try_parse_from(["vshadow-blocks", "decode", "--hex", "00", "--offset", "32"])
            .unwrap();
        match cli.cmd {
            Cmd::Decode { hex, offset, .. } => {
                assert_eq!(hex.as_deref(), Some("00"));
                assert_eq!(offset, 32);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
