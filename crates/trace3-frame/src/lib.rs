//! # trace3-frame
//!
//! trace3 ファイルレイアウトの読み取り層。
//!
//! プリアンブル（フリーテキストヘッダー）の抽出と、その後に続く
//! フレームストリームの走査を担当する。
//!
//! ## ファイル全体の構造
//!
//! ```text
//! [プリアンブル: フリーテキスト]
//! [終端子: 0x0A 0x2E ("\n.")][CR?][LF?]
//! [フレーム]*
//!
//! フレーム:
//!   [thread_id: u32 LE][code: u8][length: u16 LE][payload: length バイト]
//!    ^ ヘッダー 7 バイト固定
//! ```
//!
//! ## code 値（10進）
//!
//! ```text
//! 62='>' Entry   60='<' Exit        71='G' Group
//! 68='D' Data    69='E' Error       84='T' Time
//! 116='t' Day    78='N' DayRestarted
//! 85='U' Utf8    75='K' Key         その他 → Unknown
//! ```
//!
//! 末尾の壊れたフレーム（ヘッダー不足・ペイロード超過）は致命的では
//! なく、そこで走査を打ち切って診断情報を残す。致命的なのは
//! プリアンブル終端子が見つからない場合だけである。

#![no_std]
extern crate alloc;

pub mod error;
pub mod frame;
pub mod header;

pub use error::HeaderError;
pub use frame::{FrameEnd, FrameReader, LineCode, RawFrame, FRAME_HEADER_LEN};
pub use header::{extract_header, ExtractedHeader, TraceHeader, HEADER_SCAN_LIMIT};
