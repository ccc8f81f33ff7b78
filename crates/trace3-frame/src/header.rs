//! プリアンブル（フリーテキストヘッダー）の抽出
//!
//! ## プリアンブルの例
//!
//! ```text
//! trace3 1.2
//! Compiled: Apr 10 2019 18:32:04
//! OS: Windows 10.0 (Build 17763)
//! Service pack: 1.0
//! Machine name: BUILD-SRV07
//! Products: CoreService 5.2; Gateway 5.2
//! Installation: C:\Program Files\CoreService
//! Started: 2019-04-12 08:15:27
//! .
//! ```
//!
//! 末尾の `.` 行（バイト列 `0x0A 0x2E`）が終端子。終端子の直後に
//! CR / LF があれば読み飛ばし、その次のバイトからフレームが始まる。

use alloc::string::String;

use serde::Serialize;
use trace3_text::decode_windows_1252;

use crate::error::HeaderError;

/// 終端子を探す走査範囲の上限（バイト）
pub const HEADER_SCAN_LIMIT: usize = 4096;

/// プリアンブル終端子 "\n." (0x0A 0x2E)
const TERMINATOR: &[u8] = b"\n.";

/// デコード済みのトレースファイルヘッダー
///
/// 認識できなかった行は個別フィールドには入らないが、`preamble` には
/// 原文がそのまま残る。一度構築されたら変更されない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TraceHeader {
    /// "trace3" で始まるマジック行（行全体）
    pub magic: String,
    /// マジック行の残り（トレース/ファイルフォーマットのバージョン）
    pub version: String,
    /// ライターのビルド日時
    pub compiled: String,
    /// ライターが動いていた OS
    pub os: String,
    /// OS のサービスパック
    pub service_pack: String,
    /// ライターが動いていたマシン名
    pub machine_name: String,
    /// トレース対象の製品群
    pub products: String,
    /// インストール先
    pub installation: String,
    /// トレース開始日時
    pub started: String,
    /// プリアンブル全文（表示用、終端子行まで含む）
    pub preamble: String,
}

/// ヘッダー抽出の結果: ヘッダー本体と、フレームストリームの開始位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedHeader {
    pub header: TraceHeader,
    /// 最初のフレームの先頭バイト位置
    pub body_start: usize,
}

/// バッファ先頭からプリアンブルを抽出する
///
/// # エラー
/// - `HeaderError::TerminatorNotFound`: 先頭 4096 バイト（またはバッファ
///   全体の短い方）に `\n.` がない。部分的なヘッダーは返さない。
pub fn extract_header(buf: &[u8]) -> Result<ExtractedHeader, HeaderError> {
    let limit = buf.len().min(HEADER_SCAN_LIMIT);
    let term = buf[..limit]
        .windows(TERMINATOR.len())
        .position(|w| w == TERMINATOR)
        .ok_or(HeaderError::TerminatorNotFound)?;

    // 終端子 + 直後の CR / LF を読み飛ばした位置がフレームの先頭
    let mut body_start = term + TERMINATOR.len();
    if buf.get(body_start) == Some(&0x0D) {
        body_start += 1;
    }
    if buf.get(body_start) == Some(&0x0A) {
        body_start += 1;
    }

    let preamble = decode_windows_1252(&buf[..body_start]);
    let header = parse_preamble(preamble);

    Ok(ExtractedHeader { header, body_start })
}

/// プリアンブル全文を行ごとに解釈してヘッダーを組み立てる
fn parse_preamble(preamble: String) -> TraceHeader {
    let mut header = TraceHeader::default();

    for line in preamble.lines() {
        let line = line.trim_end_matches('\r');
        if line.starts_with("trace3") {
            header.magic = String::from(line);
            header.version = String::from(line["trace3".len()..].trim());
        } else if let Some(rest) = line.strip_prefix("Compiled:") {
            header.compiled = String::from(rest.trim());
        } else if let Some(rest) = line.strip_prefix("OS:") {
            header.os = String::from(rest.trim());
        } else if let Some(rest) = line.strip_prefix("Service pack:") {
            header.service_pack = String::from(rest.trim());
        } else if let Some(rest) = line.strip_prefix("Machine name:") {
            header.machine_name = String::from(rest.trim());
        } else if let Some(rest) = line.strip_prefix("Products:") {
            header.products = String::from(rest.trim());
        } else if let Some(rest) = line.strip_prefix("Installation:") {
            header.installation = String::from(rest.trim());
        } else if let Some(rest) = line.strip_prefix("Started:") {
            header.started = String::from(rest.trim());
        }
        // 認識できない行は無視（preamble には残る）
    }

    header.preamble = preamble;
    header
}
