//! # trace3-parse
//!
//! trace3 ファイルのレコードアセンブラ。下位クレートを 1 パスで駆動し、
//! 構造化された行の列を組み立てる。
//!
//! ## パイプライン
//!
//! ```text
//! bytes
//!   → ヘッダー抽出      (trace3-frame::header)
//!   → フレーム走査ループ (trace3-frame::frame)
//!       ├─ 鍵解決 → 復号  (trace3-crypto)
//!       ├─ テキスト化 → カラータグ抽出 (trace3-text)
//!       └─ インデント / 時刻 / 日付コンテキスト (trace3-flow)
//!   → (TraceHeader, Vec<TraceLine>)
//! ```
//!
//! ## 行番号の規則
//!
//! `line_index` は読み取った「全フレーム」に対して増える。行として
//! 出力されない Time フレームも番号を消費するため、出力配列の添字とは
//! 一致しないことがある。これはタイムスタンプへのジャンプ等、
//! 下流機能の位置参照を安定させるための仕様である。
//!
//! ## 並行性
//!
//! パースは純粋な同期計算で、1 回の `parse` 呼び出しが鍵チェインと
//! フローコンテキストを専有する。複数ファイルを並行にパースしても
//! 状態を共有しない。

#![no_std]
extern crate alloc;

mod assembler;
mod error;
mod record;

pub use assembler::TraceParser;
pub use error::ParseError;
pub use record::{ParsedTrace, TraceLine};

// ホストが単一クレートで出力モデルを参照できるように再エクスポート
pub use trace3_frame::{LineCode, TraceHeader};
pub use trace3_text::TextColor;
