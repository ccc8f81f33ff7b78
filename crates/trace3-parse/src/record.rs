//! 出力モデル
//!
//! ビューア側の機能（描画・フィルタ・検索・タイムライン集約）は
//! すべてこのモデルだけを消費する。生バイトが下流に渡ることはない。

use alloc::string::String;
use alloc::vec::Vec;

use serde::Serialize;

use trace3_frame::{LineCode, TraceHeader};
use trace3_text::TextColor;

/// デコード済みのトレース行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceLine {
    /// 全フレーム通算の行番号（出力されない Time フレームも消費する）
    pub line_index: usize,
    /// フレーム先頭のファイルオフセット
    pub file_offset: usize,
    /// 書き込み元スレッドの ID
    pub thread_id: u32,
    /// フレームの意味種別
    pub code: LineCode,
    /// ペイロード長（バイト、復号前後で同じ）
    pub length: u16,
    /// 復号・デコード・タグ除去済みのテキスト
    pub content: String,
    /// スレッド内の呼び出し深さ
    pub indent: u32,
    /// 直近の Time フレームの値（なければ空文字列）
    pub timestamp: String,
    /// 直近の Day / DayRestarted フレームの値（なければ空文字列）
    pub date: String,
    /// インラインカラータグが指定した色
    pub text_color: Option<TextColor>,
}

/// パース 1 回分の完全な結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedTrace {
    /// プリアンブルから組み立てたヘッダー
    pub header: TraceHeader,
    /// ファイル順の行の列
    pub lines: Vec<TraceLine>,
    /// 末尾フレームが壊れていた場合の診断メッセージ
    pub warning: Option<String>,
}
