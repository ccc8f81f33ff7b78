//! フローコンテキストの実装

use alloc::collections::BTreeMap;
use alloc::string::String;

use trace3_frame::LineCode;

/// パース 1 回分のフローコンテキスト
///
/// スレッドごとのインデントカウンタは、そのスレッド ID の最初の
/// フレームを見た時点で 0 から始まる（遅延生成）。
pub struct FlowContext {
    /// thread_id → インデントカウンタ（非負）
    indents: BTreeMap<u32, u32>,
    /// 最後に見た Time フレームの値（初期値は空文字列）
    current_time: String,
    /// 最後に見た Day / DayRestarted フレームの値（初期値は空文字列）
    current_date: String,
}

impl FlowContext {
    /// 新しいフローコンテキストを生成する
    pub fn new() -> Self {
        FlowContext {
            indents: BTreeMap::new(),
            current_time: String::new(),
            current_date: String::new(),
        }
    }

    /// フレームの種別に応じてインデントカウンタを更新し、
    /// その行に付けるインデントを返す
    ///
    /// Time フレームはそもそも行にならないため、このメソッドを
    /// 呼ぶ必要はない（呼んでもカウンタは変化しない）。
    pub fn indent_for(&mut self, thread_id: u32, code: LineCode) -> u32 {
        let counter = self.indents.entry(thread_id).or_insert(0);
        match code {
            LineCode::Entry => {
                // インクリメント前の値が行のインデント
                let indent = *counter;
                *counter += 1;
                indent
            }
            LineCode::Exit => {
                // デクリメント後の値が行のインデント。下限は 0
                *counter = counter.saturating_sub(1);
                *counter
            }
            _ => *counter,
        }
    }

    /// Time フレームの値でグローバル時刻コンテキストを更新する
    pub fn set_time(&mut self, time: String) {
        self.current_time = time;
    }

    /// Day / DayRestarted フレームの値でグローバル日付コンテキストを更新する
    pub fn set_date(&mut self, date: String) {
        self.current_date = date;
    }

    /// 現在の時刻コンテキスト（行スナップショット用）
    pub fn current_time(&self) -> &str {
        &self.current_time
    }

    /// 現在の日付コンテキスト（行スナップショット用）
    pub fn current_date(&self) -> &str {
        &self.current_date
    }

    /// これまでに見たスレッド数
    pub fn thread_count(&self) -> usize {
        self.indents.len()
    }
}

impl Default for FlowContext {
    fn default() -> Self {
        Self::new()
    }
}
