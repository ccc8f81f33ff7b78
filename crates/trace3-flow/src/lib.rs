//! # trace3-flow
//!
//! パース中のフローコンテキスト（スレッドごとの呼び出し深さと
//! 時刻/日付コンテキスト）を追跡する状態機械。
//!
//! ## インデントの規則
//!
//! ```text
//! Entry: 行のインデント = インクリメント「前」のカウンタ。その後 +1
//! Exit:  カウンタを -1（下限 0）。行のインデント = デクリメント「後」の値
//! 他:    カウンタは変化せず、現在値がそのままインデント
//! ```
//!
//! ## 時刻と日付のコンテキスト
//!
//! ```text
//! Time フレーム:            current_time を更新。行は出力しない
//! Day / DayRestarted:       current_date を更新。行も出力される
//! ```
//!
//! どちらもスレッドをまたいだグローバルな値で、出力される各行は
//! 出力時点のスナップショットを持つ。
//!
//! 状態はパース 1 回のスコープに閉じる。モジュールレベルの共有状態は
//! 持たないため、複数ファイルの並行パースが安全にできる。

#![no_std]
extern crate alloc;

pub mod context;

pub use context::FlowContext;
