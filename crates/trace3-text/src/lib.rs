//! # trace3-text
//!
//! trace3 ペイロードのテキストデコードとインラインカラータグの抽出。
//!
//! ## エンコーディング
//!
//! 復号済みペイロードのエンコーディングはフレームのコードで決まる:
//! Utf8 コードのフレームだけが UTF-8、それ以外はすべて西欧系
//! シングルバイトコードページ (Windows-1252)。ヘッダーのプリアンブルも
//! 同じコードページでデコードされる。
//!
//! ## カラータグのマイクロフォーマット
//!
//! ```text
//! foo'`I05`'bar
//!    ^^^      開きマーカー  '`I
//!       ^^    16進 2 桁     00〜0F がパレット番号
//!         ^^  閉じマーカー  `'
//!
//! → テキスト "foobar" + パレット 5 番 (purple)
//! ```
//!
//! 範囲外の番号や桁数の合わないタグは「タグではない」ものとして
//! 原文をそのまま残す。

#![no_std]
extern crate alloc;

pub mod color;
pub mod encoding;

pub use color::{extract_color, TextColor};
pub use encoding::{decode_utf8, decode_windows_1252};
