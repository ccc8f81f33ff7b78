//! ペイロードバイト列のテキストデコード
//!
//! Windows-1252 は 0x80..0x9F 帯以外が Unicode コードポイントと
//! 一致するため、必要なのは 32 エントリの対応表だけである。

use alloc::string::String;

/// Windows-1252 の 0x80..0x9F 帯の対応表
///
/// 未割り当ての 5 バイト (0x81, 0x8D, 0x8F, 0x90, 0x9D) は
/// 同値の C1 制御文字へ写す（WHATWG encoding standard と同じ扱い）。
const C1_TABLE: [char; 32] = [
    '\u{20AC}', // 0x80 €
    '\u{0081}', // 0x81 (未割り当て)
    '\u{201A}', // 0x82 ‚
    '\u{0192}', // 0x83 ƒ
    '\u{201E}', // 0x84 „
    '\u{2026}', // 0x85 …
    '\u{2020}', // 0x86 †
    '\u{2021}', // 0x87 ‡
    '\u{02C6}', // 0x88 ˆ
    '\u{2030}', // 0x89 ‰
    '\u{0160}', // 0x8A Š
    '\u{2039}', // 0x8B ‹
    '\u{0152}', // 0x8C Œ
    '\u{008D}', // 0x8D (未割り当て)
    '\u{017D}', // 0x8E Ž
    '\u{008F}', // 0x8F (未割り当て)
    '\u{0090}', // 0x90 (未割り当て)
    '\u{2018}', // 0x91 '
    '\u{2019}', // 0x92 '
    '\u{201C}', // 0x93 "
    '\u{201D}', // 0x94 "
    '\u{2022}', // 0x95 •
    '\u{2013}', // 0x96 –
    '\u{2014}', // 0x97 —
    '\u{02DC}', // 0x98 ˜
    '\u{2122}', // 0x99 ™
    '\u{0161}', // 0x9A š
    '\u{203A}', // 0x9B ›
    '\u{0153}', // 0x9C œ
    '\u{009D}', // 0x9D (未割り当て)
    '\u{017E}', // 0x9E ž
    '\u{0178}', // 0x9F Ÿ
];

/// Windows-1252 の 1 バイトを Unicode 文字へ写す
#[inline]
fn byte_to_char(b: u8) -> char {
    match b {
        0x80..=0x9F => C1_TABLE[(b - 0x80) as usize],
        // 0x00..0x7F は ASCII、0xA0..0xFF は Latin-1 と同一コードポイント
        _ => b as char,
    }
}

/// バイト列を Windows-1252 としてデコードする
///
/// 全バイトが必ず何らかの文字に写るため失敗しない。
pub fn decode_windows_1252(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| byte_to_char(b)).collect()
}

/// バイト列を UTF-8 としてデコードする（Utf8 コードのフレーム用）
///
/// 不正なシーケンスは置換文字 U+FFFD に置き換え、失敗はさせない。
pub fn decode_utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
