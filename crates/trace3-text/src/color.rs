//! インラインカラータグの抽出
//!
//! ## タグの構造
//!
//! ```text
//! '`I05`'
//! ^^^      開きマーカー '`I (3 バイト)
//!    ^^    16進 2 桁（パレット番号 00〜0F）
//!      ^^  閉じマーカー `' (2 バイト)
//! ```
//!
//! タグ全体は常に 7 バイト。番号が範囲外、桁が 16 進でない、
//! 閉じマーカーが続かない場合はタグとみなさず原文を残す。

use alloc::string::String;

use serde::Serialize;

/// 開きマーカー
const TAG_OPEN: &str = "'`I";
/// 閉じマーカー
const TAG_CLOSE: &str = "`'";
/// タグ全体の長さ（バイト）
const TAG_LEN: usize = 7;

/// 16 エントリのセマンティックカラーパレット
///
/// トレース行の表示色。ビューア側のテーマがこの意味色を
/// 実際の描画色へ解決する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextColor {
    Black,
    Maroon,
    Green,
    Olive,
    Navy,
    Purple,
    Teal,
    Silver,
    Gray,
    Red,
    Lime,
    Yellow,
    Blue,
    Fuchsia,
    Aqua,
    White,
}

impl TextColor {
    /// パレット番号 (0〜15) から色を引く。範囲外は `None`
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(TextColor::Black),
            1 => Some(TextColor::Maroon),
            2 => Some(TextColor::Green),
            3 => Some(TextColor::Olive),
            4 => Some(TextColor::Navy),
            5 => Some(TextColor::Purple),
            6 => Some(TextColor::Teal),
            7 => Some(TextColor::Silver),
            8 => Some(TextColor::Gray),
            9 => Some(TextColor::Red),
            10 => Some(TextColor::Lime),
            11 => Some(TextColor::Yellow),
            12 => Some(TextColor::Blue),
            13 => Some(TextColor::Fuchsia),
            14 => Some(TextColor::Aqua),
            15 => Some(TextColor::White),
            _ => None,
        }
    }

    /// パレット番号を返す
    pub fn index(&self) -> u8 {
        *self as u8
    }

    /// 既定の RGB 値（クラシック 16 色）
    pub fn rgb(&self) -> [u8; 3] {
        match self {
            TextColor::Black => [0x00, 0x00, 0x00],
            TextColor::Maroon => [0x80, 0x00, 0x00],
            TextColor::Green => [0x00, 0x80, 0x00],
            TextColor::Olive => [0x80, 0x80, 0x00],
            TextColor::Navy => [0x00, 0x00, 0x80],
            TextColor::Purple => [0x80, 0x00, 0x80],
            TextColor::Teal => [0x00, 0x80, 0x80],
            TextColor::Silver => [0xC0, 0xC0, 0xC0],
            TextColor::Gray => [0x80, 0x80, 0x80],
            TextColor::Red => [0xFF, 0x00, 0x00],
            TextColor::Lime => [0x00, 0xFF, 0x00],
            TextColor::Yellow => [0xFF, 0xFF, 0x00],
            TextColor::Blue => [0x00, 0x00, 0xFF],
            TextColor::Fuchsia => [0xFF, 0x00, 0xFF],
            TextColor::Aqua => [0x00, 0xFF, 0xFF],
            TextColor::White => [0xFF, 0xFF, 0xFF],
        }
    }
}

/// テキストからカラータグを探し、見つかれば取り除く
///
/// # 戻り値
/// - `Some((タグ除去済みテキスト, 色))`: 有効なタグが見つかった
/// - `None`: タグなし、または不正なタグ（原文をそのまま使うこと）
pub fn extract_color(text: &str) -> Option<(String, TextColor)> {
    let start = text.find(TAG_OPEN)?;
    let rest = &text[start + TAG_OPEN.len()..];

    // 16 進 2 桁 + 閉じマーカーが続かなければタグではない
    let digits = rest.get(..2)?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    if !rest.get(2..)?.starts_with(TAG_CLOSE) {
        return None;
    }

    let index = u8::from_str_radix(digits, 16).ok()?;
    let color = TextColor::from_index(index)?;

    let mut cleaned = String::with_capacity(text.len() - TAG_LEN);
    cleaned.push_str(&text[..start]);
    cleaned.push_str(&text[start + TAG_LEN..]);
    Some((cleaned, color))
}
