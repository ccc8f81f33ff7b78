//! # trace3-crypto
//!
//! trace3 ログファイルの独自ブロック暗号と鍵ローテーション管理
//!
//! trace3 形式のペイロード暗号化に使われる独自ストリーム暗号を実装するクレート。
//! `no_std` + `alloc` 環境（WASM を含む）で動作する。
//!
//! ## trace3 の暗号化仕様
//!
//! ```text
//! 鍵セットアップ:
//!   16 バイト鍵 → 4 つの u32 ワード (little-endian)
//!   各ワードを固定ホワイトニング定数と XOR → ラウンド鍵
//!
//! ストリーム構造 (フレームごとに独立):
//!   IV (8 バイト、固定定数で初期化)
//!   → 32 ラウンドのミキシング → 8 バイトのキーストリーム
//!   → 暗号文と XOR → 平文
//!   → IV を「暗号文」バイトで上書き (CFB 方式のチェイニング)
//!
//! 鍵ローテーション:
//!   Key レコード出現オフセットごとに鍵を切り替える。
//!   オフセット t のフレームには「offset <= t を満たす最後の鍵」を適用。
//!   エントリがなければ組み込みデフォルト鍵を使う。
//! ```
//!
//! ミキシング関数の右シフトは算術シフト（符号保存）であることに注意。
//! 論理シフトで移植すると復号結果がビット単位で食い違う。

#![no_std]
extern crate alloc;

mod cipher;
mod error;
mod keychain;

pub use cipher::BlockCipher;
pub use error::CryptoError;
pub use keychain::{KeyChain, KeyEntry, KEY_LEN};

/// Key レコードを一つも含まないファイルに適用される組み込みデフォルト鍵
pub const DEFAULT_KEY: [u8; 16] = [
    0x98, 0xFA, 0x2E, 0x08, 0x89, 0x6C, 0x4E, 0xEC,
    0xE6, 0x21, 0x28, 0x45, 0x77, 0x13, 0xD0, 0x38,
];

/// Base64 文字列を 16 バイトのセッション鍵にデコードする
///
/// ビューアの設定からホストが渡す鍵フォーマット（標準アルファベット、
/// パディングあり、24 文字）。
pub fn decode_base64_key(key_b64: &str) -> Result<[u8; 16], CryptoError> {
    use base64::Engine as _;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(key_b64)
        .map_err(|_| CryptoError::InvalidBase64)?;

    if bytes.len() != KEY_LEN {
        return Err(CryptoError::InvalidKeyLength);
    }

    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&bytes);
    Ok(key)
}
