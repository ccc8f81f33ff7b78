//! 鍵ローテーションチェイン
//!
//! trace3 ファイルは Key レコードでストリーム途中の鍵切り替えを通知する。
//! このモジュールはファイル順に出現した鍵を記録し、任意のオフセットに
//! 適用すべき鍵を解決する。
//!
//! Key レコード自身のペイロードの非対称アンラップは上流実装でも
//! 未実装のため、ペイロード先頭 16 バイトをそのまま鍵として扱う。

use alloc::vec::Vec;

use crate::DEFAULT_KEY;

/// 鍵の長さ（バイト）
pub const KEY_LEN: usize = 16;

/// ファイル中の 1 つの鍵アナウンス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEntry {
    /// Key レコードのファイルオフセット
    pub offset: usize,
    /// 鍵本体（ペイロード先頭 16 バイト、アンラップなし）
    pub key: [u8; KEY_LEN],
}

/// オフセット昇順の鍵ログ
///
/// パース 1 回につき 1 インスタンス。パース完了後は追記されない。
pub struct KeyChain {
    /// エントリがないオフセット帯に適用される鍵
    default_key: [u8; KEY_LEN],
    /// ファイル順（= オフセット昇順）の鍵エントリ
    entries: Vec<KeyEntry>,
}

impl KeyChain {
    /// 組み込みデフォルト鍵でチェインを生成する
    pub fn new() -> Self {
        Self::with_default_key(DEFAULT_KEY)
    }

    /// デフォルト鍵を差し替えてチェインを生成する
    ///
    /// ホストが設定から渡すセッション鍵（`decode_base64_key` 参照）を
    /// 使う場合のコンストラクタ。
    pub fn with_default_key(default_key: [u8; KEY_LEN]) -> Self {
        KeyChain {
            default_key,
            entries: Vec::new(),
        }
    }

    /// Key レコードのペイロードを鍵として追記する
    ///
    /// # 戻り値
    /// - `true`: 追記した
    /// - `false`: ペイロードが 16 バイト未満で鍵にならず、無視した
    pub fn push(&mut self, offset: usize, payload: &[u8]) -> bool {
        if payload.len() < KEY_LEN {
            return false;
        }
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&payload[..KEY_LEN]);
        self.entries.push(KeyEntry { offset, key });
        true
    }

    /// オフセット `offset` のフレームに適用する鍵を解決する
    ///
    /// `entry.offset <= offset` を満たす「最後の」エントリの鍵。
    /// 該当がなければデフォルト鍵。エントリはオフセット昇順なので
    /// 後ろから走査すれば最初の一致が答えになる。
    pub fn select_key(&self, offset: usize) -> [u8; KEY_LEN] {
        self.entries
            .iter()
            .rev()
            .find(|e| e.offset <= offset)
            .map(|e| e.key)
            .unwrap_or(self.default_key)
    }

    /// 記録済みエントリ数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// エントリが一つもないか
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 記録済みエントリの一覧
    pub fn entries(&self) -> &[KeyEntry] {
        &self.entries
    }
}

impl Default for KeyChain {
    fn default() -> Self {
        Self::new()
    }
}
