//! # trace3-wasm
//!
//! wasm-bindgen エクスポート：ビューア（ブラウザ / Electron）から呼び出す公開 API。
//!
//! ## 使用方法（TypeScript）
//!
//! ```typescript
//! import { TraceReader, init_panic_hook } from '../trace3-wasm-pkg/trace3_wasm';
//!
//! // パニック時のスタックトレースを有効化（開発時）
//! init_panic_hook();
//!
//! // リーダー初期化（セッション鍵なし = 組み込みデフォルト鍵）
//! const reader = new TraceReader();
//!
//! // 設定にセッション鍵がある場合
//! const reader2 = new TraceReader("mB5Wkd9PQ6kz1d0eR3tLxA==");
//!
//! // ファイル 1 つをパース（ワーカースレッド推奨）
//! try {
//!     const result = JSON.parse(reader.parse(fileBytes));
//!     render(result.header, result.lines);
//! } catch (e) {
//!     // ファイル単位のロードエラー。ビューア自体は落とさない
//!     markFileFailed(file, String(e));
//! }
//! ```

use wasm_bindgen::prelude::*;

pub mod reader;

pub use reader::TraceReader;

/// パニック時にブラウザコンソールにスタックトレースを出力する
///
/// 開発時に必ず呼び出すこと。本番ビルドでは feature flag で無効化可能。
#[wasm_bindgen]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Base64 鍵（24文字）を 16 バイトの Uint8Array に変換するユーティリティ
///
/// テスト・デバッグ用。実際の使用では `TraceReader` のコンストラクタに渡す。
///
/// # 引数
/// - `key_b64`: 標準 base64 の 16 バイト鍵（例: "mB5Wkd9PQ6kz1d0eR3tLxA=="）
///
/// # エラー
/// - Base64 デコード失敗
/// - 鍵長が 16 バイト以外
#[wasm_bindgen(js_name = "decodeBase64Key")]
pub fn decode_base64_key(key_b64: &str) -> Result<js_sys::Uint8Array, JsError> {
    let key = trace3_crypto::decode_base64_key(key_b64)
        .map_err(|e| JsError::new(&alloc::format!("{}", e)))?;
    let arr = js_sys::Uint8Array::new_with_length(16);
    arr.copy_from(&key);
    Ok(arr)
}

extern crate alloc;
