//! TraceReader wasm-bindgen エクスポート
//!
//! ビューア（ブラウザ / Electron）から呼び出すデコーダの主エントリポイント。
//! ヘッダー抽出・復号・テキスト化・フローコンテキストを統合する。

extern crate alloc;

use alloc::format;
use alloc::string::String;

use wasm_bindgen::prelude::*;

use trace3_crypto::decode_base64_key;
use trace3_frame::extract_header;
use trace3_parse::TraceParser;

/// trace3 ファイルリーダー
///
/// ## 内部アーキテクチャ
///
/// ```text
/// TraceReader
///   └── TraceParser (trace3-parse)
///         ├── KeyChain / BlockCipher (trace3-crypto)
///         ├── FrameReader            (trace3-frame)
///         ├── decode / extract_color (trace3-text)
///         └── FlowContext            (trace3-flow)
/// ```
///
/// ## スレッド安全性
///
/// WASM はシングルスレッドのため、`!Send + !Sync` を満たす。
/// パースは同期計算なので、UI を止めないよう Web Worker 側で
/// 呼び出すこと。ファイルごとの状態はパース呼び出しに閉じるため、
/// 複数ワーカーで別ファイルを並行パースしてよい。
#[wasm_bindgen]
pub struct TraceReader {
    parser: TraceParser,
}

#[wasm_bindgen]
impl TraceReader {
    /// trace3 リーダーを初期化する
    ///
    /// # 引数
    /// - `session_key_base64`: 設定で指定されたセッション鍵（標準 base64、
    ///   16 バイト）。省略時は組み込みデフォルト鍵を使う。ファイル内の
    ///   Key レコードによるローテーションはどちらの場合も有効。
    ///
    /// # エラー
    /// - Base64 鍵のデコード失敗
    /// - 鍵長が不正
    #[wasm_bindgen(constructor)]
    pub fn new(session_key_base64: Option<String>) -> Result<TraceReader, JsError> {
        let parser = match session_key_base64 {
            Some(b64) => {
                let key = decode_base64_key(&b64)
                    .map_err(|e| JsError::new(&format!("Invalid session key: {}", e)))?;
                TraceParser::with_default_key(key)
            }
            None => TraceParser::new(),
        };

        Ok(TraceReader { parser })
    }

    /// ファイル全体をパースし、結果を JSON 文字列で返す
    ///
    /// 処理フロー:
    /// 1. プリアンブル抽出（失敗したらファイル単位のロードエラー）
    /// 2. フレーム走査 → 復号 → テキスト化 → 行の組み立て
    /// 3. 末尾フレームが壊れていればコンソールに警告を出し、
    ///    そこまでの結果を返す
    ///
    /// # 引数
    /// - `bytes`: `File.arrayBuffer()` を Uint8Array に変換したもの
    ///
    /// # 戻り値
    /// `{ header, lines, warning }` の JSON 文字列
    ///
    /// # エラー
    /// - trace3 ファイルとして認識できない
    ///   （ホストはそのファイルを失敗状態にするだけでよい）
    #[wasm_bindgen]
    pub fn parse(&self, bytes: &[u8]) -> Result<String, JsError> {
        let trace = self
            .parser
            .parse(bytes)
            .map_err(|e| JsError::new(&format!("Load failed: {}", e)))?;

        if let Some(warning) = &trace.warning {
            web_sys::console::warn_1(&JsValue::from_str(warning));
        }

        serde_json::to_string(&trace)
            .map_err(|e| JsError::new(&format!("Serialization failed: {}", e)))
    }

    /// ヘッダーだけを抽出して JSON 文字列で返す
    ///
    /// ファイル一覧にプロパティを出すための軽量版。フレームの走査も
    /// 復号も行わない。
    #[wasm_bindgen(js_name = "parseHeader")]
    pub fn parse_header(&self, bytes: &[u8]) -> Result<String, JsError> {
        let extracted = extract_header(bytes)
            .map_err(|e| JsError::new(&format!("Load failed: unrecognized file: {}", e)))?;

        serde_json::to_string(&extracted.header)
            .map_err(|e| JsError::new(&format!("Serialization failed: {}", e)))
    }
}
